//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the cart
//! GET  /health                 - Health check
//!
//! # Cart
//! GET  /cart                   - Cart page (opens the sidebar)
//! POST /cart/add               - Add to cart (returns sidebar, triggers cart-updated)
//!
//! # Checkout (HTMX fragments)
//! GET  /checkout               - Sidebar on its current view
//! POST /checkout/card          - Save card fields
//! POST /checkout/address       - Save shipping address
//! POST /checkout/clear         - Discard the draft
//! POST /checkout/submit        - Confirm the purchase
//!
//! # Sidebar (HTMX fragments)
//! POST /sidebar/view           - Switch view
//! POST /sidebar/close          - Close the panel
//!
//! # Wishlist
//! GET  /wishlist               - Saved products
//! POST /wishlist/toggle        - Save or unsave a product (returns button fragment)
//! ```

pub mod cart;
pub mod checkout;
pub mod pages;
pub mod sidebar;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/card", post(checkout::set_card))
        .route("/address", post(checkout::set_address))
        .route("/clear", post(checkout::clear))
        .route("/submit", post(checkout::submit))
}

/// Create the sidebar routes router.
pub fn sidebar_routes() -> Router<AppState> {
    Router::new()
        .route("/view", post(sidebar::view))
        .route("/close", post(sidebar::close))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/health", get(pages::health))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/sidebar", sidebar_routes())
        .nest("/wishlist", wishlist_routes())
}
