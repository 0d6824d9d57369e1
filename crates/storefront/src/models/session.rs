//! Session-related types.
//!
//! Everything a visitor's checkout needs between requests lives in the
//! session: the cart reference, the checkout draft, the sidebar state and
//! the wishlist.

/// Session keys for storefront data.
pub mod keys {
    /// Key for storing the commerce backend cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the in-progress checkout draft (card and address fields).
    pub const CHECKOUT_DRAFT: &str = "checkout_draft";

    /// Key for the sidebar UI state (open, view, submitting, notice).
    pub const SIDEBAR: &str = "sidebar";

    /// Key for the visitor's wishlist.
    pub const WISHLIST: &str = "wishlist";
}
