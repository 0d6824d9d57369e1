//! Cart route handlers.
//!
//! The cart ID is stored in the session and maps to a cart on the commerce
//! backend. Adding an item opens the sidebar on the cart view.

use acme_core::{CartId, SidebarView, VariantId};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{CheckoutDraftHandle, SessionShell, UiShell};
use crate::commerce::CartApi;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session_keys;
use crate::routes::checkout::{CheckoutSidebarTemplate, SidebarContext};
use crate::state::AppState;

/// Largest quantity accepted in a single add.
const MAX_ADD_QUANTITY: u32 = 99;

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
pub async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<CartId>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// Set the cart ID in the session.
async fn set_cart_id(session: &Session, cart_id: &CartId) -> Result<()> {
    session.insert(session_keys::CART_ID, cart_id).await?;
    Ok(())
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: SidebarContext,
}

/// Display the cart page.
#[instrument(skip(state, session, draft))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    draft: CheckoutDraftHandle,
) -> Result<CartShowTemplate> {
    // Landing on the cart page opens the panel on whatever view was last shown.
    SessionShell::new(session.clone()).open_sidebar().await?;
    let ctx = SidebarContext::load(&state, &session, &draft).await?;
    Ok(CartShowTemplate { ctx })
}

/// Add an item to the cart (HTMX).
///
/// Creates a new cart if the session has none. Returns the sidebar on the
/// cart view with an HTMX trigger so badges elsewhere refresh.
#[instrument(skip(state, session, draft))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    draft: CheckoutDraftHandle,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 || quantity > MAX_ADD_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_ADD_QUANTITY}"
        )));
    }
    if form.variant_id.trim().is_empty() {
        return Err(AppError::BadRequest("variant_id is required".to_string()));
    }

    let existing = get_cart_id(&session).await;
    let cart = state
        .commerce()
        .add_item(existing.as_ref(), &VariantId::new(form.variant_id), quantity)
        .await?;

    if existing.as_ref() != Some(&cart.id) {
        set_cart_id(&session, &cart.id).await?;
    }

    SessionShell::new(session.clone())
        .set_sidebar_view(SidebarView::CartView)
        .await?;

    let ctx = SidebarContext::load(&state, &session, &draft).await?;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CheckoutSidebarTemplate { ctx },
    ))
}
