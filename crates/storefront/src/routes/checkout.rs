//! Checkout sidebar route handlers.
//!
//! Every handler answers with the sidebar fragment (HTMX swaps it in place),
//! except a completed purchase, which answers with the confirmation.

use acme_core::{AddressFields, CardFields, SidebarView};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{
    CheckoutDraftHandle, CheckoutSummary, SessionShell, SubmitOutcome, UiShell, confirm_purchase,
};
use crate::commerce::{CartApi, CheckoutApi, CheckoutStatus};
use crate::error::{Result, add_breadcrumb};
use crate::routes::cart::get_cart_id;
use crate::state::AppState;

/// Everything the sidebar templates render.
#[derive(Debug, Clone)]
pub struct SidebarContext {
    /// Whether the panel is rendered at all.
    pub visible: bool,
    /// Current sub-view slug (`cart`, `checkout`, `payment`, `shipping`).
    pub view: &'static str,
    /// Wire name of the view the back control returns to.
    pub back_view: &'static str,
    pub submitting: bool,
    pub notice: Option<String>,
    pub summary: CheckoutSummary,
    /// Card draft with the number and CVC blanked; never echoed into forms.
    pub card: CardFields,
    pub card_number_masked: String,
    pub address: AddressFields,
}

impl SidebarContext {
    /// Gather sidebar state, the latest cart snapshot and readiness flags.
    ///
    /// Backend failures degrade to an empty cart rather than failing the
    /// render; session failures are errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(
        state: &AppState,
        session: &Session,
        draft: &CheckoutDraftHandle,
    ) -> Result<Self> {
        let sidebar = SessionShell::new(session.clone()).state().await?;

        let (cart, status) = match get_cart_id(session).await {
            Some(cart_id) => match state.commerce().cart(&cart_id).await {
                Ok(cart) => {
                    let status = state
                        .commerce()
                        .checkout_status(&cart_id)
                        .await
                        .unwrap_or_else(|e| {
                            tracing::warn!("Failed to fetch checkout status for {cart_id}: {e}");
                            CheckoutStatus::default()
                        });
                    (Some(cart), status)
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch cart {cart_id}: {e}");
                    (None, CheckoutStatus::default())
                }
            },
            None => (None, CheckoutStatus::default()),
        };

        let fields = draft.fields();
        let card = CardFields {
            card_number: String::new(),
            card_cvc: String::new(),
            ..fields.card_fields.clone()
        };

        Ok(Self {
            visible: sidebar.open,
            view: sidebar.view.slug(),
            back_view: sidebar.view.back().as_str(),
            submitting: sidebar.submitting,
            notice: sidebar.notice,
            summary: CheckoutSummary::new(cart.as_ref(), status, sidebar.submitting),
            card,
            card_number_masked: fields.card_fields.masked_number(),
            address: fields.address_fields.clone(),
        })
    }
}

/// Sidebar fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "checkout/sidebar.html")]
pub struct CheckoutSidebarTemplate {
    pub ctx: SidebarContext,
}

/// Purchase confirmation fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_id: Option<String>,
    pub placed_at: String,
}

async fn render_sidebar(
    state: &AppState,
    session: &Session,
    draft: &CheckoutDraftHandle,
) -> Result<CheckoutSidebarTemplate> {
    let ctx = SidebarContext::load(state, session, draft).await?;
    Ok(CheckoutSidebarTemplate { ctx })
}

/// Show the sidebar on its current view.
#[instrument(skip(state, session, draft))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    draft: CheckoutDraftHandle,
) -> Result<CheckoutSidebarTemplate> {
    render_sidebar(&state, &session, &draft).await
}

/// Save the card form and return to the checkout view.
#[instrument(skip(state, session, draft, card))]
pub async fn set_card(
    State(state): State<AppState>,
    session: Session,
    mut draft: CheckoutDraftHandle,
    Form(card): Form<CardFields>,
) -> Result<CheckoutSidebarTemplate> {
    draft.set_card_fields(card).await?;
    SessionShell::new(session.clone())
        .set_sidebar_view(SidebarView::CheckoutView)
        .await?;
    add_breadcrumb("checkout", "Saved payment details", None);
    render_sidebar(&state, &session, &draft).await
}

/// Save the address form and return to the checkout view.
#[instrument(skip(state, session, draft))]
pub async fn set_address(
    State(state): State<AppState>,
    session: Session,
    mut draft: CheckoutDraftHandle,
    Form(address): Form<AddressFields>,
) -> Result<CheckoutSidebarTemplate> {
    draft.set_address_fields(address).await?;
    SessionShell::new(session.clone())
        .set_sidebar_view(SidebarView::CheckoutView)
        .await?;
    add_breadcrumb("checkout", "Saved shipping address", None);
    render_sidebar(&state, &session, &draft).await
}

/// Discard both draft fragments.
#[instrument(skip(state, session, draft))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    mut draft: CheckoutDraftHandle,
) -> Result<CheckoutSidebarTemplate> {
    draft.clear_checkout_fields().await?;
    render_sidebar(&state, &session, &draft).await
}

/// Confirm the purchase.
///
/// - completed: confirmation fragment plus `HX-Trigger: cart-updated`
/// - failed: the sidebar with the failure notice (200 so HTMX swaps it in)
/// - not ready / already in flight: the sidebar with 409
#[instrument(skip(state, session, draft))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    mut draft: CheckoutDraftHandle,
) -> Result<Response> {
    let shell = SessionShell::new(session.clone());
    let cart_id = get_cart_id(&session).await;
    add_breadcrumb("checkout", "Confirmed purchase", None);

    let outcome = confirm_purchase(state.commerce(), &shell, &mut draft, cart_id.as_ref()).await?;

    let response = match outcome {
        SubmitOutcome::Completed(confirmation) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            ConfirmationTemplate {
                order_id: confirmation.order_id.map(acme_core::OrderId::into_inner),
                placed_at: confirmation.placed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            },
        )
            .into_response(),
        SubmitOutcome::Failed { .. } => render_sidebar(&state, &session, &draft)
            .await?
            .into_response(),
        SubmitOutcome::NotReady | SubmitOutcome::InFlight => (
            StatusCode::CONFLICT,
            render_sidebar(&state, &session, &draft).await?,
        )
            .into_response(),
    };

    Ok(response)
}
