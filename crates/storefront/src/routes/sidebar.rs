//! Sidebar navigation handlers (HTMX).

use acme_core::SidebarView;
use axum::{Form, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{CheckoutDraftHandle, SessionShell, UiShell};
use crate::error::{AppError, Result};
use crate::routes::checkout::{CheckoutSidebarTemplate, SidebarContext};
use crate::state::AppState;

/// View switch form data.
#[derive(Debug, Deserialize)]
pub struct ViewForm {
    /// Wire name (`PAYMENT_VIEW`) or slug (`payment`).
    pub view: String,
}

/// Switch the sidebar to another view, opening it if closed.
#[instrument(skip(state, session, draft))]
pub async fn view(
    State(state): State<AppState>,
    session: Session,
    draft: CheckoutDraftHandle,
    Form(form): Form<ViewForm>,
) -> Result<CheckoutSidebarTemplate> {
    let view: SidebarView = form
        .view
        .parse()
        .map_err(|e| AppError::BadRequest(format!("{e}")))?;

    SessionShell::new(session.clone())
        .set_sidebar_view(view)
        .await?;

    let ctx = SidebarContext::load(&state, &session, &draft).await?;
    Ok(CheckoutSidebarTemplate { ctx })
}

/// Close the sidebar. The next open starts on the cart view.
#[instrument(skip(state, session, draft))]
pub async fn close(
    State(state): State<AppState>,
    session: Session,
    draft: CheckoutDraftHandle,
) -> Result<CheckoutSidebarTemplate> {
    SessionShell::new(session.clone()).close_sidebar().await?;

    let ctx = SidebarContext::load(&state, &session, &draft).await?;
    Ok(CheckoutSidebarTemplate { ctx })
}
