//! Session-scoped checkout draft.
//!
//! The draft is only reachable through a [`CheckoutDraftHandle`], and a handle
//! only exists inside a session scope. Extracting one on a route that is not
//! wrapped by the session layer is a wiring bug: it is rejected with a 500
//! and an error log rather than handing out an empty draft.

use acme_core::{AddressFields, CardFields, CheckoutCommand, CheckoutDraft};
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tower_sessions::Session;

use super::StateError;
use crate::models::session_keys;

/// Handle on the visitor's checkout draft.
///
/// Every mutation runs the pure [`CheckoutDraft::apply`] transition and
/// persists the resulting record with a single session write.
///
/// # Example
///
/// ```rust,ignore
/// async fn save_card(
///     mut draft: CheckoutDraftHandle,
///     Form(card): Form<CardFields>,
/// ) -> Result<impl IntoResponse, AppError> {
///     draft.set_card_fields(card).await?;
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutDraftHandle {
    session: Session,
    draft: CheckoutDraft,
}

impl CheckoutDraftHandle {
    /// Load the draft stored in `session`, or an empty one if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or the stored
    /// record cannot be decoded.
    pub async fn load(session: Session) -> Result<Self, StateError> {
        let draft = session
            .get::<CheckoutDraft>(session_keys::CHECKOUT_DRAFT)
            .await?
            .unwrap_or_default();
        Ok(Self { session, draft })
    }

    /// Current draft.
    #[must_use]
    pub const fn fields(&self) -> &CheckoutDraft {
        &self.draft
    }

    /// Replace the card fragment wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn set_card_fields(&mut self, card: CardFields) -> Result<(), StateError> {
        self.dispatch(CheckoutCommand::SetCardFields(card)).await
    }

    /// Replace the address fragment wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn set_address_fields(&mut self, address: AddressFields) -> Result<(), StateError> {
        self.dispatch(CheckoutCommand::SetAddressFields(address))
            .await
    }

    /// Reset both fragments to empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn clear_checkout_fields(&mut self) -> Result<(), StateError> {
        self.dispatch(CheckoutCommand::ClearCheckoutFields).await
    }

    async fn dispatch(&mut self, command: CheckoutCommand) -> Result<(), StateError> {
        let next = self.draft.clone().apply(command);
        self.session
            .insert(session_keys::CHECKOUT_DRAFT, &next)
            .await?;
        self.draft = next;
        Ok(())
    }
}

/// Rejection returned when a [`CheckoutDraftHandle`] cannot be extracted.
#[derive(Debug, Error)]
pub enum DraftRejection {
    /// No session on the request: the route is not behind the session layer.
    #[error("checkout draft requested outside a session scope")]
    OutsideSessionScope,

    /// The session store failed.
    #[error("failed to load checkout draft: {0}")]
    Session(#[from] StateError),
}

impl IntoResponse for DraftRejection {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Checkout draft unavailable"
        );
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl<S> FromRequestParts<S> for CheckoutDraftHandle
where
    S: Send + Sync,
{
    type Rejection = DraftRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer; absent means the layer is missing.
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(DraftRejection::OutsideSessionScope)?;

        Ok(Self::load(session).await?)
    }
}
