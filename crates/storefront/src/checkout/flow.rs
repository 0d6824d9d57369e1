//! Purchase confirmation.
//!
//! [`confirm_purchase`] runs once per press of "Confirm Purchase":
//!
//! 1. refuse if a submission is already marked in flight
//! 2. refuse if there is no cart or payment/shipping details are missing
//! 3. mark loading, submit the checkout to the commerce backend
//! 4. on success: clear the draft, clear loading, refresh the cart, close the sidebar
//! 5. on failure: clear loading and show the reason; draft, cart and sidebar
//!    are left as they were
//!
//! Once the backend accepts the order the outcome is `Completed`; session
//! writes that fail after that point are logged, not returned.
//!
//! The loading flag is written through to the session store, so a second
//! press on the same session is refused while the first is in flight. It is
//! not a lock: two requests that both read the flag before either sets it
//! still both reach the backend.

use acme_core::CartId;
use tracing::instrument;

use super::{CheckoutDraftHandle, StateError, UiShell};
use crate::commerce::{CartApi, CheckoutApi, OrderConfirmation};

/// Shown when the confirm action arrives without payment or shipping details.
pub const NOT_READY_NOTICE: &str = "Add payment and shipping details before confirming your purchase.";

/// Result of a confirm attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The order was placed.
    Completed(OrderConfirmation),
    /// The backend refused or could not be reached; `message` is shown to the shopper.
    Failed { message: String },
    /// No cart, or payment/shipping details are missing.
    NotReady,
    /// Another submission is already marked in flight.
    InFlight,
}

/// Confirm the purchase for `cart_id`.
///
/// # Errors
///
/// Returns an error only if session state cannot be read or written. Backend
/// failures are reported as [`SubmitOutcome::Failed`].
#[instrument(skip(backend, shell, draft))]
pub async fn confirm_purchase<B, U>(
    backend: &B,
    shell: &U,
    draft: &mut CheckoutDraftHandle,
    cart_id: Option<&CartId>,
) -> Result<SubmitOutcome, StateError>
where
    B: CartApi + CheckoutApi,
    U: UiShell,
{
    if shell.is_loading().await? {
        tracing::info!("Checkout submission already in flight");
        return Ok(SubmitOutcome::InFlight);
    }

    let Some(cart_id) = cart_id else {
        shell.show_notice(NOT_READY_NOTICE.to_string()).await?;
        return Ok(SubmitOutcome::NotReady);
    };

    match backend.checkout_status(cart_id).await {
        Ok(status) if status.is_ready() => {}
        Ok(_) => {
            shell.show_notice(NOT_READY_NOTICE.to_string()).await?;
            return Ok(SubmitOutcome::NotReady);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load checkout status");
            let message = e.user_message();
            shell.show_notice(message.clone()).await?;
            return Ok(SubmitOutcome::Failed { message });
        }
    }

    shell.set_loading(true).await?;

    match backend.submit_checkout(cart_id, draft.fields()).await {
        Ok(confirmation) => {
            log_after_order("clear draft", draft.clear_checkout_fields().await);
            log_after_order("clear loading", shell.set_loading(false).await);

            if let Err(e) = backend.refresh_cart(cart_id).await {
                tracing::warn!(error = %e, "Failed to refresh cart after checkout");
            }

            log_after_order("close sidebar", shell.close_sidebar().await);
            tracing::info!(order_id = ?confirmation.order_id, "Checkout completed");
            Ok(SubmitOutcome::Completed(confirmation))
        }
        Err(e) => {
            shell.set_loading(false).await?;
            tracing::warn!(error = %e, "Checkout submission failed");
            let message = e.user_message();
            shell.show_notice(message.clone()).await?;
            Ok(SubmitOutcome::Failed { message })
        }
    }
}

fn log_after_order(step: &'static str, result: Result<(), StateError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, step, "Session write failed after order was placed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use acme_core::{AddressFields, CardFields, CheckoutDraft, SidebarView, VariantId};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::{MemoryStore, Session, SessionStore, session_store};

    use super::*;
    use crate::checkout::SessionShell;
    use crate::commerce::{CartSnapshot, CheckoutStatus, CommerceError, Currency};

    /// In-memory commerce backend that records every call.
    struct FakeBackend {
        status: CheckoutStatus,
        reject_with: Option<String>,
        calls: Mutex<Vec<&'static str>>,
        submitted: Mutex<Option<CheckoutDraft>>,
    }

    impl FakeBackend {
        fn ready() -> Self {
            Self {
                status: CheckoutStatus {
                    has_payment: true,
                    has_shipping: true,
                },
                reject_with: None,
                calls: Mutex::new(Vec::new()),
                submitted: Mutex::new(None),
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                reject_with: Some(message.to_string()),
                ..Self::ready()
            }
        }

        fn with_status(status: CheckoutStatus) -> Self {
            Self {
                status,
                ..Self::ready()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn snapshot(cart_id: &CartId) -> CartSnapshot {
            CartSnapshot {
                id: cart_id.clone(),
                subtotal_price: Decimal::ZERO,
                total_price: Decimal::ZERO,
                currency: Currency {
                    code: "USD".to_string(),
                },
                line_items: Vec::new(),
            }
        }
    }

    impl CartApi for FakeBackend {
        async fn cart(&self, cart_id: &CartId) -> Result<CartSnapshot, CommerceError> {
            self.record("cart");
            Ok(Self::snapshot(cart_id))
        }

        async fn refresh_cart(&self, cart_id: &CartId) -> Result<CartSnapshot, CommerceError> {
            self.record("refresh_cart");
            Ok(Self::snapshot(cart_id))
        }

        async fn add_item(
            &self,
            cart_id: Option<&CartId>,
            _variant_id: &VariantId,
            _quantity: u32,
        ) -> Result<CartSnapshot, CommerceError> {
            self.record("add_item");
            Ok(Self::snapshot(cart_id.unwrap_or(&CartId::new("new"))))
        }
    }

    impl CheckoutApi for FakeBackend {
        async fn checkout_status(&self, _cart_id: &CartId) -> Result<CheckoutStatus, CommerceError> {
            self.record("checkout_status");
            Ok(self.status)
        }

        async fn submit_checkout(
            &self,
            _cart_id: &CartId,
            draft: &CheckoutDraft,
        ) -> Result<OrderConfirmation, CommerceError> {
            self.record("submit_checkout");
            *self.submitted.lock().unwrap() = Some(draft.clone());
            match &self.reject_with {
                Some(message) => Err(CommerceError::Rejected {
                    status: 402,
                    message: message.clone(),
                }),
                None => Ok(OrderConfirmation {
                    order_id: Some("order-1".into()),
                    placed_at: Utc::now(),
                }),
            }
        }
    }

    /// Session store whose reads can be switched off mid-test.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_loads: AtomicBool,
    }

    #[async_trait]
    impl SessionStore for FlakyStore {
        async fn create(&self, record: &mut Record) -> session_store::Result<()> {
            self.inner.create(record).await
        }

        async fn save(&self, record: &Record) -> session_store::Result<()> {
            self.inner.save(record).await
        }

        async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err(session_store::Error::Backend("store unavailable".to_string()));
            }
            self.inner.load(session_id).await
        }

        async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
            self.inner.delete(session_id).await
        }
    }

    struct Fixture {
        shell: SessionShell,
        draft: CheckoutDraftHandle,
        session: Session,
        cart_id: CartId,
    }

    async fn fixture() -> Fixture {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let shell = SessionShell::new(session.clone());
        shell
            .set_sidebar_view(SidebarView::CheckoutView)
            .await
            .unwrap();

        let mut draft = CheckoutDraftHandle::load(session.clone()).await.unwrap();
        draft
            .set_card_fields(CardFields {
                card_number: "4242".to_string(),
                ..CardFields::default()
            })
            .await
            .unwrap();
        draft
            .set_address_fields(AddressFields {
                city: "Lisbon".to_string(),
                ..AddressFields::default()
            })
            .await
            .unwrap();

        Fixture {
            shell,
            draft,
            session,
            cart_id: CartId::new("c1"),
        }
    }

    #[tokio::test]
    async fn test_success_clears_refreshes_and_closes() {
        let mut fx = fixture().await;
        let backend = FakeBackend::ready();

        let outcome = confirm_purchase(&backend, &fx.shell, &mut fx.draft, Some(&fx.cart_id))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Completed(ref c) if c.order_id == Some("order-1".into())));
        assert_eq!(
            backend.calls(),
            ["checkout_status", "submit_checkout", "refresh_cart"]
        );

        // The backend saw the draft as it was before clearing.
        let submitted = backend.submitted.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.card_fields.card_number, "4242");

        assert!(fx.draft.fields().is_empty());
        let stored = CheckoutDraftHandle::load(fx.session.clone()).await.unwrap();
        assert!(stored.fields().is_empty());

        let state = fx.shell.state().await.unwrap();
        assert!(!state.open);
        assert!(!state.submitting);
        assert_eq!(state.notice, None);
    }

    #[tokio::test]
    async fn test_failure_keeps_state_and_surfaces_notice() {
        let mut fx = fixture().await;
        let backend = FakeBackend::rejecting("Card declined");

        let outcome = confirm_purchase(&backend, &fx.shell, &mut fx.draft, Some(&fx.cart_id))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Card declined".to_string()
            }
        );
        assert_eq!(backend.calls(), ["checkout_status", "submit_checkout"]);

        let stored = CheckoutDraftHandle::load(fx.session.clone()).await.unwrap();
        assert_eq!(stored.fields().card_fields.card_number, "4242");
        assert_eq!(stored.fields().address_fields.city, "Lisbon");

        let state = fx.shell.state().await.unwrap();
        assert!(state.open);
        assert_eq!(state.view, SidebarView::CheckoutView);
        assert!(!state.submitting);
        assert_eq!(state.notice.as_deref(), Some("Card declined"));
    }

    #[tokio::test]
    async fn test_in_flight_submission_is_refused() {
        let mut fx = fixture().await;
        fx.shell.set_loading(true).await.unwrap();
        let backend = FakeBackend::ready();

        let outcome = confirm_purchase(&backend, &fx.shell, &mut fx.draft, Some(&fx.cart_id))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::InFlight);
        assert!(backend.calls().is_empty());
        assert!(!fx.draft.fields().is_empty());
    }

    #[tokio::test]
    async fn test_missing_details_are_not_submitted() {
        let mut fx = fixture().await;
        let backend = FakeBackend::with_status(CheckoutStatus {
            has_payment: true,
            has_shipping: false,
        });

        let outcome = confirm_purchase(&backend, &fx.shell, &mut fx.draft, Some(&fx.cart_id))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::NotReady);
        assert_eq!(backend.calls(), ["checkout_status"]);
        let state = fx.shell.state().await.unwrap();
        assert_eq!(state.notice.as_deref(), Some(NOT_READY_NOTICE));
        assert!(!state.submitting);
    }

    #[tokio::test]
    async fn test_no_cart_is_not_ready() {
        let mut fx = fixture().await;
        let backend = FakeBackend::ready();

        let outcome = confirm_purchase(&backend, &fx.shell, &mut fx.draft, None)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::NotReady);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_placed_order_survives_draft_write_failure() {
        let fx = fixture().await;
        let backend = FakeBackend::ready();

        let store = Arc::new(FlakyStore::default());
        let session = Session::new(None, store.clone(), None);
        let mut draft = CheckoutDraftHandle::load(session.clone()).await.unwrap();
        draft
            .set_card_fields(CardFields {
                card_number: "4242".to_string(),
                ..CardFields::default()
            })
            .await
            .unwrap();
        // Unload the record so the next draft write has to read the store.
        session.save().await.unwrap();
        session.delete().await.unwrap();
        session.load().await.unwrap();
        store.fail_loads.store(true, Ordering::SeqCst);

        let outcome = confirm_purchase(&backend, &fx.shell, &mut draft, Some(&fx.cart_id))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Completed(_)));
        assert_eq!(
            backend.calls(),
            ["checkout_status", "submit_checkout", "refresh_cart"]
        );
        let state = fx.shell.state().await.unwrap();
        assert!(!state.submitting);
        assert!(!state.open);
    }
}
