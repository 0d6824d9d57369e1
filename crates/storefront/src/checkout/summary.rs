//! Display values for the checkout sidebar.
//!
//! Recomputed from the latest cart snapshot on every render; nothing here is
//! cached.

use acme_core::format_price;
use rust_decimal::Decimal;

use crate::commerce::{CartSnapshot, CheckoutStatus, LineItem};

/// Currency assumed when there is no cart yet.
const FALLBACK_CURRENCY: &str = "USD";

/// Whether the confirm button is disabled.
///
/// Missing payment or shipping details always disable it; the loading flag
/// disables it on top of that.
#[must_use]
pub const fn submit_disabled(status: CheckoutStatus, loading: bool) -> bool {
    !status.has_payment || !status.has_shipping || loading
}

/// Line item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl LineItemView {
    fn new(line: &LineItem, currency_code: &str) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: format_price(line.price, currency_code),
            line_price: format_price(line.line_total(), currency_code),
        }
    }
}

/// Checkout sidebar display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: String,
    pub total: String,
    pub currency_code: String,
    pub items: Vec<LineItemView>,
    pub item_count: u32,
    pub has_payment: bool,
    pub has_shipping: bool,
    pub submit_disabled: bool,
}

impl CheckoutSummary {
    /// Build the summary from the latest snapshot and readiness flags.
    #[must_use]
    pub fn new(cart: Option<&CartSnapshot>, status: CheckoutStatus, loading: bool) -> Self {
        let Some(cart) = cart else {
            return Self {
                subtotal: format_price(Decimal::ZERO, FALLBACK_CURRENCY),
                total: format_price(Decimal::ZERO, FALLBACK_CURRENCY),
                currency_code: FALLBACK_CURRENCY.to_string(),
                items: Vec::new(),
                item_count: 0,
                has_payment: status.has_payment,
                has_shipping: status.has_shipping,
                submit_disabled: true,
            };
        };

        let currency_code = cart.currency.code.as_str();
        Self {
            subtotal: format_price(cart.subtotal_price, currency_code),
            total: format_price(cart.total_price, currency_code),
            currency_code: currency_code.to_string(),
            items: cart
                .line_items
                .iter()
                .map(|line| LineItemView::new(line, currency_code))
                .collect(),
            item_count: cart.item_count(),
            has_payment: status.has_payment,
            has_shipping: status.has_shipping,
            submit_disabled: submit_disabled(status, loading),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
