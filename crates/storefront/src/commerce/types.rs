//! Wire types exchanged with the commerce backend.
//!
//! Field names follow the backend's camelCase JSON. Money amounts arrive as
//! decimal strings and are parsed into [`Decimal`] to avoid float rounding.

use acme_core::{CardFields, AddressFields, CartId, LineItemId, OrderId, ProductId, VariantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code (e.g. "USD").
    pub code: String,
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub name: String,
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
}

impl LineItem {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Server-side cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub id: CartId,
    pub subtotal_price: Decimal,
    pub total_price: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl CartSnapshot {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|line| line.quantity).sum()
    }
}

/// Readiness flags for a cart's checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutStatus {
    pub has_payment: bool,
    pub has_shipping: bool,
}

impl CheckoutStatus {
    /// Both payment and shipping details are present.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        self.has_payment && self.has_shipping
    }
}

/// Result of a successful checkout submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Order reference, when the backend returns one.
    pub order_id: Option<OrderId>,
    /// When the storefront received the confirmation.
    pub placed_at: DateTime<Utc>,
}

/// Body of `POST /carts` and `POST /carts/{id}/items`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddItemRequest<'a> {
    pub variant_id: &'a VariantId,
    pub quantity: u32,
}

/// Body of `POST /carts/{id}/checkout`.
#[derive(Debug, Serialize)]
pub(crate) struct SubmitCheckoutRequest<'a> {
    pub card: &'a CardFields,
    pub address: &'a AddressFields,
}

/// Response of `POST /carts/{id}/checkout`; an empty body is accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SubmitCheckoutResponse {
    pub order_id: Option<OrderId>,
}
