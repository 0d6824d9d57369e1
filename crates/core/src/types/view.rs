//! Sidebar sub-views.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A panel the checkout sidebar can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SidebarView {
    #[default]
    CartView,
    CheckoutView,
    PaymentView,
    ShippingView,
}

/// Error parsing a [`SidebarView`] from a form value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sidebar view: {0}")]
pub struct UnknownView(pub String);

impl SidebarView {
    /// Wire name, e.g. `PAYMENT_VIEW`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CartView => "CART_VIEW",
            Self::CheckoutView => "CHECKOUT_VIEW",
            Self::PaymentView => "PAYMENT_VIEW",
            Self::ShippingView => "SHIPPING_VIEW",
        }
    }

    /// Short lowercase slug for templates and URLs.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::CartView => "cart",
            Self::CheckoutView => "checkout",
            Self::PaymentView => "payment",
            Self::ShippingView => "shipping",
        }
    }

    /// The view a "back" control returns to.
    #[must_use]
    pub const fn back(self) -> Self {
        match self {
            Self::CartView | Self::CheckoutView => Self::CartView,
            Self::PaymentView | Self::ShippingView => Self::CheckoutView,
        }
    }
}

impl fmt::Display for SidebarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SidebarView {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CART_VIEW" | "cart" => Ok(Self::CartView),
            "CHECKOUT_VIEW" | "checkout" => Ok(Self::CheckoutView),
            "PAYMENT_VIEW" | "payment" => Ok(Self::PaymentView),
            "SHIPPING_VIEW" | "shipping" => Ok(Self::ShippingView),
            other => Err(UnknownView(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names_and_slugs() {
        assert_eq!("PAYMENT_VIEW".parse(), Ok(SidebarView::PaymentView));
        assert_eq!("shipping".parse(), Ok(SidebarView::ShippingView));
        assert!("SETTINGS_VIEW".parse::<SidebarView>().is_err());
    }

    #[test]
    fn test_back_navigation() {
        assert_eq!(SidebarView::PaymentView.back(), SidebarView::CheckoutView);
        assert_eq!(SidebarView::CheckoutView.back(), SidebarView::CartView);
    }
}
