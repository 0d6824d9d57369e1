//! Core types for the ACME storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod checkout;
pub mod id;
pub mod price;
pub mod view;
pub mod wishlist;

pub use checkout::{AddressFields, CardFields, CheckoutCommand, CheckoutDraft};
pub use id::*;
pub use price::{CurrencyCode, UnknownCurrency, format_price};
pub use view::{SidebarView, UnknownView};
pub use wishlist::{MAX_WISHLIST_ITEMS, Wishlist};
