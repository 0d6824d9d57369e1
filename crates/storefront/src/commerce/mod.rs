//! Headless commerce backend access.
//!
//! # Architecture
//!
//! - The commerce backend is the source of truth for carts and orders; the
//!   storefront keeps no copy beyond a short-lived snapshot cache
//! - [`CartApi`] and [`CheckoutApi`] are the seams the checkout flow depends
//!   on; [`CommerceClient`] implements both over JSON/HTTP
//! - Cart snapshots are cached in memory via `moka` and invalidated on refresh
//!
//! # Example
//!
//! ```rust,ignore
//! use acme_storefront::commerce::{CartApi, CheckoutApi, CommerceClient};
//!
//! let client = CommerceClient::new(&config.commerce);
//!
//! let cart = client.add_item(None, &variant_id, 1).await?;
//! let status = client.checkout_status(&cart.id).await?;
//! if status.is_ready() {
//!     let confirmation = client.submit_checkout(&cart.id, &draft).await?;
//! }
//! ```

mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use std::future::Future;

use acme_core::{CartId, CheckoutDraft, VariantId};
use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend refused the request (validation, payment declined, ...).
    #[error("Rejected ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the backend.
        status: u16,
        /// Human-readable reason; shown to shoppers for 4xx statuses only.
        message: String,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Shown when the backend fails for reasons the shopper cannot act on.
const GENERIC_FAILURE: &str = "We couldn't complete your purchase. Please try again.";

impl CommerceError {
    /// Message suitable for display to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            // Server-side failure text is for logs, not shoppers.
            Self::Rejected { status, message } if *status < 500 => message.clone(),
            Self::RateLimited(_) => "The store is busy right now, please try again in a moment.".to_string(),
            Self::NotFound(_) => "Your cart could not be found. Please refresh and try again.".to_string(),
            Self::Rejected { .. } | Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

/// Read and refresh cart snapshots.
pub trait CartApi: Send + Sync {
    /// Current snapshot of a cart, possibly served from cache.
    fn cart(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<CartSnapshot, CommerceError>> + Send;

    /// Drop any cached snapshot and fetch a fresh one.
    fn refresh_cart(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<CartSnapshot, CommerceError>> + Send;

    /// Add a variant to a cart, creating the cart when `cart_id` is `None`.
    fn add_item(
        &self,
        cart_id: Option<&CartId>,
        variant_id: &VariantId,
        quantity: u32,
    ) -> impl Future<Output = Result<CartSnapshot, CommerceError>> + Send;
}

/// Query checkout readiness and place orders.
pub trait CheckoutApi: Send + Sync {
    /// Whether payment and shipping details are on file for the cart.
    fn checkout_status(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<CheckoutStatus, CommerceError>> + Send;

    /// Finalize the purchase for the cart using the draft fields.
    fn submit_checkout(
        &self,
        cart_id: &CartId,
        draft: &CheckoutDraft,
    ) -> impl Future<Output = Result<OrderConfirmation, CommerceError>> + Send;
}
