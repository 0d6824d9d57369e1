//! JSON/HTTP client for the headless commerce backend.
//!
//! Uses `reqwest` for HTTP and caches cart snapshots with `moka`.

use std::sync::Arc;

use acme_core::{CartId, CheckoutDraft, VariantId};
use chrono::Utc;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::{AddItemRequest, SubmitCheckoutRequest, SubmitCheckoutResponse};
use super::{CartApi, CartSnapshot, CheckoutApi, CheckoutStatus, CommerceError, OrderConfirmation};
use crate::config::CommerceConfig;

/// Longest backend body excerpt kept in logs and error messages.
const BODY_EXCERPT_CHARS: usize = 200;

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce backend.
///
/// Cheap to clone; all clones share one connection pool and one cart cache.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: SecretString,
    carts: Cache<CartId, CartSnapshot>,
}

impl CommerceClient {
    /// Create a new commerce client.
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        let carts = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(config.cart_cache_ttl)
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                api_token: config.api_token.clone(),
                carts,
            }),
        }
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CommerceError> {
        build_endpoint(&self.inner.base_url, segments)
    }

    /// Send an authenticated request and return the body of a successful response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<String, CommerceError> {
        let response = request
            .bearer_auth(self.inner.api_token.expose_secret())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %excerpt(&body),
                "Commerce backend returned non-success status"
            );
            return Err(CommerceError::Rejected {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        Ok(body)
    }

    async fn fetch_cart(&self, cart_id: &CartId) -> Result<CartSnapshot, CommerceError> {
        let url = self.endpoint(&["carts", cart_id.as_str()])?;
        let body = self
            .send(self.inner.client.get(url), &format!("cart {cart_id}"))
            .await?;
        let cart: CartSnapshot = parse_json(&body)?;
        self.inner.carts.insert(cart_id.clone(), cart.clone()).await;
        Ok(cart)
    }
}

impl CartApi for CommerceClient {
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn cart(&self, cart_id: &CartId) -> Result<CartSnapshot, CommerceError> {
        if let Some(cart) = self.inner.carts.get(cart_id).await {
            debug!("Cache hit for cart");
            return Ok(cart);
        }
        self.fetch_cart(cart_id).await
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn refresh_cart(&self, cart_id: &CartId) -> Result<CartSnapshot, CommerceError> {
        self.inner.carts.invalidate(cart_id).await;
        self.fetch_cart(cart_id).await
    }

    #[instrument(skip(self), fields(variant_id = %variant_id))]
    async fn add_item(
        &self,
        cart_id: Option<&CartId>,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<CartSnapshot, CommerceError> {
        let (url, resource) = match cart_id {
            Some(id) => (
                self.endpoint(&["carts", id.as_str(), "items"])?,
                format!("cart {id}"),
            ),
            None => (self.endpoint(&["carts"])?, "carts".to_string()),
        };
        let request = self.inner.client.post(url).json(&AddItemRequest {
            variant_id,
            quantity,
        });

        let body = self.send(request, &resource).await?;
        let cart: CartSnapshot = parse_json(&body)?;
        self.inner.carts.insert(cart.id.clone(), cart.clone()).await;
        Ok(cart)
    }
}

impl CheckoutApi for CommerceClient {
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn checkout_status(&self, cart_id: &CartId) -> Result<CheckoutStatus, CommerceError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "checkout"])?;
        let body = self
            .send(self.inner.client.get(url), &format!("checkout for cart {cart_id}"))
            .await?;
        parse_json(&body)
    }

    #[instrument(skip(self, draft), fields(cart_id = %cart_id))]
    async fn submit_checkout(
        &self,
        cart_id: &CartId,
        draft: &CheckoutDraft,
    ) -> Result<OrderConfirmation, CommerceError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "checkout"])?;
        let request = self.inner.client.post(url).json(&SubmitCheckoutRequest {
            card: &draft.card_fields,
            address: &draft.address_fields,
        });

        let body = self
            .send(request, &format!("checkout for cart {cart_id}"))
            .await?;
        let response = if body.trim().is_empty() {
            SubmitCheckoutResponse::default()
        } else {
            parse_json::<SubmitCheckoutResponse>(&body)?
        };

        // The purchase changed the cart server-side; never serve the old snapshot.
        self.inner.carts.invalidate(cart_id).await;

        Ok(OrderConfirmation {
            order_id: response.order_id,
            placed_at: Utc::now(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, CommerceError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| CommerceError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, CommerceError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %excerpt(body),
            "Failed to parse commerce backend response"
        );
        CommerceError::Parse(e)
    })
}

/// Extract the backend's reason from an error body.
///
/// Accepts `{"message": "..."}` or `{"error": "..."}`; anything else falls
/// back to the HTTP reason phrase.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_owned))
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
