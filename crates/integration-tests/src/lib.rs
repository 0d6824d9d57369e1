//! End-to-end test harness for the ACME storefront.
//!
//! [`TestContext::spawn`] starts two servers on ephemeral ports:
//!
//! - a fake commerce backend ([`FakeCommerce`]) that keeps carts in memory
//!   and lets tests script readiness flags, submission failures and latency
//! - the real storefront router, configured to talk to the fake
//!
//! Tests drive the storefront through a cookie-keeping `reqwest` client, the
//! way a browser with HTMX would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p acme-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use acme_storefront::{
    app,
    config::{CommerceConfig, StorefrontConfig},
    state::AppState,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Bearer token shared by the fake backend and the storefront config.
pub const API_TOKEN: &str = "tok_Zq8!vR2#mW5$kL9@";

/// Unit price of every fake variant.
pub const UNIT_PRICE: &str = "12.50";

// =============================================================================
// Fake commerce backend
// =============================================================================

#[derive(Debug, Default)]
struct FakeState {
    carts: HashMap<String, Vec<(String, u32)>>,
    next_cart: u32,
    has_payment: bool,
    has_shipping: bool,
    submit_failure: Option<(StatusCode, String)>,
    submit_delay: Duration,
    submissions: Vec<Value>,
}

/// In-memory commerce backend speaking the storefront's JSON protocol.
#[derive(Debug, Clone, Default)]
pub struct FakeCommerce {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCommerce {
    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Script the readiness flags reported for every cart.
    pub fn set_ready(&self, has_payment: bool, has_shipping: bool) {
        self.with_state(|s| {
            s.has_payment = has_payment;
            s.has_shipping = has_shipping;
        });
    }

    /// Make every following submission fail with `status` and `message`.
    pub fn fail_submissions(&self, status: StatusCode, message: &str) {
        self.with_state(|s| s.submit_failure = Some((status, message.to_owned())));
    }

    /// Hold every following submission for `delay` before answering.
    pub fn slow_submissions(&self, delay: Duration) {
        self.with_state(|s| s.submit_delay = delay);
    }

    /// Bodies of every accepted submission, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<Value> {
        self.with_state(|s| s.submissions.clone())
    }

    fn router(self) -> Router {
        Router::new()
            .route("/carts", post(create_cart))
            .route("/carts/{id}", get(show_cart))
            .route("/carts/{id}/items", post(add_item))
            .route(
                "/carts/{id}/checkout",
                get(checkout_status).post(submit_checkout),
            )
            .with_state(self)
    }
}

fn cart_json(id: &str, lines: &[(String, u32)]) -> Value {
    let unit: f64 = UNIT_PRICE.parse().unwrap();
    let count: u32 = lines.iter().map(|(_, q)| q).sum();
    let total = format!("{:.2}", unit * f64::from(count));
    json!({
        "id": id,
        "subtotalPrice": total,
        "totalPrice": total,
        "currency": { "code": "USD" },
        "lineItems": lines
            .iter()
            .enumerate()
            .map(|(i, (variant, quantity))| json!({
                "id": format!("{id}-line-{i}"),
                "productId": format!("product-{variant}"),
                "variantId": variant,
                "name": format!("Item {variant}"),
                "quantity": quantity,
                "price": UNIT_PRICE,
            }))
            .collect::<Vec<_>>(),
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {API_TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "missing token" })),
    )
        .into_response()
}

fn missing_cart() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "no such cart" })),
    )
        .into_response()
}

fn push_line(lines: &mut Vec<(String, u32)>, body: &Value) {
    let variant = body["variantId"].as_str().unwrap_or_default().to_owned();
    let quantity = u32::try_from(body["quantity"].as_u64().unwrap_or(1)).unwrap_or(1);
    match lines.iter_mut().find(|(v, _)| *v == variant) {
        Some((_, q)) => *q += quantity,
        None => lines.push((variant, quantity)),
    }
}

async fn create_cart(
    State(fake): State<FakeCommerce>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.with_state(|s| {
        s.next_cart += 1;
        let id = format!("cart-{}", s.next_cart);
        let lines = s.carts.entry(id.clone()).or_default();
        push_line(lines, &body);
        Json(cart_json(&id, lines)).into_response()
    })
}

async fn show_cart(
    State(fake): State<FakeCommerce>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.with_state(|s| match s.carts.get(&id) {
        Some(lines) => Json(cart_json(&id, lines)).into_response(),
        None => missing_cart(),
    })
}

async fn add_item(
    State(fake): State<FakeCommerce>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.with_state(|s| match s.carts.get_mut(&id) {
        Some(lines) => {
            push_line(lines, &body);
            Json(cart_json(&id, lines)).into_response()
        }
        None => missing_cart(),
    })
}

async fn checkout_status(
    State(fake): State<FakeCommerce>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    fake.with_state(|s| {
        if !s.carts.contains_key(&id) {
            return missing_cart();
        }
        Json(json!({ "hasPayment": s.has_payment, "hasShipping": s.has_shipping }))
            .into_response()
    })
}

async fn submit_checkout(
    State(fake): State<FakeCommerce>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let delay = fake.with_state(|s| s.submit_delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    fake.with_state(|s| {
        if let Some((status, message)) = &s.submit_failure {
            return (*status, Json(json!({ "message": message }))).into_response();
        }
        let Some(lines) = s.carts.get_mut(&id) else {
            return missing_cart();
        };
        lines.clear();
        s.submissions.push(body);
        Json(json!({ "orderId": format!("order-{id}") })).into_response()
    })
}

// =============================================================================
// Test context
// =============================================================================

/// A running storefront wired to a running fake backend.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub commerce: FakeCommerce,
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

impl TestContext {
    /// Start the fake backend and a storefront pointed at it.
    pub async fn spawn() -> Self {
        let commerce = FakeCommerce::default();
        let backend_addr = serve(commerce.clone().router()).await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            commerce: CommerceConfig {
                api_url: Url::parse(&format!("http://{backend_addr}/")).unwrap(),
                api_token: SecretString::from(API_TOKEN),
                cart_cache_ttl: Duration::from_secs(60),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };

        let router = app(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url,
            commerce,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a form to the storefront.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// GET a storefront page.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// Add `quantity` of `variant_id` to the session's cart.
    pub async fn add_to_cart(&self, variant_id: &str, quantity: u32) -> reqwest::Response {
        let quantity = quantity.to_string();
        self.post_form(
            "/cart/add",
            &[("variant_id", variant_id), ("quantity", quantity.as_str())],
        )
        .await
    }

    /// Fill in both checkout forms.
    pub async fn fill_checkout(&self) {
        let response = self
            .post_form(
                "/checkout/card",
                &[
                    ("cardHolder", "Ada Lovelace"),
                    ("cardNumber", "4242 4242 4242 4242"),
                    ("cardExpireDate", "12/30"),
                    ("cardCvc", "123"),
                    ("firstName", "Ada"),
                    ("lastName", "Lovelace"),
                    ("streetNumber", "1 Analytical Way"),
                    ("zipCode", "10001"),
                    ("city", "London"),
                    ("country", "GB"),
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = self
            .post_form(
                "/checkout/address",
                &[
                    ("type", "home"),
                    ("firstName", "Ada"),
                    ("lastName", "Lovelace"),
                    ("streetNumber", "1 Analytical Way"),
                    ("apartments", "Flat 2"),
                    ("zipCode", "10001"),
                    ("city", "London"),
                    ("country", "GB"),
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
