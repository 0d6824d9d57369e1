//! Home, health and not-found handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use crate::filters;

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub path: String,
}

/// The storefront opens on the cart.
pub async fn home() -> Redirect {
    Redirect::to("/cart")
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the commerce backend.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unknown routes.
#[instrument]
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!("No route for {uri}");
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            path: uri.path().to_owned(),
        },
    )
}
