//! Wishlist route handlers.
//!
//! The wishlist lives in the session; there are no accounts.

use acme_core::{ProductId, Wishlist};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;

/// Load the wishlist from the session, empty if absent.
async fn load_wishlist(session: &Session) -> Result<Wishlist> {
    Ok(session
        .get::<Wishlist>(session_keys::WISHLIST)
        .await?
        .unwrap_or_default())
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub items: Vec<String>,
}

/// Wishlist toggle button fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: String,
    pub saved: bool,
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: String,
}

/// Display the wishlist page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<WishlistTemplate> {
    let wishlist = load_wishlist(&session).await?;
    Ok(WishlistTemplate {
        items: wishlist.iter().map(|id| id.as_str().to_owned()).collect(),
    })
}

/// Add or remove a product (HTMX).
#[instrument(skip(session))]
pub async fn toggle(session: Session, Form(form): Form<ToggleForm>) -> Result<impl IntoResponse> {
    let product_id = form.product_id.trim();
    if product_id.is_empty() {
        return Err(AppError::BadRequest("product_id is required".to_string()));
    }

    let mut wishlist = load_wishlist(&session).await?;
    let saved = wishlist.toggle(ProductId::new(product_id));
    session.insert(session_keys::WISHLIST, &wishlist).await?;

    add_breadcrumb(
        "wishlist",
        if saved { "Saved product" } else { "Removed product" },
        Some(&[("product_id", product_id)]),
    );

    Ok((
        AppendHeaders([("HX-Trigger", "wishlist-updated")]),
        WishlistButtonTemplate {
            product_id: product_id.to_owned(),
            saved,
        },
    ))
}
