//! End-to-end tests for the cart sidebar and checkout submission.
//!
//! Each test spawns its own storefront and fake commerce backend, so they
//! run in parallel without shared state.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use acme_core::SidebarView;
use acme_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::spawn().await;
    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_home_redirects_to_cart() {
    let ctx = TestContext::spawn().await;
    let response = ctx.get("/").await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/cart");
}

#[tokio::test]
async fn test_empty_cart_page() {
    let ctx = TestContext::spawn().await;
    let response = ctx.get("/cart").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["cache-control"], "no-store, max-age=0");

    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty."));

    // Visiting the cart page leaves the sidebar open for later fragments
    let sidebar = ctx.get("/checkout").await.text().await.unwrap();
    assert!(sidebar.contains("sidebar--cart"));
}

#[tokio::test]
async fn test_add_to_cart_opens_sidebar() {
    let ctx = TestContext::spawn().await;

    let response = ctx.add_to_cart("mug", 2).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");

    let body = response.text().await.unwrap();
    assert!(body.contains("sidebar--cart"));
    assert!(body.contains("Item mug"));
    assert!(body.contains("$25.00"));

    // Same cart is reused on the next add
    let body = ctx.add_to_cart("tee", 1).await.text().await.unwrap();
    assert!(body.contains("Item mug"));
    assert!(body.contains("Item tee"));
    assert!(body.contains("$37.50"));
}

#[tokio::test]
async fn test_add_to_cart_rejects_bad_quantity() {
    let ctx = TestContext::spawn().await;
    let response = ctx.add_to_cart("mug", 0).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sidebar_navigation() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;

    let body = ctx
        .post_form("/sidebar/view", &[("view", SidebarView::PaymentView.as_str())])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("sidebar--payment"));
    // Back from payment returns to checkout
    assert!(body.contains(r#"value="CHECKOUT_VIEW""#));

    let body = ctx
        .post_form("/sidebar/view", &[("view", "shipping")])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("sidebar--shipping"));

    let body = ctx
        .post_form("/sidebar/close", &[])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("hidden"));
    assert!(!body.contains("sidebar--"));

    // Reopening after a close starts from the cart
    let body = ctx.add_to_cart("mug", 1).await.text().await.unwrap();
    assert!(body.contains("sidebar--cart"));
}

#[tokio::test]
async fn test_unknown_view_is_bad_request() {
    let ctx = TestContext::spawn().await;
    let response = ctx.post_form("/sidebar/view", &[("view", "ORDERS_VIEW")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_card_number_is_never_echoed() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;
    ctx.fill_checkout().await;

    let body = ctx
        .post_form("/sidebar/view", &[("view", "payment")])
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("•••• 4242"));
    assert!(!body.contains("4242 4242"));
    assert!(!body.contains(r#"value="123""#));
    assert!(body.contains(r#"value="Ada Lovelace""#));
}

#[tokio::test]
async fn test_submit_without_details_is_refused() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;
    ctx.commerce.set_ready(true, false);
    ctx.post_form("/sidebar/view", &[("view", "checkout")]).await;

    let response = ctx.post_form("/checkout/submit", &[]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response.text().await.unwrap();
    assert!(body.contains("Add payment and shipping details"));
    assert!(body.contains(r#"id="confirm-purchase" disabled"#));
    assert!(ctx.commerce.submissions().is_empty());
}

#[tokio::test]
async fn test_submit_without_cart_is_refused() {
    let ctx = TestContext::spawn().await;
    let response = ctx.post_form("/checkout/submit", &[]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_successful_purchase() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 2).await;
    ctx.fill_checkout().await;
    ctx.commerce.set_ready(true, true);

    let checkout = ctx.get("/checkout").await.text().await.unwrap();
    assert!(checkout.contains("sidebar--checkout"));
    assert!(!checkout.contains(r#"id="confirm-purchase" disabled"#));

    let response = ctx.post_form("/checkout/submit", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    let body = response.text().await.unwrap();
    assert!(body.contains("Thank you for your order"));
    assert!(body.contains("order-cart-1"));

    let submissions = ctx.commerce.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["card"]["cardNumber"], "4242 4242 4242 4242");
    assert_eq!(submissions[0]["address"]["type"], "home");
    assert_eq!(submissions[0]["address"]["city"], "London");

    // Sidebar is closed
    let sidebar = ctx.get("/checkout").await.text().await.unwrap();
    assert!(sidebar.contains("hidden"));
    assert!(!sidebar.contains("sidebar--"));

    // Draft is cleared
    let body = ctx
        .post_form("/sidebar/view", &[("view", "shipping")])
        .await
        .text()
        .await
        .unwrap();
    assert!(!body.contains("1 Analytical Way"));

    let cart = ctx.get("/cart").await.text().await.unwrap();
    assert!(cart.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_overlapping_submits_place_one_order() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;
    ctx.fill_checkout().await;
    ctx.commerce.set_ready(true, true);
    ctx.commerce.slow_submissions(Duration::from_millis(400));

    // Second press lands while the first is still waiting on the backend
    let first = ctx.post_form("/checkout/submit", &[]);
    let second = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        ctx.post_form("/checkout/submit", &[]).await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = first.text().await.unwrap();
    assert!(body.contains("Thank you for your order"));
    assert_eq!(ctx.commerce.submissions().len(), 1);

    // The flag is cleared once the first submission finishes
    let checkout = ctx.post_form("/sidebar/view", &[("view", "checkout")]).await;
    let body = checkout.text().await.unwrap();
    assert!(!body.contains(r#"aria-busy="true""#));
}

#[tokio::test]
async fn test_failed_purchase_shows_notice_and_keeps_draft() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;
    ctx.fill_checkout().await;
    ctx.commerce.set_ready(true, true);
    ctx.commerce
        .fail_submissions(StatusCode::UNPROCESSABLE_ENTITY, "Card declined");

    let response = ctx.post_form("/checkout/submit", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Card declined"));
    assert!(body.contains("sidebar--checkout"));
    // Loading flag was reset, so the button is usable again
    assert!(!body.contains(r#"id="confirm-purchase" disabled"#));
    assert!(body.contains("1 Analytical Way"));
    assert!(ctx.commerce.submissions().is_empty());
}

#[tokio::test]
async fn test_backend_crash_shows_generic_notice() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;
    ctx.fill_checkout().await;
    ctx.commerce.set_ready(true, true);
    ctx.commerce
        .fail_submissions(StatusCode::INTERNAL_SERVER_ERROR, "deadlock on orders_pkey");

    let response = ctx.post_form("/checkout/submit", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Please try again."));
    assert!(!body.contains("orders_pkey"));
}

#[tokio::test]
async fn test_clear_discards_draft() {
    let ctx = TestContext::spawn().await;
    ctx.add_to_cart("mug", 1).await;
    ctx.fill_checkout().await;

    let response = ctx.post_form("/checkout/clear", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = ctx
        .post_form("/sidebar/view", &[("view", "shipping")])
        .await
        .text()
        .await
        .unwrap();
    assert!(!body.contains("1 Analytical Way"));
}

#[tokio::test]
async fn test_unknown_route_renders_not_found() {
    let ctx = TestContext::spawn().await;
    let response = ctx.get("/no/such/page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.text().await.unwrap();
    assert!(body.contains("You have lost your way"));
    assert!(body.contains("/no/such/page"));
}
