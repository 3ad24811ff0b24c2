//! Cart and checkout route handlers

use axum::http::{header, HeaderMap, StatusCode};
use axum::{extract::State, response::IntoResponse, response::Response, routing::get, routing::post, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::state::SharedState;
use crate::cart::models::{Cart, CartOwner, DeliveryType, ProductId, ShippingInfo};
use crate::error::CheckoutError;

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update", post(update_quantity))
        .route("/cart/remove", post(remove_from_cart))
        .route("/cart/clear", post(clear_cart))
        .route("/checkout", post(checkout))
        .route("/wishlist/toggle", post(toggle_wishlist))
}

// =============================================================================
// Session handling
// =============================================================================

/// Reads the `cart_session` cookie, minting a new session id if absent.
fn resolve_session_id(headers: &HeaderMap) -> (String, bool) {
    if let Some(cookie) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for part in cookie.split(';') {
            if let Some(value) = part.trim().strip_prefix("cart_session=") {
                if !value.is_empty() {
                    return (value.to_string(), false);
                }
            }
        }
    }
    (Uuid::new_v4().simple().to_string(), true)
}

/// Attaches the session cookie to a response for newly-minted sessions.
fn with_session_cookie(mut response: Response, session_id: &str, is_new: bool) -> Response {
    if is_new {
        let cookie_val = format!("cart_session={}; Path=/; HttpOnly", session_id);
        if let Ok(value) = cookie_val.parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

// =============================================================================
// Wire models
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartInput {
    product_id: ProductId,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

/// Returns the default quantity (1) for added items
fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQuantityInput {
    product_id: ProductId,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInput {
    product_id: ProductId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutInput {
    delivery_type: DeliveryType,
    #[serde(default)]
    shipping: ShippingInfo,
}

/// Cart contents plus the derived values the storefront renders.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView {
    owner: CartOwner,
    lines: Vec<crate::cart::models::CartLine>,
    total: Decimal,
    line_count: usize,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            total: cart.total(),
            line_count: cart.line_count(),
            owner: cart.owner,
            lines: cart.lines,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Endpoint: GET /cart
async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (session_id, is_new) = resolve_session_id(&headers);
    let reconciler = state.reconciler(&session_id).await;

    let response = Json(CartView::from(reconciler.snapshot().await)).into_response();
    with_session_cookie(response, &session_id, is_new)
}

/// Endpoint: POST /cart/add
/// Adds a catalog product to the session's cart, merging quantities.
async fn add_to_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<AddToCartInput>,
) -> Response {
    let (session_id, is_new) = resolve_session_id(&headers);

    let snapshot = match state.backend.product_snapshot(&payload.product_id).await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "unknown product" })),
            )
                .into_response();
        }
        Err(err) => {
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    let reconciler = state.reconciler(&session_id).await;
    reconciler.add(&snapshot, payload.quantity).await;

    let response = Json(CartView::from(reconciler.snapshot().await)).into_response();
    with_session_cookie(response, &session_id, is_new)
}

/// Endpoint: POST /cart/update
async fn update_quantity(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateQuantityInput>,
) -> Response {
    let (session_id, is_new) = resolve_session_id(&headers);
    let reconciler = state.reconciler(&session_id).await;

    reconciler
        .update_quantity(&payload.product_id, payload.quantity)
        .await;

    let response = Json(CartView::from(reconciler.snapshot().await)).into_response();
    with_session_cookie(response, &session_id, is_new)
}

/// Endpoint: POST /cart/remove
async fn remove_from_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<ProductInput>,
) -> Response {
    let (session_id, is_new) = resolve_session_id(&headers);
    let reconciler = state.reconciler(&session_id).await;

    reconciler.remove(&payload.product_id).await;

    let response = Json(CartView::from(reconciler.snapshot().await)).into_response();
    with_session_cookie(response, &session_id, is_new)
}

/// Endpoint: POST /cart/clear
async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (session_id, is_new) = resolve_session_id(&headers);
    let reconciler = state.reconciler(&session_id).await;

    reconciler.clear().await;

    let response = Json(CartView::from(reconciler.snapshot().await)).into_response();
    with_session_cookie(response, &session_id, is_new)
}

/// Endpoint: POST /checkout
/// Places one order per store in the cart. Partial failures are reported
/// with the stores that succeeded so the UI can tell the buyer.
async fn checkout(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutInput>,
) -> Response {
    let (session_id, is_new) = resolve_session_id(&headers);
    let reconciler = state.reconciler(&session_id).await;

    let result = state
        .orchestrator
        .checkout(&reconciler, payload.delivery_type, &payload.shipping)
        .await;

    let response = match result {
        Ok(order_ids) => Json(json!({
            "status": "placed",
            "orderIds": order_ids,
        }))
        .into_response(),
        Err(CheckoutError::Validation(msg)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "rejected", "error": msg })),
        )
            .into_response(),
        Err(CheckoutError::Timeout) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(json!({ "status": "failed", "error": "checkout timed out, try again" })),
        )
            .into_response(),
        Err(CheckoutError::Backend(msg)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "status": "failed", "error": msg })),
        )
            .into_response(),
        Err(CheckoutError::PartialFailure {
            succeeded,
            failed_store,
            remaining,
            reason,
        }) => {
            let succeeded: Vec<_> = succeeded
                .into_iter()
                .map(|(store, order)| json!({ "storeId": store, "orderId": order }))
                .collect();
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "status": "partial",
                    "succeeded": succeeded,
                    "failedStore": failed_store,
                    "remaining": remaining,
                    "error": reason,
                })),
            )
                .into_response()
        }
    };
    with_session_cookie(response, &session_id, is_new)
}

/// Endpoint: POST /wishlist/toggle
/// Requires an authenticated session.
async fn toggle_wishlist(
    State(state): State<SharedState>,
    Json(payload): Json<ProductInput>,
) -> Response {
    let Some(user) = state.auth.current_user() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "sign in to use the wishlist" })),
        )
            .into_response();
    };

    match state.wishlist.toggle(&user.id, &payload.product_id).await {
        Ok(change) => Json(json!({
            "productId": payload.product_id,
            "wishlisted": change == crate::cart::wishlist::WishlistChange::Added,
        }))
        .into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}
