//! Cart route handlers.
//!
//! The cart is picked by the caller's guest session (see
//! [`GuestSession`]); there is no cart id in any path.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use corner_shop_core::{CartLineId, ProductId, Quantity};

use super::{AppJson, AppPath};
use crate::db::Store;
use crate::error::Result;
use crate::middleware::GuestSession;
use crate::models::{CartLineView, CartView};
use crate::state::AppState;

/// Body of `POST /cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: ProductId,
    /// Defaults to one.
    #[serde(default)]
    pub quantity: Quantity,
}

/// Body of `PUT /cart/items/{item_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    pub quantity: Quantity,
}

/// Show the cart with live prices and totals.
#[instrument(skip(state))]
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    GuestSession(session): GuestSession,
) -> Result<Json<CartView>> {
    Ok(Json(state.carts().view_cart(&session).await?))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear<S: Store>(
    State(state): State<AppState<S>>,
    GuestSession(session): GuestSession,
) -> Result<StatusCode> {
    state.carts().clear_cart(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a product, merging with an existing line.
#[instrument(skip(state))]
pub async fn add_item<S: Store>(
    State(state): State<AppState<S>>,
    GuestSession(session): GuestSession,
    AppJson(body): AppJson<AddItem>,
) -> Result<Json<CartLineView>> {
    let line = state
        .carts()
        .add_item(&session, body.product_id, body.quantity)
        .await?;
    Ok(Json(line))
}

/// Overwrite a line's quantity.
#[instrument(skip(state))]
pub async fn update_item<S: Store>(
    State(state): State<AppState<S>>,
    GuestSession(session): GuestSession,
    AppPath(item_id): AppPath<CartLineId>,
    AppJson(body): AppJson<UpdateItem>,
) -> Result<Json<CartLineView>> {
    let line = state
        .carts()
        .update_item(&session, item_id, body.quantity)
        .await?;
    Ok(Json(line))
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove_item<S: Store>(
    State(state): State<AppState<S>>,
    GuestSession(session): GuestSession,
    AppPath(item_id): AppPath<CartLineId>,
) -> Result<StatusCode> {
    state.carts().remove_item(&session, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
