//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use corner_shop_core::{OrderId, Page};

use super::{AppJson, AppPath, AppQuery};
use crate::db::Store;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{GuestSession, RequireAdmin};
use crate::models::{GuestInfo, OrderLineView, OrderSummary, OrderView};
use crate::state::AppState;

/// Place an order from the caller's cart.
#[instrument(skip(state, guest))]
pub async fn place<S: Store>(
    State(state): State<AppState<S>>,
    GuestSession(session): GuestSession,
    AppJson(guest): AppJson<GuestInfo>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let order = state.checkout().place_order(&session, guest).await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        &[("order_id", order.order.id.to_string())],
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders, newest first (admin).
#[instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
    _admin: RequireAdmin,
    AppQuery(page): AppQuery<Page>,
) -> Result<Json<Vec<OrderSummary>>> {
    Ok(Json(state.orders().list_orders(page).await?))
}

/// Show an order with its lines.
#[instrument(skip(state))]
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    AppPath(id): AppPath<OrderId>,
) -> Result<Json<OrderView>> {
    Ok(Json(state.orders().get_order(id).await?))
}

/// List an order's lines.
#[instrument(skip(state))]
pub async fn items<S: Store>(
    State(state): State<AppState<S>>,
    AppPath(id): AppPath<OrderId>,
) -> Result<Json<Vec<OrderLineView>>> {
    Ok(Json(state.orders().order_items(id).await?))
}
