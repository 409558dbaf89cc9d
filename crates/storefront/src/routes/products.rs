//! Product route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use corner_shop_core::{Page, ProductId};

use super::{AppJson, AppPath, AppQuery};
use crate::db::Store;
use crate::error::Result;
use crate::middleware::{OptionalAdmin, RequireAdmin};
use crate::models::{NewProduct, Product, ProductChanges, ProductFilter};
use crate::state::AppState;

/// Query parameters for `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    /// Honoured for admins only; everyone else sees active products.
    pub active_only: Option<bool>,
}

impl ProductQuery {
    fn into_filter(self, is_admin: bool) -> ProductFilter {
        ProductFilter {
            category: self.category.filter(|c| !c.is_empty()),
            active_only: !is_admin || self.active_only.unwrap_or(true),
            page: Page::new(self.skip.unwrap_or(0), self.limit.unwrap_or(Page::MAX_LIMIT)),
        }
    }
}

/// List products.
#[instrument(skip(state))]
pub async fn list<S: Store>(
    State(state): State<AppState<S>>,
    OptionalAdmin(is_admin): OptionalAdmin,
    AppQuery(query): AppQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = query.into_filter(is_admin);
    Ok(Json(state.catalog().list_products(&filter).await?))
}

/// List distinct product categories.
#[instrument(skip(state))]
pub async fn categories<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.catalog().list_categories().await?))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    AppPath(id): AppPath<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get_product(id).await?))
}

/// Create a product (admin).
#[instrument(skip(state, input))]
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    _admin: RequireAdmin,
    AppJson(input): AppJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_product(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin).
#[instrument(skip(state, changes))]
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    _admin: RequireAdmin,
    AppPath(id): AppPath<ProductId>,
    AppJson(changes): AppJson<ProductChanges>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().update_product(id, &changes).await?))
}

/// Delete a product (admin).
#[instrument(skip(state))]
pub async fn delete<S: Store>(
    State(state): State<AppState<S>>,
    _admin: RequireAdmin,
    AppPath(id): AppPath<ProductId>,
) -> Result<StatusCode> {
    state.catalog().delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
