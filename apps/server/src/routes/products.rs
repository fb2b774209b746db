//! Product lookup and the absolute stock endpoint.
//!
//! ```text
//! GET  /api/products/search?q=soap   → {success, results:[...]}   (max 10)
//! GET  /api/products/:id             → {success, data: product}
//! POST /api/products/stock           → {success, message, data:{product_id,new_stock}}
//! ```
//!
//! The stock endpoint overwrites the level the browser computed from its
//! cached baseline. Two tills selling the same product race; the last
//! write wins. `POST /api/sales/checkout` is the race-free path.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use shopfront_core::requests::StockAdjustRequest;
use shopfront_core::validation::validate_search_query;
use shopfront_core::ValidationError;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::FormOrJson;
use crate::routes::{audit, notify_if_low_stock};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let query = validate_search_query(params.q.as_deref()).map_err(|e| match e {
        ValidationError::Required { .. } => ApiError::validation("query required"),
        other => ApiError::from(other),
    })?;

    let results = state.db.products().search(&query).await?;
    debug!(query = %query, hits = results.len(), "Product search");

    Ok(Json(json!({ "success": true, "results": results })))
}

pub async fn get_product(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Json(json!({ "success": true, "data": product })))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(req): FormOrJson<StockAdjustRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;

    let change = state.db.products().set_stock(req.product_id, req.stock).await?;
    let product = &change.product;

    info!(
        product_id = product.id,
        previous = change.previous_stock,
        stock = product.stock,
        user_id = ctx.user_id,
        "Stock adjusted"
    );

    audit(
        &state,
        ctx.activity("stock_adjust").entity("product", product.id).change(
            Some(json!({ "stock": change.previous_stock })),
            Some(json!({ "stock": product.stock })),
        ),
    )
    .await;
    notify_if_low_stock(&state, product).await;

    Ok(Json(json!({
        "success": true,
        "message": "Stock updated",
        "data": { "product_id": product.id, "new_stock": product.stock },
    })))
}
