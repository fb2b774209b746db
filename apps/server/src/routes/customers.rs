//! Customers, needed to attribute credit sales.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shopfront_core::requests::CustomerRequest;

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::routes::audit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/customers?q=`
pub async fn list(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let customers = state.db.customers().search(&params.q, 50).await?;
    Ok(Json(json!({ "success": true, "data": customers })))
}

/// `POST /api/customers`
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<CustomerRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate()?;

    let customer = state
        .db
        .customers()
        .create(&req.name, req.phone.as_deref(), req.email.as_deref())
        .await?;
    audit(&state, ctx.activity("customer_create").entity("customer", customer.id)).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": customer })),
    ))
}
