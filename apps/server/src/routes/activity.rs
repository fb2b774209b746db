//! Activity log: browser-reported events in, audit trail out (admins only).

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shopfront_core::requests::ActivityLogRequest;

use crate::context::{AdminContext, RequestContext};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

/// `POST /api/activity`
pub async fn log(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<ActivityLogRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;

    let mut entry = ctx.activity(req.action_type.trim());
    entry.entity_type = req.entity_type;
    entry.entity_id = req.entity_id;
    entry.old_values = req.old_values;
    entry.new_values = req.new_values;
    entry.details = req.details;

    state.db.activity().record(&entry).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// `GET /api/activity?limit=`
pub async fn list(
    State(state): State<AppState>,
    AdminContext(_ctx): AdminContext,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries = state.db.activity().recent(limit).await?;
    Ok(Json(json!({ "success": true, "data": entries })))
}
