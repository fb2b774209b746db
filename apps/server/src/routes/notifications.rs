//! In-app notifications for the signed-in user.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub unread_only: bool,
}

/// `GET /api/notifications?unread_only=true`
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let notifications = state
        .db
        .notifications()
        .list_for(ctx.user_id, params.unread_only)
        .await?;
    let unread = notifications.iter().filter(|n| !n.is_read).count();

    Ok(Json(json!({
        "success": true,
        "data": notifications,
        "unread": unread,
    })))
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.db.notifications().mark_read(id, ctx.user_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/notifications/read-all`
pub async fn read_all(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Json<Value>> {
    let updated = state.db.notifications().mark_all_read(ctx.user_id).await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}
