//! Cash drawer sessions.
//!
//! ```text
//! expected = opening_float + cash_sales + cash_in - cash_out
//! variance = counted - expected
//! ```
//!
//! `cash_sales` counts every cash payment the cashier recorded since the
//! session opened, including repayments on credit sales.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use shopfront_core::drawer::DrawerReconciliation;
use shopfront_core::requests::{DrawerCloseRequest, DrawerMovementRequest, DrawerOpenRequest};
use shopfront_core::{CoreError, DrawerSession};

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::routes::audit;
use crate::state::AppState;

async fn open_session(state: &AppState, ctx: &RequestContext) -> ApiResult<DrawerSession> {
    state
        .db
        .drawer()
        .current(ctx.user_id)
        .await?
        .ok_or_else(|| CoreError::DrawerNotOpen.into())
}

async fn reconcile(
    state: &AppState,
    session: &DrawerSession,
    counted: Option<i64>,
) -> ApiResult<DrawerReconciliation> {
    let movements = state.db.drawer().movements(session.id).await?;
    let cash_sales = state
        .db
        .sales()
        .cash_taken_since(session.user_id, session.opened_at)
        .await?;
    Ok(DrawerReconciliation::compute(session, &movements, cash_sales, counted))
}

/// `POST /api/drawer/open`
pub async fn open(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<DrawerOpenRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;

    let session = state.db.drawer().open(ctx.user_id, req.opening_float).await?;
    audit(
        &state,
        ctx.activity("drawer_open")
            .entity("drawer_session", session.id)
            .change(None, Some(json!({ "opening_float": req.opening_float }))),
    )
    .await;

    Ok(Json(json!({ "success": true, "data": session })))
}

/// `POST /api/drawer/movements`
pub async fn movement(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<DrawerMovementRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let session = open_session(&state, &ctx).await?;

    let reason = req.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let movement = state
        .db
        .drawer()
        .add_movement(session.id, req.kind, req.amount, reason, ctx.user_id)
        .await?;

    info!(session_id = session.id, kind = ?req.kind, amount = req.amount, "Drawer movement");
    Ok(Json(json!({ "success": true, "data": movement })))
}

/// `GET /api/drawer/current`
pub async fn current(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Json<Value>> {
    let Some(session) = state.db.drawer().current(ctx.user_id).await? else {
        return Ok(Json(json!({ "success": true, "data": null })));
    };

    let movements = state.db.drawer().movements(session.id).await?;
    let reconciliation = reconcile(&state, &session, None).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "session": session,
            "movements": movements,
            "reconciliation": reconciliation,
        },
    })))
}

/// `POST /api/drawer/close`
pub async fn close(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<DrawerCloseRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let session = open_session(&state, &ctx).await?;

    let reconciliation = reconcile(&state, &session, Some(req.counted_cash)).await?;
    state
        .db
        .drawer()
        .close(session.id, reconciliation.expected, req.counted_cash)
        .await?;

    audit(
        &state,
        ctx.activity("drawer_close")
            .entity("drawer_session", session.id)
            .change(None, serde_json::to_value(&reconciliation).ok()),
    )
    .await;

    Ok(Json(json!({ "success": true, "data": reconciliation })))
}
