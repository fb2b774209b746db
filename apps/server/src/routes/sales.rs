//! # Sale Endpoints
//!
//! ```text
//! Legacy two-phase flow (stock already written by /api/products/stock):
//!
//!   POST /api/sales ──► validate ──► BEGIN; sales, sale_items, payment; COMMIT
//!
//! Atomic flow:
//!
//!   POST /api/sales/checkout ──► validate ──► BEGIN
//!                                              │ per line: stock -= qty WHERE stock >= qty
//!                                              │ any miss → ROLLBACK, 409
//!                                              ▼
//!                                  sales, sale_items, payment; COMMIT
//! ```
//!
//! Both flows take the cashier from the session. A `user_id` in the body is
//! ignored. Identical payloads submitted twice create two sales.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Local;
use serde_json::{json, Value};
use tracing::{debug, info};

use shopfront_core::requests::{PaymentRequest, SaleCommitRequest, SaleCommitted, ValidatedSale};

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::routes::{audit, notify_if_low_stock};
use crate::state::AppState;

fn validate(ctx: &RequestContext, req: SaleCommitRequest) -> ApiResult<ValidatedSale> {
    if let Some(claimed) = req.user_id.filter(|id| *id != ctx.user_id) {
        debug!(claimed, user_id = ctx.user_id, "Ignoring user_id from sale payload");
    }
    Ok(req.validate()?)
}

async fn after_commit(
    state: &AppState,
    ctx: &RequestContext,
    sale: &ValidatedSale,
    committed: &SaleCommitted,
    action: &str,
) {
    audit(
        state,
        ctx.activity(action)
            .entity("sale", committed.sale_id)
            .change(
                None,
                Some(json!({
                    "invoice_number": committed.invoice_number,
                    "total_amount": sale.total_amount,
                    "amount_paid": sale.amount_paid,
                    "paid_status": sale.paid_status,
                    "outstanding": sale.outstanding(),
                    "lines": sale.lines.len(),
                })),
            ),
    )
    .await;
}

fn committed_response(committed: SaleCommitted) -> Json<Value> {
    Json(json!({ "success": true, "data": committed }))
}

/// `POST /api/sales`
pub async fn commit(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<SaleCommitRequest>,
) -> ApiResult<Json<Value>> {
    let sale = validate(&ctx, req)?;
    let today = Local::now().date_naive();

    let committed = state.db.sales().commit(&sale, ctx.user_id, today).await?;
    after_commit(&state, &ctx, &sale, &committed, "sale_commit").await;

    Ok(committed_response(committed))
}

/// `POST /api/sales/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<SaleCommitRequest>,
) -> ApiResult<Json<Value>> {
    let sale = validate(&ctx, req)?;
    let today = Local::now().date_naive();

    let committed = state
        .db
        .sales()
        .reserve_and_commit(&sale, ctx.user_id, today)
        .await?;
    after_commit(&state, &ctx, &sale, &committed, "sale_checkout").await;

    for line in &sale.lines {
        if let Ok(Some(product)) = state.db.products().get_by_id(line.product_id).await {
            notify_if_low_stock(&state, &product).await;
        }
    }

    Ok(committed_response(committed))
}

/// `GET /api/sales/:id`
pub async fn get_sale(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let detail = state.db.sales().get_detail(id).await?;
    Ok(Json(json!({ "success": true, "data": detail })))
}

/// `GET /api/sales/outstanding`
pub async fn outstanding(
    State(state): State<AppState>,
    _ctx: RequestContext,
) -> ApiResult<Json<Value>> {
    let sales = state.db.sales().list_outstanding().await?;
    let total: i64 = sales.iter().map(|s| s.outstanding()).sum();

    Ok(Json(json!({
        "success": true,
        "data": sales,
        "outstanding_total": total,
    })))
}

/// `POST /api/sales/:id/payments`
pub async fn record_payment(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<PaymentRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;

    let sale = state
        .db
        .sales()
        .record_payment(id, req.amount, req.payment_type, ctx.user_id)
        .await?;

    info!(sale_id = id, amount = req.amount, user_id = ctx.user_id, "Credit payment taken");
    audit(
        &state,
        ctx.activity("payment").entity("sale", id).change(
            None,
            Some(json!({
                "amount": req.amount,
                "amount_paid": sale.amount_paid,
                "paid_status": sale.paid_status,
            })),
        ),
    )
    .await;

    Ok(Json(json!({ "success": true, "data": sale })))
}
