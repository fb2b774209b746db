//! Report endpoints.
//!
//! A storage failure still answers 200: the page renders an empty report
//! with an inline error instead of a failure screen. Bad input is a 400.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::error;

use shopfront_core::report::SalesReport;
use shopfront_core::validation::{parse_date, validate_date_range};

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyParams {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SalesReport,
}

fn date_or_today(field: &str, value: Option<&str>) -> ApiResult<NaiveDate> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Ok(parse_date(field, v)?),
        None => Ok(Local::now().date_naive()),
    }
}

async fn build(state: &AppState, from: NaiveDate, to: NaiveDate) -> ReportResponse {
    let sales = state.db.sales();
    let loaded = async {
        let rows = sales.list_between(from, to).await?;
        let units = sales.units_sold_between(from, to).await?;
        Ok::<_, shopfront_db::DbError>(SalesReport::new(from, to, rows, units))
    }
    .await;

    let report = loaded.unwrap_or_else(|e| {
        error!(%from, %to, error = %e, "Failed to load report data");
        SalesReport::failed(from, to, "Report data is temporarily unavailable")
    });

    ReportResponse {
        success: report.error.is_none(),
        report,
    }
}

/// `GET /api/reports/daily?date=YYYY-MM-DD`
pub async fn daily(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(params): Query<DailyParams>,
) -> ApiResult<Json<ReportResponse>> {
    let date = date_or_today("date", params.date.as_deref())?;
    Ok(Json(build(&state, date, date).await))
}

/// `GET /api/reports/sales?from=YYYY-MM-DD&to=YYYY-MM-DD`
pub async fn sales(
    State(state): State<AppState>,
    _ctx: RequestContext,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<ReportResponse>> {
    let to = date_or_today("to", params.to.as_deref())?;
    let from = match params.from.as_deref() {
        Some(_) => date_or_today("from", params.from.as_deref())?,
        None => to,
    };
    validate_date_range(from, to)?;

    Ok(Json(build(&state, from, to).await))
}
