//! Server-rendered sales screen shell. The cart itself runs in the browser
//! against the JSON endpoints.

use axum::{extract::State, response::Html};
use tracing::error;

use shopfront_core::{MIN_SEARCH_CHARS, SEARCH_RESULT_LIMIT};

use crate::context::PageSession;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::templates::IndexPage;

/// `GET /`
pub async fn index(
    State(state): State<AppState>,
    PageSession(ctx): PageSession,
) -> ApiResult<Html<String>> {
    let tax_rate = state.config.tax_rate();
    let page = IndexPage {
        username: &ctx.username,
        role: ctx.role.as_str(),
        tax_bps: tax_rate.bps(),
        tax_percent: tax_rate.percentage(),
        currency: &state.config.sales.currency_symbol,
        min_search: MIN_SEARCH_CHARS,
        max_results: SEARCH_RESULT_LIMIT,
    };

    let html = state.pages.index(&page).map_err(|e| {
        error!(error = %e, "Sales screen failed to render");
        ApiError::internal("page unavailable")
    })?;
    Ok(Html(html))
}
