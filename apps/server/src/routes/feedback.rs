//! Staff feedback. Stored first, then mailed when a recipient is configured.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use shopfront_core::requests::FeedbackRequest;

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// `POST /api/feedback`
pub async fn submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiJson(req): ApiJson<FeedbackRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;

    let feedback = state
        .db
        .feedback()
        .create(ctx.user_id, &req.subject, &req.message, req.rating)
        .await?;
    info!(feedback_id = feedback.id, user_id = ctx.user_id, "Feedback received");

    let mut mailed = false;
    if let Some(recipient) = state.config.feedback.recipient.as_deref() {
        let subject = format!("[Shopfront feedback] {}", feedback.subject);
        let rating = feedback
            .rating
            .map(|r| format!("{}/5", r))
            .unwrap_or_else(|| "none".to_string());
        let body = format!(
            "From: {}\nRating: {}\n\n{}",
            ctx.username, rating, feedback.message
        );

        match state.mailer.send(recipient, &subject, &body) {
            Ok(()) => mailed = true,
            Err(e) => warn!(feedback_id = feedback.id, error = %e, "Feedback mail not sent"),
        }
    }

    Ok(Json(json!({
        "success": true,
        "data": feedback,
        "mailed": mailed,
    })))
}
