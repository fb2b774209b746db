use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use shopfront_db::migrations::migration_status;

use crate::state::AppState;

/// Liveness plus a trivial database query. No session required.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let db_up = state.db.health_check().await;
    let migrations = if db_up {
        match migration_status(state.db.pool()).await {
            Ok((embedded, applied)) => json!({ "embedded": embedded, "applied": applied }),
            Err(e) => {
                warn!(error = %e, "Could not read migration status");
                Value::Null
            }
        }
    } else {
        Value::Null
    };
    let status = if db_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if db_up { "up" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": if db_up { "up" } else { "down" },
            "migrations": migrations,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
