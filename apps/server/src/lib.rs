//! # Shopfront Server
//!
//! HTTP front of the point of sale: JSON endpoints for the browser cart,
//! a login page and cookie sessions.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browser                                                                │
//! │     │  GET /api/products/search?q=soap   Cookie: shopfront_session=...  │
//! │     ▼                                                                   │
//! │  TraceLayer (span per request)                                          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Router ──► RequestContext extractor ──► handler ──► shopfront-db       │
//! │                 │ 401 if no session          │                          │
//! │                 ▼                            ▼                          │
//! │             ApiError JSON              {"success": true, ...}           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`app`] builds the complete router; tests drive it without a socket.

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod routes;
pub mod state;
pub mod templates;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// The full application router with tracing.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
