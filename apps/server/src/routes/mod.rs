//! # HTTP Routes
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  /health                          health      (no session)          │
//! │  /login, /logout, /api/auth/*     session     (login is public)     │
//! │  /                                pages       (redirects to /login) │
//! │  /api/products/*                  products                          │
//! │  /api/sales/*                     sales                             │
//! │  /api/reports/*                   reports                           │
//! │  /api/drawer/*                    drawer                            │
//! │  /api/notifications/*             notifications                     │
//! │  /api/feedback                    feedback                          │
//! │  /api/activity                    activity    (GET is admin only)   │
//! │  /api/customers                   customers                         │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `/api` handler takes a [`crate::context::RequestContext`], so a
//! missing or expired session is a 401 before any handler code runs.

use axum::{
    routing::{get, post},
    Router,
};
use tracing::warn;

use shopfront_core::{NewActivity, Product};
use shopfront_db::repository::notification::KIND_LOW_STOCK;

use crate::state::AppState;

pub mod activity;
pub mod customers;
pub mod drawer;
pub mod feedback;
pub mod health;
pub mod notifications;
pub mod pages;
pub mod products;
pub mod reports;
pub mod sales;
pub mod session;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Pages and session
        .route("/", get(pages::index))
        .route("/login", get(session::login_form).post(session::login_submit))
        .route("/logout", get(session::logout).post(session::logout))
        .route("/api/auth/login", post(session::api_login))
        .route("/api/auth/logout", post(session::api_logout))
        .route("/api/auth/me", get(session::me))
        // Catalog
        .route("/api/products/search", get(products::search))
        .route("/api/products/stock", post(products::adjust_stock))
        .route("/api/products/:id", get(products::get_product))
        // Sales
        .route("/api/sales", post(sales::commit))
        .route("/api/sales/checkout", post(sales::checkout))
        .route("/api/sales/outstanding", get(sales::outstanding))
        .route("/api/sales/:id", get(sales::get_sale))
        .route("/api/sales/:id/payments", post(sales::record_payment))
        // Reports
        .route("/api/reports/daily", get(reports::daily))
        .route("/api/reports/sales", get(reports::sales))
        // Cash drawer
        .route("/api/drawer/open", post(drawer::open))
        .route("/api/drawer/movements", post(drawer::movement))
        .route("/api/drawer/current", get(drawer::current))
        .route("/api/drawer/close", post(drawer::close))
        // Notifications, feedback, activity
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/read-all", post(notifications::read_all))
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route("/api/feedback", post(feedback::submit))
        .route("/api/activity", get(activity::list).post(activity::log))
        // Customers
        .route("/api/customers", get(customers::list).post(customers::create))
}

/// Writes an audit entry. A failure is logged and never fails the request.
pub(crate) async fn audit(state: &AppState, entry: NewActivity) {
    if let Err(e) = state.db.activity().record(&entry).await {
        warn!(action = %entry.action_type, error = %e, "Failed to record activity");
    }
}

/// Broadcasts a low-stock notification when a product is at or below its
/// reorder level.
pub(crate) async fn notify_if_low_stock(state: &AppState, product: &Product) {
    if !product.is_low_stock() {
        return;
    }

    let message = format!(
        "{} ({}) has {} left, reorder level {}",
        product.name, product.code, product.stock, product.reorder_level
    );
    if let Err(e) = state
        .db
        .notifications()
        .create(None, KIND_LOW_STOCK, "Low stock", &message)
        .await
    {
        warn!(product_id = product.id, error = %e, "Failed to create low-stock notification");
    }
}
