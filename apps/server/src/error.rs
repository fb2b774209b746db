//! # API Error Type
//!
//! Every handler returns `Result<_, ApiError>`. The error renders as JSON
//! with the status taken from its [`ErrorCode`].
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler                                                                │
//! │     │                                                                   │
//! │     ├── ValidationError ──► CoreError::Validation ──┐                   │
//! │     ├── CoreError (rule) ───────────────────────────┤                   │
//! │     ├── DbError::Rule(CoreError) ───────────────────┤                   │
//! │     └── DbError (sqlx) ── logged, generic message ──┴──► ApiError       │
//! │                                                          │              │
//! │                                                          ▼              │
//! │   HTTP 4xx/5xx  {"success":false,"code":"NOT_FOUND","message":"..."}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database details never reach the browser; they go to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use shopfront_core::{CoreError, ValidationError};
use shopfront_db::DbError;

/// Error returned from HTTP handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// No valid session (401)
    Unauthenticated,

    /// Session lacks the required role (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// State conflict such as a drawer already open (409)
    Conflict,

    /// Guarded stock decrement failed (409)
    InsufficientStock,

    /// Business rule rejected the request (422)
    BusinessRule,

    /// Payment method not implemented (422)
    UnsupportedPayment,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict | ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::BusinessRule | ErrorCode::UnsupportedPayment => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        }));
        (self.status(), body).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rule(core) => core.into(),
            DbError::NotFound { entity, .. } => ApiError::not_found(format!("{} not found", entity)),
            DbError::UniqueViolation { field } => {
                ApiError::new(ErrorCode::Conflict, format!("{} already exists", field))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "database error")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "database error")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::SaleNotFound(_)
            | CoreError::NotInCart(_) => ErrorCode::NotFound,
            CoreError::OutOfStock { .. } | CoreError::InsufficientStock { .. } => {
                ErrorCode::InsufficientStock
            }
            CoreError::EmptySale
            | CoreError::TotalsMismatch { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::UnsupportedPaymentMethod(_) => ErrorCode::UnsupportedPayment,
            CoreError::CreditRequiresCustomer
            | CoreError::Overpayment { .. }
            | CoreError::AlreadyPaid(_) => ErrorCode::BusinessRule,
            CoreError::DrawerAlreadyOpen | CoreError::DrawerNotOpen => ErrorCode::Conflict,
        };

        let message = match &err {
            CoreError::ProductNotFound(_) => "Product not found".to_string(),
            CoreError::SaleNotFound(_) => "Sale not found".to_string(),
            CoreError::Validation(inner) => inner.to_string(),
            other => other.to_string(),
        };

        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
