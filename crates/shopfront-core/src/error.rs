//! # Error Types
//!
//! Domain-specific error types for shopfront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfront-core (this file)                                            │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Malformed input                                │
//! │                                                                         │
//! │  shopfront-db                                                          │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  apps/server                                                           │
//! │  └── ApiError         - What the browser sees (JSON + status)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                           DbError ──┴──► ApiError → HTTP response      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::PaymentMethod;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is unknown or inactive.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// The displayed stock of a cart line is exhausted.
    ///
    /// ## User Workflow
    /// ```text
    /// Click result "Soap" (stock 0)
    ///      │
    ///      ▼
    /// Cart::add → OutOfStock { code: "SOAP-1" }
    ///      │
    ///      ▼
    /// Screen shows "SOAP-1 is out of stock", no stock request sent
    /// ```
    #[error("{code} is out of stock")]
    OutOfStock { code: String },

    /// The guarded stock decrement of a checkout failed.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A sale was submitted with no lines.
    #[error("A sale must contain at least one item")]
    EmptySale,

    /// The payment method exists but is not implemented.
    #[error("Payment method '{0}' is not supported")]
    UnsupportedPaymentMethod(PaymentMethod),

    /// Submitted totals disagree with the submitted lines.
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    TotalsMismatch {
        field: String,
        expected: i64,
        actual: i64,
    },

    /// An amount below the total was paid without a customer to owe it.
    #[error("A customer is required when the amount paid is below the total")]
    CreditRequiresCustomer,

    /// Sale id is unknown.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// Payment exceeds what is still owed on a sale.
    #[error("Payment of {amount} exceeds outstanding balance of {outstanding}")]
    Overpayment { amount: i64, outstanding: i64 },

    /// The sale has nothing left to pay.
    #[error("Sale {0} is already fully paid")]
    AlreadyPaid(i64),

    /// The cashier already has an open drawer session.
    #[error("A cash drawer session is already open")]
    DrawerAlreadyOpen,

    /// No open drawer session exists for the cashier.
    #[error("No cash drawer session is open")]
    DrawerNotOpen,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Product is not a line of the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad date, bad characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OutOfStock {
            code: "SOAP-1".to_string(),
        };
        assert_eq!(err.to_string(), "SOAP-1 is out of stock");

        let err = CoreError::UnsupportedPaymentMethod(PaymentMethod::Card);
        assert_eq!(err.to_string(), "Payment method 'card' is not supported");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("q").to_string(), "q is required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("items").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
