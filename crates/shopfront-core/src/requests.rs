//! # Request Schemas
//!
//! Typed bodies for every write endpoint. axum deserializes into these, and
//! the handler calls `validate()` before anything touches the database.
//!
//! ## Sale Commit Validation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleCommitRequest (JSON from the sales screen)                        │
//! │       │                                                                 │
//! │       ├── items empty?                    → EmptySale                   │
//! │       ├── payment_type not cash?          → UnsupportedPaymentMethod    │
//! │       ├── per line: ids, qty, money, subtotal arithmetic                │
//! │       ├── header tax/discount/total == sums of lines                    │
//! │       ├── amount_paid < total without customer → CreditRequiresCustomer │
//! │       ▼                                                                 │
//! │  ValidatedSale (amount_paid capped, paid_status derived)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{MovementKind, PaidStatus, PaymentMethod};
use crate::validation::{
    validate_id, validate_non_negative, validate_payment_amount, validate_quantity,
    validate_rating, validate_text,
};

// =============================================================================
// Sale Commit
// =============================================================================

/// One line of a sale commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineInput {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: i64,
    #[serde(default)]
    pub tax_amount: i64,
    #[serde(default)]
    pub discount_amount: i64,
    /// Must equal `quantity * unit_price + tax_amount - discount_amount`.
    pub subtotal: i64,
}

impl SaleLineInput {
    /// Gross line value before tax and discount. `None` on overflow.
    pub fn gross(&self) -> Option<i64> {
        self.quantity.checked_mul(self.unit_price)
    }

    fn validate(&self, index: usize) -> CoreResult<()> {
        validate_id("product_id", self.product_id)?;
        validate_quantity(self.quantity)?;
        validate_non_negative("unit_price", self.unit_price)?;
        validate_non_negative("tax_amount", self.tax_amount)?;
        validate_non_negative("discount_amount", self.discount_amount)?;

        let field = format!("items[{}].subtotal", index);
        let expected = self
            .gross()
            .and_then(|g| g.checked_add(self.tax_amount))
            .and_then(|v| v.checked_sub(self.discount_amount))
            .ok_or_else(|| amount_too_large(&field))?;
        if expected != self.subtotal {
            return Err(CoreError::TotalsMismatch {
                field,
                expected,
                actual: self.subtotal,
            });
        }
        Ok(())
    }
}

/// Body of `POST /api/sales` and `POST /api/sales/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleCommitRequest {
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// Accepted for compatibility with older screens. The cashier always
    /// comes from the session.
    #[serde(default)]
    pub user_id: Option<i64>,
    pub items: Vec<SaleLineInput>,
    pub payment_type: PaymentMethod,
    pub total_amount: i64,
    #[serde(default)]
    pub tax_amount: i64,
    #[serde(default)]
    pub discount_amount: i64,
    /// Defaults to `total_amount`.
    #[serde(default)]
    pub amount_paid: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A sale commit that passed every boundary check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSale {
    pub customer_id: Option<i64>,
    pub lines: Vec<SaleLineInput>,
    pub payment_method: PaymentMethod,
    /// Sum of `quantity * unit_price`.
    pub subtotal: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    /// Capped at `total_amount`; change is never stored.
    pub amount_paid: i64,
    pub paid_status: PaidStatus,
    pub notes: Option<String>,
}

impl ValidatedSale {
    pub fn outstanding(&self) -> i64 {
        self.total_amount - self.amount_paid
    }
}

impl SaleCommitRequest {
    /// Checks the request and derives the stored amounts.
    pub fn validate(self) -> CoreResult<ValidatedSale> {
        if self.items.is_empty() {
            return Err(CoreError::EmptySale);
        }

        if !self.payment_type.is_supported() {
            return Err(CoreError::UnsupportedPaymentMethod(self.payment_type));
        }

        if let Some(customer_id) = self.customer_id {
            validate_id("customer_id", customer_id)?;
        }

        for (index, line) in self.items.iter().enumerate() {
            line.validate(index)?;
        }

        let subtotal = checked_sum("subtotal", self.items.iter().map(SaleLineInput::gross))?;
        let tax = checked_sum("tax_amount", self.items.iter().map(|l| Some(l.tax_amount)))?;
        let discount = checked_sum(
            "discount_amount",
            self.items.iter().map(|l| Some(l.discount_amount)),
        )?;
        let total = checked_sum("total_amount", self.items.iter().map(|l| Some(l.subtotal)))?;

        check_total("tax_amount", tax, self.tax_amount)?;
        check_total("discount_amount", discount, self.discount_amount)?;
        check_total("total_amount", total, self.total_amount)?;

        let amount_paid = self.amount_paid.unwrap_or(total);
        validate_non_negative("amount_paid", amount_paid)?;
        let amount_paid = amount_paid.min(total);

        if amount_paid < total && self.customer_id.is_none() {
            return Err(CoreError::CreditRequiresCustomer);
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(ValidatedSale {
            customer_id: self.customer_id,
            lines: self.items,
            payment_method: self.payment_type,
            subtotal,
            tax_amount: tax,
            discount_amount: discount,
            total_amount: total,
            amount_paid,
            paid_status: PaidStatus::from_amounts(total, amount_paid),
            notes,
        })
    }
}

fn amount_too_large(field: &str) -> CoreError {
    CoreError::Validation(ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    })
}

/// Sums line amounts, failing on the first overflow.
fn checked_sum(field: &str, mut values: impl Iterator<Item = Option<i64>>) -> CoreResult<i64> {
    values
        .try_fold(0_i64, |acc, v| v.and_then(|v| acc.checked_add(v)))
        .ok_or_else(|| amount_too_large(field))
}

fn check_total(field: &str, expected: i64, actual: i64) -> CoreResult<()> {
    if expected != actual {
        return Err(CoreError::TotalsMismatch {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Body of a successful commit response.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleCommitted {
    pub sale_id: i64,
    pub invoice_number: String,
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// Body of `POST /api/products/stock`. `stock` is the absolute new level.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustRequest {
    pub product_id: i64,
    pub stock: i64,
}

impl StockAdjustRequest {
    /// Only the id is checked; negative stock is accepted as-is.
    pub fn validate(&self) -> CoreResult<()> {
        validate_id("product_id", self.product_id)?;
        Ok(())
    }
}

// =============================================================================
// Credit Payment
// =============================================================================

/// Body of `POST /api/sales/{id}/payments`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRequest {
    pub amount: i64,
    #[serde(default = "default_payment_method")]
    pub payment_type: PaymentMethod,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

impl PaymentRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_payment_amount(self.amount)?;
        if !self.payment_type.is_supported() {
            return Err(CoreError::UnsupportedPaymentMethod(self.payment_type));
        }
        Ok(())
    }
}

// =============================================================================
// Activity Log
// =============================================================================

/// Body of `POST /api/activity`, sent by the browser for client-side events.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActivityLogRequest {
    pub action_type: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub old_values: Option<serde_json::Value>,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub new_values: Option<serde_json::Value>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ActivityLogRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_text("action_type", &self.action_type, 64)?;
        Ok(())
    }
}

// =============================================================================
// Cash Drawer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerOpenRequest {
    pub opening_float: i64,
}

impl DrawerOpenRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_non_negative("opening_float", self.opening_float)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerMovementRequest {
    pub kind: MovementKind,
    pub amount: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl DrawerMovementRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_payment_amount(self.amount)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerCloseRequest {
    pub counted_cash: i64,
}

impl DrawerCloseRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_non_negative("counted_cash", self.counted_cash)?;
        Ok(())
    }
}

// =============================================================================
// Feedback, Customers, Login
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeedbackRequest {
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub rating: Option<i64>,
}

impl FeedbackRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_text("subject", &self.subject, 200)?;
        validate_text("message", &self.message, 5000)?;
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CustomerRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_text("name", &self.name, 200)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !email.contains('@') {
                return Err(ValidationError::InvalidFormat {
                    field: "email".to_string(),
                    reason: "must contain '@'".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Credentials posted by the login form or the JSON login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_text("username", &self.username, 64)?;
        if self.password.is_empty() {
            return Err(ValidationError::required("password").into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
