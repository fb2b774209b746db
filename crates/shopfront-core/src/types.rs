//! # Domain Types
//!
//! Records shared by every layer of Shopfront POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                Sales                     Back office           │
//! │  ───────                ─────                     ───────────           │
//! │  Category ◄─┐           Sale ◄──── SaleItem       User                  │
//! │  Product ───┘            │  ◄───── SalePayment    ActivityEntry         │
//! │                          └──► Customer            Notification          │
//! │                                                   Feedback              │
//! │                         DrawerSession ◄── CashMovement                  │
//! │                                                                         │
//! │  All ids are SQLite rowids (i64). All money is i64 minor units.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With the `sqlx` feature enabled every record derives `FromRow` and every
//! enum maps to a lowercase TEXT column.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_REORDER_LEVEL;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (825 = 8.25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a percentage, for display only.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Cashier,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Cashier => "cashier",
        }
    }
}

/// A staff account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_login_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A product as returned by the lookup and stock endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    /// Business code, unique.
    pub code: String,
    pub barcode: Option<String>,
    pub name: String,
    /// Unit price in minor units.
    pub price: i64,
    pub category_id: Option<i64>,
    /// Joined from `categories`; absent on queries without the join.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub category_name: Option<String>,
    /// Current stock. May be negative; the legacy adjustment path never checks.
    pub stock: i64,
    pub reorder_level: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price)
    }

    /// True when stock has reached the reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_level
    }
}

/// Fields required to create a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub code: String,
    pub barcode: Option<String>,
    pub name: String,
    pub price: i64,
    pub category_id: Option<i64>,
    pub stock: i64,
    #[serde(default = "default_reorder_level")]
    pub reorder_level: i64,
}

fn default_reorder_level() -> i64 {
    DEFAULT_REORDER_LEVEL
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale or a payment was settled.
///
/// Only `Cash` completes today; the others deserialize so that requests
/// naming them can be rejected with a clear message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Paid Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaidStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaidStatus {
    /// Derives the status from what was paid against what is owed.
    ///
    /// ```rust
    /// use shopfront_core::PaidStatus;
    ///
    /// assert_eq!(PaidStatus::from_amounts(2000, 2000), PaidStatus::Paid);
    /// assert_eq!(PaidStatus::from_amounts(2000, 500), PaidStatus::Partial);
    /// assert_eq!(PaidStatus::from_amounts(2000, 0), PaidStatus::Unpaid);
    /// ```
    pub fn from_amounts(total: i64, paid: i64) -> Self {
        if paid >= total {
            PaidStatus::Paid
        } else if paid <= 0 {
            PaidStatus::Unpaid
        } else {
            PaidStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaidStatus::Paid => "paid",
            PaidStatus::Partial => "partial",
            PaidStatus::Unpaid => "unpaid",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    /// `INV-YYYYMMDD-NNNNNN`, assigned right after the header insert.
    pub invoice_number: Option<String>,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub customer_id: Option<i64>,
    /// Cashier taken from the session, never from the request body.
    pub user_id: i64,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub paid_status: PaidStatus,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// What is still owed on this sale.
    pub fn outstanding(&self) -> i64 {
        (self.total_amount - self.amount_paid).max(0)
    }
}

/// A sale line. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    /// `quantity * unit_price + tax_amount - discount_amount`
    pub subtotal: i64,
}

/// A payment recorded against a sale, either at commit or later on credit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalePayment {
    pub id: i64,
    pub sale_id: i64,
    pub amount: i64,
    pub method: PaymentMethod,
    pub user_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale with its lines and payments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<SalePayment>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// One append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// JSON text snapshot before the change.
    pub old_values: Option<String>,
    /// JSON text snapshot after the change.
    pub new_values: Option<String>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields of an activity entry before it is stored.
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewActivity {
    pub fn new(action_type: impl Into<String>) -> Self {
        NewActivity {
            action_type: action_type.into(),
            ..Default::default()
        }
    }

    pub fn entity(mut self, entity_type: &str, entity_id: impl ToString) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self.entity_id = Some(entity_id.to_string());
        self
    }

    pub fn change(
        mut self,
        old_values: Option<serde_json::Value>,
        new_values: Option<serde_json::Value>,
    ) -> Self {
        self.old_values = old_values;
        self.new_values = new_values;
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// =============================================================================
// Notifications & Feedback
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Notification {
    pub id: i64,
    /// `None` means every user sees it.
    pub user_id: Option<i64>,
    /// `low_stock`, `info`, ...
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub rating: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Drawer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DrawerStatus {
    Open,
    Closed,
}

/// One cashier shift at the till.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DrawerSession {
    pub id: i64,
    pub user_id: i64,
    pub opening_float: i64,
    pub status: DrawerStatus,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub expected_cash: Option<i64>,
    pub counted_cash: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    CashIn,
    CashOut,
}

/// Cash put into or taken out of the drawer outside of a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashMovement {
    pub id: i64,
    pub session_id: i64,
    pub kind: MovementKind,
    pub amount: i64,
    pub reason: Option<String>,
    pub user_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_paid_status_boundaries() {
        assert_eq!(PaidStatus::from_amounts(1000, 1500), PaidStatus::Paid);
        assert_eq!(PaidStatus::from_amounts(1000, 999), PaidStatus::Partial);
        assert_eq!(PaidStatus::from_amounts(1000, 0), PaidStatus::Unpaid);
        // A free sale is paid by definition
        assert_eq!(PaidStatus::from_amounts(0, 0), PaidStatus::Paid);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let method: PaymentMethod = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(method, PaymentMethod::Transfer);
        assert!(!method.is_supported());
        assert!(PaymentMethod::Cash.is_supported());
        assert_eq!(serde_json::to_string(&MovementKind::CashOut).unwrap(), "\"cash_out\"");
    }

    #[test]
    fn test_user_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            full_name: "Admin".to_string(),
            role: UserRole::Admin,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
