//! # Validation Module
//!
//! Field validators shared by request schemas and repositories.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Browser script                                               │
//! │  └── is_searchable(): skip lookups under 2 characters                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum extractor (serde) + THIS MODULE                         │
//! │  └── Typed request bodies, then field rules                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  └── NOT NULL, UNIQUE, FOREIGN KEY                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MIN_SEARCH_CHARS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes a product lookup query.
///
/// A missing or blank query is rejected with `"query required"` semantics.
/// One-character queries pass; the two-character floor is a client rule
/// (see [`is_searchable`]).
///
/// ```rust
/// use shopfront_core::validation::validate_search_query;
///
/// assert_eq!(validate_search_query(Some("  cola ")).unwrap(), "cola");
/// assert!(validate_search_query(Some("   ")).is_err());
/// assert!(validate_search_query(None).is_err());
/// ```
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<String> {
    let query = query.map(str::trim).unwrap_or_default();

    if query.is_empty() {
        return Err(ValidationError::required("query"));
    }

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Whether the sales screen should issue a lookup for this input.
pub fn is_searchable(input: &str) -> bool {
    input.trim().chars().count() >= MIN_SEARCH_CHARS
}

/// Validates a product code.
///
/// ## Rules
/// - 1 to 50 characters
/// - Letters, digits, hyphens, underscores
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required free-text field with a maximum length.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a positive entity id (`product_id`, `sale_id`, ...).
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a line quantity: 1 ..= MAX_ITEM_QUANTITY.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a money field that may be zero but not negative.
pub fn validate_non_negative(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a payment or cash movement amount (> 0).
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

/// Validates a feedback rating (1 ..= 5).
pub fn validate_rating(rating: i64) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

// =============================================================================
// Collection & Date Validators
// =============================================================================

/// Validates that the cart can take another distinct line.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` query parameter.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

/// Validates that a report range is not inverted.
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> ValidationResult<()> {
    if from > to {
        return Err(ValidationError::InvalidFormat {
            field: "from".to_string(),
            reason: "must not be after 'to'".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_accepts_single_char() {
        assert_eq!(validate_search_query(Some("a")).unwrap(), "a");
        assert!(!is_searchable("a"));
        assert!(is_searchable("ab"));
        assert!(!is_searchable(" a "));
    }

    #[test]
    fn test_search_query_rejects_blank() {
        assert!(matches!(
            validate_search_query(Some("")),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_search_query(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_product_code() {
        assert!(validate_product_code("SOAP-100").is_ok());
        assert!(validate_product_code("bev_1").is_ok());
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("product_id", 1).is_ok());
        assert!(validate_id("product_id", 0).is_err());
        assert!(validate_id("product_id", -4).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_parse_date_and_range() {
        let from = parse_date("from", "2026-03-01").unwrap();
        let to = parse_date("to", "2026-03-31").unwrap();
        assert!(validate_date_range(from, to).is_ok());
        assert!(validate_date_range(to, from).is_err());
        assert!(parse_date("from", "03/01/2026").is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }
}
