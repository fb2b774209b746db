//! # shopfront-core: Pure Business Logic for Shopfront POS
//!
//! Every rule that does not need a database or a socket lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Shopfront POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser (sales screen)                       │   │
//! │  │    Search box ──► Cart table ──► Pay button ──► Invoice         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopfront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   types   money   requests   cart   report   drawer            │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopfront-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Sale, DrawerSession, ...)
//! - [`money`] - Integer money and tax math
//! - [`requests`] - Typed request bodies, validated at the HTTP boundary
//! - [`cart`] - The sales screen cart and its stock bookkeeping
//! - [`report`] - End-of-day and range aggregation
//! - [`drawer`] - Cash drawer reconciliation
//! - [`validation`] - Field-level validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfront_core::money::Money;
//! use shopfront_core::types::TaxRate;
//!
//! let price = Money::from_cents(1099);
//! let tax = price.calculate_tax(TaxRate::from_bps(825));
//! assert_eq!(tax.cents(), 91);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod drawer;
pub mod error;
pub mod money;
pub mod report;
pub mod requests;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum rows returned by the product lookup.
pub const SEARCH_RESULT_LIMIT: i64 = 10;

/// Minimum query length before the sales screen issues a lookup.
///
/// Only the client applies this; the server accepts any non-blank query.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Stock level at or below which a product counts as low on stock.
pub const DEFAULT_REORDER_LEVEL: i64 = 5;
