//! # shopfront-db: Database Layer for Shopfront POS
//!
//! SQLite storage through sqlx. Business rules live in `shopfront-core`;
//! this crate turns validated requests into rows, inside transactions
//! where more than one table changes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopfront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ products      │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ sales, users  │    │ 001_initial  │  │   │
//! │  │   │               │    │ drawer, ...   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shopfront.db (or sqlite::memory: in tests)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shopfront.db")).await?;
//! let hits = db.products().search("soap").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use password::{hash_password, verify_password};
pub use pool::{Database, DbConfig};

pub use repository::activity::ActivityRepository;
pub use repository::customer::CustomerRepository;
pub use repository::drawer::DrawerRepository;
pub use repository::feedback::FeedbackRepository;
pub use repository::notification::NotificationRepository;
pub use repository::product::{ProductRepository, StockChange};
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
