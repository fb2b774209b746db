//! # Repository Module
//!
//! One repository per aggregate. Each holds a cloned `SqlitePool` and is
//! handed out by [`crate::Database`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  route handler                                                   │
//! │       │  state.db.sales().commit(&validated, user_id, today)     │
//! │       ▼                                                          │
//! │  SaleRepository ── BEGIN ── sales ── sale_items ── payments ── COMMIT
//! │       │                                                          │
//! │       ▼                                                          │
//! │  SQLite                                                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - catalog search and stock levels
//! - [`sale::SaleRepository`] - sale commit, lookups, follow-up payments
//! - [`user::UserRepository`] - staff accounts
//! - [`customer::CustomerRepository`] - customers for credit sales
//! - [`activity::ActivityRepository`] - audit trail
//! - [`notification::NotificationRepository`] - in-app notifications
//! - [`feedback::FeedbackRepository`] - staff feedback
//! - [`drawer::DrawerRepository`] - cash drawer sessions

pub mod activity;
pub mod customer;
pub mod drawer;
pub mod feedback;
pub mod notification;
pub mod product;
pub mod sale;
pub mod user;
