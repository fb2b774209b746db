//! # Customer Repository
//!
//! Customers exist so that credit sales have someone to owe the balance.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use shopfront_core::Customer;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Customer> {
        let result = sqlx::query(
            "INSERT INTO customers (name, phone, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(name.trim())
        .bind(phone.map(str::trim).filter(|p| !p.is_empty()))
        .bind(email.map(str::trim).filter(|e| !e.is_empty()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, created_at FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    /// Name or phone substring search; an empty query lists everyone.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", query.trim());
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, created_at
            FROM customers
            WHERE name LIKE ?1 OR phone LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }
}
