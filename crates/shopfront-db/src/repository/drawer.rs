//! # Cash Drawer Repository
//!
//! ```text
//! open(float) ──► status=open ──► movement(cash_in/cash_out)* ──► close(counted)
//!                                                                   │
//!                              expected_cash, counted_cash stored ◄─┘
//! ```
//!
//! A partial unique index allows one open session per cashier.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use shopfront_core::{CashMovement, CoreError, DrawerSession, MovementKind};

const SESSION_SELECT: &str = r#"
    SELECT id, user_id, opening_float, status, opened_at, closed_at, expected_cash, counted_cash
    FROM cash_drawer_sessions
"#;

#[derive(Debug, Clone)]
pub struct DrawerRepository {
    pool: SqlitePool,
}

impl DrawerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DrawerRepository { pool }
    }

    /// ## Errors
    /// * `CoreError::DrawerAlreadyOpen` - the cashier has an open session
    pub async fn open(&self, user_id: i64, opening_float: i64) -> DbResult<DrawerSession> {
        let result = sqlx::query(
            r#"
            INSERT INTO cash_drawer_sessions (user_id, opening_float, status, opened_at)
            VALUES (?1, ?2, 'open', ?3)
            "#,
        )
        .bind(user_id)
        .bind(opening_float)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::Rule(CoreError::DrawerAlreadyOpen),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        info!(session_id = id, user_id, opening_float, "Cash drawer opened");
        self.get_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<DrawerSession> {
        let sql = format!("{SESSION_SELECT} WHERE id = ?1");
        sqlx::query_as::<_, DrawerSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Drawer session", id))
    }

    /// The cashier's open session, if any.
    pub async fn current(&self, user_id: i64) -> DbResult<Option<DrawerSession>> {
        let sql = format!("{SESSION_SELECT} WHERE user_id = ?1 AND status = 'open'");
        let session = sqlx::query_as::<_, DrawerSession>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    pub async fn add_movement(
        &self,
        session_id: i64,
        kind: MovementKind,
        amount: i64,
        reason: Option<&str>,
        user_id: i64,
    ) -> DbResult<CashMovement> {
        let result = sqlx::query(
            r#"
            INSERT INTO cash_movements (session_id, kind, amount, reason, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(session_id)
        .bind(kind)
        .bind(amount)
        .bind(reason)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, CashMovement>(
            "SELECT id, session_id, kind, amount, reason, user_id, created_at FROM cash_movements WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Cash movement", id))
    }

    pub async fn movements(&self, session_id: i64) -> DbResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(
            r#"
            SELECT id, session_id, kind, amount, reason, user_id, created_at
            FROM cash_movements
            WHERE session_id = ?1
            ORDER BY id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Closes an open session, storing the reconciliation figures.
    pub async fn close(&self, session_id: i64, expected: i64, counted: i64) -> DbResult<DrawerSession> {
        let result = sqlx::query(
            r#"
            UPDATE cash_drawer_sessions
            SET status = 'closed', closed_at = ?2, expected_cash = ?3, counted_cash = ?4
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(session_id)
        .bind(Utc::now())
        .bind(expected)
        .bind(counted)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::DrawerNotOpen.into());
        }

        info!(session_id, expected, counted, variance = counted - expected, "Cash drawer closed");
        self.get_by_id(session_id).await
    }
}
