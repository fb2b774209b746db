//! # Notification Repository
//!
//! In-app notifications. A row with no `user_id` is a broadcast that every
//! user sees; marking a broadcast read marks it for everyone.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use shopfront_core::Notification;

pub const KIND_LOW_STOCK: &str = "low_stock";

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    pub async fn create(
        &self,
        user_id: Option<i64>,
        kind: &str,
        title: &str,
        message: &str,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, kind, title, message, is_read, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// The user's own notifications plus broadcasts, newest first.
    pub async fn list_for(&self, user_id: i64, unread_only: bool) -> DbResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, title, message, is_read, created_at
            FROM notifications
            WHERE (user_id = ?1 OR user_id IS NULL)
              AND (?2 = 0 OR is_read = 0)
            ORDER BY id DESC
            LIMIT 100
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn mark_read(&self, id: i64, user_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND (user_id = ?2 OR user_id IS NULL)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }
        Ok(())
    }

    /// Returns the number of notifications that changed.
    pub async fn mark_all_read(&self, user_id: i64) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE is_read = 0 AND (user_id = ?1 OR user_id IS NULL)",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopfront_core::UserRole;

    #[tokio::test]
    async fn test_broadcast_and_personal_notifications() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.users().create("a", "h", "A", UserRole::Cashier).await.unwrap();
        let b = db.users().create("b", "h", "B", UserRole::Cashier).await.unwrap();
        let repo = db.notifications();

        repo.create(None, KIND_LOW_STOCK, "Low stock", "Soap: 2 left").await.unwrap();
        let personal = repo.create(Some(a.id), "info", "Hi", "Welcome").await.unwrap();

        assert_eq!(repo.list_for(a.id, false).await.unwrap().len(), 2);
        assert_eq!(repo.list_for(b.id, false).await.unwrap().len(), 1);

        // b cannot mark a's notification
        assert!(repo.mark_read(personal, b.id).await.is_err());
        repo.mark_read(personal, a.id).await.unwrap();
        assert_eq!(repo.list_for(a.id, true).await.unwrap().len(), 1);

        assert_eq!(repo.mark_all_read(b.id).await.unwrap(), 1);
        assert!(repo.list_for(a.id, true).await.unwrap().is_empty());
    }
}
