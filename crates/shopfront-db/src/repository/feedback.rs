//! # Feedback Repository

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use shopfront_core::Feedback;

#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: SqlitePool,
}

impl FeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FeedbackRepository { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        subject: &str,
        message: &str,
        rating: Option<i64>,
    ) -> DbResult<Feedback> {
        let result = sqlx::query(
            r#"
            INSERT INTO feedback (user_id, subject, message, rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(user_id)
        .bind(subject.trim())
        .bind(message.trim())
        .bind(rating)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let feedback = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, subject, message, rating, created_at FROM feedback WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Feedback", id))?;

        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use shopfront_core::UserRole;

    #[tokio::test]
    async fn test_create_feedback() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create("u", "h", "U", UserRole::Cashier).await.unwrap();

        let fb = db
            .feedback()
            .create(user.id, " Scanner ", "Beeps twice", Some(4))
            .await
            .unwrap();
        assert_eq!(fb.subject, "Scanner");
        assert_eq!(fb.rating, Some(4));
    }
}
