//! # Activity Repository
//!
//! Append-only audit trail. Rows are never updated or deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shopfront_core::{ActivityEntry, NewActivity};

#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Appends one entry; snapshots are stored as JSON text.
    pub async fn record(&self, entry: &NewActivity) -> DbResult<i64> {
        let old_values = entry
            .old_values
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let new_values = entry
            .new_values
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO activity_log (
                user_id, username, action_type, entity_type, entity_id,
                old_values, new_values, details, ip_address, user_agent, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(&entry.action_type)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(old_values)
        .bind(new_values)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(action = %entry.action_type, user_id = ?entry.user_id, "Activity recorded");
        Ok(result.last_insert_rowid())
    }

    /// Newest entries first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            r#"
            SELECT id, user_id, username, action_type, entity_type, entity_id,
                   old_values, new_values, details, ip_address, user_agent, created_at
            FROM activity_log
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_record_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.activity();

        let mut entry = NewActivity::new("stock_adjust")
            .entity("product", 12)
            .change(Some(json!({"stock": 10})), Some(json!({"stock": 8})));
        entry.user_id = Some(1);
        entry.username = Some("till".to_string());
        entry.ip_address = Some("10.0.0.7".to_string());
        repo.record(&entry).await.unwrap();
        repo.record(&NewActivity::new("logout")).await.unwrap();

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action_type, "logout");
        assert_eq!(recent[1].entity_id.as_deref(), Some("12"));

        let old: serde_json::Value =
            serde_json::from_str(recent[1].old_values.as_deref().unwrap()).unwrap();
        assert_eq!(old["stock"], 10);
    }
}
