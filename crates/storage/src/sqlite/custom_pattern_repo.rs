use async_trait::async_trait;
use serene_core::model::CustomPattern;

use super::SqliteRepository;
use super::mapping::{conn, map_custom_pattern_row};
use crate::repository::{CustomPatternRepository, StorageError};

#[async_trait]
impl CustomPatternRepository for SqliteRepository {
    async fn upsert_pattern(&self, pattern: &CustomPattern) -> Result<(), StorageError> {
        let draft = pattern.pattern().to_draft();
        sqlx::query(
            r"
                INSERT INTO custom_patterns (
                    name, inhale_secs, hold_after_inhale_secs, exhale_secs,
                    hold_after_exhale_secs, total_cycles, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(name) DO UPDATE SET
                    inhale_secs = excluded.inhale_secs,
                    hold_after_inhale_secs = excluded.hold_after_inhale_secs,
                    exhale_secs = excluded.exhale_secs,
                    hold_after_exhale_secs = excluded.hold_after_exhale_secs,
                    total_cycles = excluded.total_cycles,
                    created_at = excluded.created_at
            ",
        )
        .bind(pattern.name())
        .bind(draft.inhale)
        .bind(draft.hold_after_inhale)
        .bind(draft.exhale)
        .bind(draft.hold_after_exhale)
        .bind(i64::from(draft.total_cycles))
        .bind(pattern.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_pattern(&self, name: &str) -> Result<Option<CustomPattern>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT name, inhale_secs, hold_after_inhale_secs, exhale_secs,
                       hold_after_exhale_secs, total_cycles, created_at
                FROM custom_patterns
                WHERE name = ?1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_custom_pattern_row).transpose()
    }

    async fn list_patterns(&self) -> Result<Vec<CustomPattern>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT name, inhale_secs, hold_after_inhale_secs, exhale_secs,
                       hold_after_exhale_secs, total_cycles, created_at
                FROM custom_patterns
                ORDER BY name COLLATE NOCASE, name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_custom_pattern_row).collect()
    }

    async fn delete_pattern(&self, name: &str) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM custom_patterns WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }

    async fn clear_patterns(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM custom_patterns")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected())
    }
}
