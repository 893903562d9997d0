use async_trait::async_trait;
use serene_core::model::{CompletedSession, CompletedSessionRow, SessionId};

use super::SqliteRepository;
use super::mapping::{conn, i64_from_u64, map_session_row, map_session_row_with_id, u64_from_i64};
use crate::repository::{SessionHistoryRepository, StorageError};

#[async_trait]
impl SessionHistoryRepository for SqliteRepository {
    async fn append_session(&self, session: &CompletedSession) -> Result<SessionId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO completed_sessions (
                    technique_name, duration_secs, cycles_completed, completed_at
                )
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(session.technique_name())
        .bind(i64_from_u64("duration_secs", session.duration_secs())?)
        .bind(i64::from(session.cycles_completed()))
        .bind(session.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(SessionId::new(res.last_insert_rowid()))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<CompletedSessionRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, technique_name, duration_secs, cycles_completed, completed_at
                FROM completed_sessions
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_session_row_with_id).collect()
    }

    async fn list_all(&self) -> Result<Vec<CompletedSession>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT technique_name, duration_secs, cycles_completed, completed_at
                FROM completed_sessions
                ORDER BY completed_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_session_row).collect()
    }

    async fn count_sessions(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM completed_sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64_from_i64("count", count)
    }

    async fn clear_sessions(&self) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM completed_sessions")
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(res.rows_affected())
    }
}
