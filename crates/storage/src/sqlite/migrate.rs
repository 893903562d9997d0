use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies pending schema versions in order, recording each in `schema_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: settings, session history and saved patterns.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS feedback_settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    haptic_enabled INTEGER NOT NULL,
                    haptic_pattern TEXT NOT NULL,
                    sound_enabled INTEGER NOT NULL,
                    sound_type TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS completed_sessions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    technique_name TEXT NOT NULL,
                    duration_secs INTEGER NOT NULL CHECK (duration_secs >= 0),
                    cycles_completed INTEGER NOT NULL CHECK (cycles_completed >= 0),
                    completed_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS custom_patterns (
                    name TEXT PRIMARY KEY,
                    inhale_secs REAL NOT NULL CHECK (inhale_secs > 0),
                    hold_after_inhale_secs REAL NOT NULL CHECK (hold_after_inhale_secs >= 0),
                    exhale_secs REAL NOT NULL CHECK (exhale_secs > 0),
                    hold_after_exhale_secs REAL NOT NULL CHECK (hold_after_exhale_secs >= 0),
                    total_cycles INTEGER NOT NULL CHECK (total_cycles > 0),
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_completed_sessions_completed_at
                    ON completed_sessions (completed_at, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
