use async_trait::async_trait;
use serene_core::model::FeedbackSettings;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{SettingsRepository, StorageError};

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<FeedbackSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT haptic_enabled, haptic_pattern, sound_enabled, sound_type
            FROM feedback_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let haptic_enabled: bool = row.try_get("haptic_enabled").map_err(ser)?;
        let haptic_pattern: String = row.try_get("haptic_pattern").map_err(ser)?;
        let sound_enabled: bool = row.try_get("sound_enabled").map_err(ser)?;
        let sound_type: String = row.try_get("sound_type").map_err(ser)?;

        FeedbackSettings::from_persisted(haptic_enabled, &haptic_pattern, sound_enabled, &sound_type)
            .map(Some)
            .map_err(ser)
    }

    async fn save_settings(&self, settings: &FeedbackSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO feedback_settings (id, haptic_enabled, haptic_pattern, sound_enabled, sound_type)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                haptic_enabled = excluded.haptic_enabled,
                haptic_pattern = excluded.haptic_pattern,
                sound_enabled = excluded.sound_enabled,
                sound_type = excluded.sound_type
            ",
        )
        .bind(1_i64)
        .bind(settings.haptic_enabled())
        .bind(settings.haptic_pattern().key())
        .bind(settings.sound_enabled())
        .bind(settings.sound_type().key())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
