use std::sync::Arc;

use serene_core::model::{FeedbackSettings, FeedbackSettingsDraft};
use storage::repository::SettingsRepository;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<FeedbackSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails.
    pub async fn save(&self, settings: FeedbackSettings) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(&settings).await?;
        tracing::debug!(?settings, "saved feedback settings");
        Ok(())
    }

    /// Apply a partial update on top of the stored settings and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if a key is unknown or persistence fails.
    pub async fn update(
        &self,
        draft: FeedbackSettingsDraft,
    ) -> Result<FeedbackSettings, SettingsServiceError> {
        let current = self.load().await?;
        let updated = draft.apply_to(current)?;
        self.save(updated).await?;
        Ok(updated)
    }
}
