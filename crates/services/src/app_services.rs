use std::sync::Arc;
use std::time::Duration;

use serene_core::cycle::DEFAULT_TICK;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::feedback::{FeedbackDispatcher, TonePlayer, Vibrator};
use crate::history_service::HistoryService;
use crate::library_service::LibraryService;
use crate::sessions::BreathingSessionService;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    tick: Duration,
    settings: Arc<SettingsService>,
    library: Arc<LibraryService>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over throwaway in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            clock,
            tick: DEFAULT_TICK,
            settings: Arc::new(SettingsService::new(Arc::clone(&storage.settings))),
            library: Arc::new(LibraryService::new(
                clock,
                Arc::clone(&storage.custom_patterns),
            )),
            history: Arc::new(HistoryService::new(
                clock,
                Arc::clone(&storage.sessions),
                Arc::clone(&storage.custom_patterns),
            )),
        }
    }

    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    /// Feedback dispatcher configured from the persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the settings cannot be loaded.
    pub async fn feedback(
        &self,
        vibrator: Arc<dyn Vibrator>,
        tones: Arc<dyn TonePlayer>,
    ) -> Result<FeedbackDispatcher, AppServicesError> {
        let settings = self.settings.load().await?;
        Ok(FeedbackDispatcher::new(settings, vibrator, tones))
    }

    /// Session runner wired to the history log and the given feedback outputs.
    #[must_use]
    pub fn sessions(&self, feedback: FeedbackDispatcher) -> BreathingSessionService {
        BreathingSessionService::new(self.history.as_ref().clone(), feedback).with_tick(self.tick)
    }
}
