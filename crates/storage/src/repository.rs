use async_trait::async_trait;
use serene_core::model::{
    CompletedSession, CompletedSessionRow, CustomPattern, FeedbackSettings, SessionId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted feedback configuration (single record).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch the stored settings, or `None` when the user never saved any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_settings(&self) -> Result<Option<FeedbackSettings>, StorageError>;

    /// Persist settings, replacing the previous record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &FeedbackSettings) -> Result<(), StorageError>;
}

/// Append-only log of completed sessions.
#[async_trait]
pub trait SessionHistoryRepository: Send + Sync {
    /// Append a completed session and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_session(&self, session: &CompletedSession) -> Result<SessionId, StorageError>;

    /// Most recent sessions first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_recent(&self, limit: u32) -> Result<Vec<CompletedSessionRow>, StorageError>;

    /// Every recorded session in completion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_all(&self) -> Result<Vec<CompletedSession>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn count_sessions(&self) -> Result<u64, StorageError>;

    /// Delete the whole history, returning how many records were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn clear_sessions(&self) -> Result<u64, StorageError>;
}

/// User-saved patterns keyed by their unique name.
#[async_trait]
pub trait CustomPatternRepository: Send + Sync {
    /// Insert a pattern, replacing any existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pattern cannot be stored.
    async fn upsert_pattern(&self, pattern: &CustomPattern) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn get_pattern(&self, name: &str) -> Result<Option<CustomPattern>, StorageError>;

    /// All saved patterns ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_patterns(&self) -> Result<Vec<CustomPattern>, StorageError>;

    /// Delete by name. Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn delete_pattern(&self, name: &str) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn clear_patterns(&self) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    settings: Arc<Mutex<Option<FeedbackSettings>>>,
    sessions: Arc<Mutex<Vec<CompletedSessionRow>>>,
    next_session_id: Arc<Mutex<i64>>,
    patterns: Arc<Mutex<BTreeMap<String, CustomPattern>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Sort key that orders names case-insensitively while keeping distinct names apart.
fn pattern_key(name: &str) -> String {
    format!("{}\u{0}{name}", name.to_lowercase())
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<FeedbackSettings>, StorageError> {
        let guard = self.settings.lock().map_err(poisoned)?;
        Ok(*guard)
    }

    async fn save_settings(&self, settings: &FeedbackSettings) -> Result<(), StorageError> {
        let mut guard = self.settings.lock().map_err(poisoned)?;
        *guard = Some(*settings);
        Ok(())
    }
}

#[async_trait]
impl SessionHistoryRepository for InMemoryRepository {
    async fn append_session(&self, session: &CompletedSession) -> Result<SessionId, StorageError> {
        let mut next = self.next_session_id.lock().map_err(poisoned)?;
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        *next += 1;
        let id = SessionId::new(*next);
        guard.push(CompletedSessionRow::new(id, session.clone()));
        Ok(id)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<CompletedSessionRow>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        let mut rows = guard.clone();
        rows.sort_by(|a, b| {
            b.session
                .completed_at()
                .cmp(&a.session.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<CompletedSession>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        let mut rows = guard.clone();
        rows.sort_by(|a, b| {
            a.session
                .completed_at()
                .cmp(&b.session.completed_at())
                .then(a.id.cmp(&b.id))
        });
        Ok(rows.into_iter().map(|row| row.session).collect())
    }

    async fn count_sessions(&self) -> Result<u64, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        Ok(guard.len() as u64)
    }

    async fn clear_sessions(&self) -> Result<u64, StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        let removed = guard.len() as u64;
        guard.clear();
        Ok(removed)
    }
}

#[async_trait]
impl CustomPatternRepository for InMemoryRepository {
    async fn upsert_pattern(&self, pattern: &CustomPattern) -> Result<(), StorageError> {
        let mut guard = self.patterns.lock().map_err(poisoned)?;
        guard.insert(pattern_key(pattern.name()), pattern.clone());
        Ok(())
    }

    async fn get_pattern(&self, name: &str) -> Result<Option<CustomPattern>, StorageError> {
        let guard = self.patterns.lock().map_err(poisoned)?;
        Ok(guard.get(&pattern_key(name)).cloned())
    }

    async fn list_patterns(&self) -> Result<Vec<CustomPattern>, StorageError> {
        let guard = self.patterns.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn delete_pattern(&self, name: &str) -> Result<bool, StorageError> {
        let mut guard = self.patterns.lock().map_err(poisoned)?;
        Ok(guard.remove(&pattern_key(name)).is_some())
    }

    async fn clear_patterns(&self) -> Result<u64, StorageError> {
        let mut guard = self.patterns.lock().map_err(poisoned)?;
        let removed = guard.len() as u64;
        guard.clear();
        Ok(removed)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
    pub sessions: Arc<dyn SessionHistoryRepository>,
    pub custom_patterns: Arc<dyn CustomPatternRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionHistoryRepository> = Arc::new(repo.clone());
        let custom_patterns: Arc<dyn CustomPatternRepository> = Arc::new(repo);
        Self {
            settings,
            sessions,
            custom_patterns,
        }
    }
}
