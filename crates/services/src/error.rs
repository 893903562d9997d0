//! Shared error types for the services crate.

use thiserror::Error;

use serene_core::catalog::CatalogError;
use serene_core::model::{CustomPatternError, FeedbackSettingsError, PatternError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] FeedbackSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("no technique or saved pattern named {0:?}")]
    UnknownSource(String),
    #[error("{0} seconds are required for an unsaved pattern")]
    MissingTiming(&'static str),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    CustomPattern(#[from] CustomPatternError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("failed to encode export: {0}")]
    Export(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while running a breathing session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session task ended unexpectedly: {0}")]
    Task(String),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
}
