use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::SessionId;

/// Record appended to the history log once a session run completes.
///
/// Records are never edited individually; the only bulk operation is clearing all history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    technique_name: String,
    duration_secs: u64,
    cycles_completed: u32,
    completed_at: DateTime<Utc>,
}

impl CompletedSession {
    /// Build a record from the elapsed run time. Sub-second remainders are dropped.
    #[must_use]
    pub fn new(
        technique_name: impl Into<String>,
        elapsed: Duration,
        cycles_completed: u32,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            technique_name: technique_name.into(),
            duration_secs: elapsed.as_secs(),
            cycles_completed,
            completed_at,
        }
    }

    /// Rehydrate a record from persisted storage.
    #[must_use]
    pub fn from_persisted(
        technique_name: String,
        duration_secs: u64,
        cycles_completed: u32,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            technique_name,
            duration_secs,
            cycles_completed,
            completed_at,
        }
    }

    #[must_use]
    pub fn technique_name(&self) -> &str {
        &self.technique_name
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    #[must_use]
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Calendar day (UTC) the session was completed on.
    #[must_use]
    pub fn completed_on(&self) -> NaiveDate {
        self.completed_at.date_naive()
    }
}

/// A completed session together with its storage id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSessionRow {
    pub id: SessionId,
    #[serde(flatten)]
    pub session: CompletedSession,
}

impl CompletedSessionRow {
    #[must_use]
    pub fn new(id: SessionId, session: CompletedSession) -> Self {
        Self { id, session }
    }
}
