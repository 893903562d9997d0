use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use serene_core::cycle::RunOutcome;
use serene_core::model::{
    CompletedSession, CompletedSessionRow, CustomPattern, PatternDraft, SessionId,
};
use serene_core::stats::ProgressStats;
use storage::repository::{CustomPatternRepository, SessionHistoryRepository};

use crate::Clock;
use crate::error::HistoryError;

/// Full data export, as written by the `export` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportData {
    pub sessions: Vec<CompletedSession>,
    pub streak: u32,
    pub total_sessions: u64,
    pub custom_patterns: Vec<ExportedPattern>,
    pub export_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedPattern {
    pub name: String,
    #[serde(flatten)]
    pub pattern: PatternDraft,
    pub created_at: DateTime<Utc>,
}

impl From<&CustomPattern> for ExportedPattern {
    fn from(custom: &CustomPattern) -> Self {
        Self {
            name: custom.name().to_owned(),
            pattern: custom.pattern().to_draft(),
            created_at: custom.created_at(),
        }
    }
}

/// Counts removed by [`HistoryService::clear_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearedData {
    pub sessions: u64,
    pub custom_patterns: u64,
}

/// Session history, progress statistics and data export.
#[derive(Clone)]
pub struct HistoryService {
    clock: Clock,
    sessions: Arc<dyn SessionHistoryRepository>,
    patterns: Arc<dyn CustomPatternRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionHistoryRepository>,
        patterns: Arc<dyn CustomPatternRepository>,
    ) -> Self {
        Self {
            clock,
            sessions,
            patterns,
        }
    }

    /// Append a completed run to the history log.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if the record cannot be persisted.
    pub async fn record(
        &self,
        technique_name: &str,
        outcome: &RunOutcome,
    ) -> Result<(SessionId, CompletedSession), HistoryError> {
        let session = CompletedSession::new(
            technique_name,
            outcome.elapsed,
            outcome.cycles_completed,
            self.clock.now(),
        );
        let id = self.sessions.append_session(&session).await?;
        tracing::info!(
            %id,
            technique = technique_name,
            duration_secs = session.duration_secs(),
            cycles = session.cycles_completed(),
            "recorded completed session"
        );
        Ok((id, session))
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn recent(&self, limit: u32) -> Result<Vec<CompletedSessionRow>, HistoryError> {
        Ok(self.sessions.list_recent(limit).await?)
    }

    /// Number of recorded sessions.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn count(&self) -> Result<u64, HistoryError> {
        Ok(self.sessions.count_sessions().await?)
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn progress(&self) -> Result<ProgressStats, HistoryError> {
        let sessions = self.sessions.list_all().await?;
        Ok(ProgressStats::from_sessions(&sessions, self.clock.today()))
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn export(&self) -> Result<ExportData, HistoryError> {
        let sessions = self.sessions.list_all().await?;
        let stats = ProgressStats::from_sessions(&sessions, self.clock.today());
        let custom_patterns = self
            .patterns
            .list_patterns()
            .await?
            .iter()
            .map(ExportedPattern::from)
            .collect();

        Ok(ExportData {
            sessions,
            streak: stats.streak_days,
            total_sessions: stats.total_sessions,
            custom_patterns,
            export_date: self.clock.now(),
        })
    }

    /// Pretty-printed JSON export.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` on repository or encoding failures.
    pub async fn export_json(&self) -> Result<String, HistoryError> {
        let data = self.export().await?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Suggested export file name, e.g. `sereneflow-data-2023-11-14.json`.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        format!("sereneflow-data-{}.json", self.clock.today().format("%Y-%m-%d"))
    }

    /// Remove all sessions and saved patterns.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn clear_all(&self) -> Result<ClearedData, HistoryError> {
        let cleared = ClearedData {
            sessions: self.sessions.clear_sessions().await?,
            custom_patterns: self.patterns.clear_patterns().await?,
        };
        tracing::warn!(
            sessions = cleared.sessions,
            custom_patterns = cleared.custom_patterns,
            "cleared all practice data"
        );
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serene_core::model::PatternDraft;
    use serene_core::time::{fixed_clock, fixed_now};
    use std::time::Duration;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> HistoryService {
        HistoryService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    fn outcome(secs: u64, cycles: u32) -> RunOutcome {
        RunOutcome {
            pattern: PatternDraft::new(4.0, 4.0, 4.0, 4.0, cycles).validate().unwrap(),
            elapsed: Duration::from_millis(secs * 1000 + 400),
            cycles_completed: cycles,
        }
    }

    #[tokio::test]
    async fn record_stamps_with_clock_and_floors_seconds() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let (id, session) = svc.record("Box Breathing", &outcome(16, 1)).await.unwrap();
        assert_eq!(session.duration_secs(), 16);
        assert_eq!(session.completed_at(), fixed_now());

        let recent = svc.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
    }

    #[tokio::test]
    async fn count_tracks_recent_beyond_the_limit() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        for _ in 0..3 {
            svc.record("Box Breathing", &outcome(16, 1)).await.unwrap();
        }
        assert_eq!(svc.recent(2).await.unwrap().len(), 2);
        assert_eq!(svc.count().await.unwrap(), 3);
        svc.clear_all().await.unwrap();
        assert_eq!(svc.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn progress_reflects_history() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.record("Box Breathing", &outcome(1800, 1)).await.unwrap();
        svc.record("Box Breathing", &outcome(1800, 1)).await.unwrap();

        let stats = svc.progress().await.unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_time_secs, 3600);
        assert_eq!(stats.streak_days, 1);
        assert_eq!(stats.achievements.len(), 1);
    }

    #[tokio::test]
    async fn export_contains_sessions_and_patterns() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.record("Ujjayi Pranayama", &outcome(96, 6)).await.unwrap();
        let pattern = PatternDraft::new(5.5, 0.0, 5.5, 0.0, 10).validate().unwrap();
        repo.upsert_pattern(&CustomPattern::new("Coherent", pattern, fixed_now()).unwrap())
            .await
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&svc.export_json().await.unwrap()).unwrap();
        assert_eq!(json["total_sessions"], 1);
        assert_eq!(json["streak"], 1);
        assert_eq!(json["sessions"][0]["technique_name"], "Ujjayi Pranayama");
        assert_eq!(json["sessions"][0]["duration_secs"], 96);
        assert_eq!(json["custom_patterns"][0]["name"], "Coherent");
        assert_eq!(json["custom_patterns"][0]["inhale"], 5.5);
        assert!(json["export_date"].is_string());
        assert_eq!(svc.export_file_name(), "sereneflow-data-2023-11-14.json");
    }

    #[tokio::test]
    async fn clear_all_wipes_sessions_and_patterns() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.record("Box Breathing", &outcome(16, 1)).await.unwrap();
        let pattern = PatternDraft::new(4.0, 0.0, 4.0, 0.0, 3).validate().unwrap();
        repo.upsert_pattern(&CustomPattern::new("Mine", pattern, fixed_now()).unwrap())
            .await
            .unwrap();

        let cleared = svc.clear_all().await.unwrap();
        assert_eq!(
            cleared,
            ClearedData {
                sessions: 1,
                custom_patterns: 1
            }
        );
        assert_eq!(svc.progress().await.unwrap().total_sessions, 0);
    }
}
