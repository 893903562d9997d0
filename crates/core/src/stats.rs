//! Progress statistics derived from the completed-session history.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::model::CompletedSession;

/// Number of sessions listed under "recent" on the progress view.
pub const RECENT_SESSIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Achievement {
    WeekWarrior,
    MonthMaster,
    DedicatedBreather,
    BreathingExpert,
    HourOfZen,
}

impl Achievement {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Achievement::WeekWarrior => "Week Warrior",
            Achievement::MonthMaster => "Month Master",
            Achievement::DedicatedBreather => "Dedicated Breather",
            Achievement::BreathingExpert => "Breathing Expert",
            Achievement::HourOfZen => "Hour of Zen",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Achievement::WeekWarrior => "7-day streak",
            Achievement::MonthMaster => "30-day streak",
            Achievement::DedicatedBreather => "10 sessions completed",
            Achievement::BreathingExpert => "50 sessions completed",
            Achievement::HourOfZen => "1 hour of practice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub total_sessions: u64,
    pub total_time_secs: u64,
    pub streak_days: u32,
    pub achievements: Vec<Achievement>,
    /// Most recent first, at most [`RECENT_SESSIONS`] entries.
    pub recent: Vec<CompletedSession>,
}

impl ProgressStats {
    /// Aggregate the history as seen on `today` (UTC).
    #[must_use]
    pub fn from_sessions(sessions: &[CompletedSession], today: NaiveDate) -> Self {
        let total_sessions = sessions.len() as u64;
        let total_time_secs = sessions.iter().map(CompletedSession::duration_secs).sum();
        let days: BTreeSet<NaiveDate> = sessions.iter().map(CompletedSession::completed_on).collect();
        let streak_days = current_streak(&days, today);

        let mut recent: Vec<CompletedSession> = sessions.to_vec();
        recent.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
        recent.truncate(RECENT_SESSIONS);

        Self {
            total_sessions,
            total_time_secs,
            streak_days,
            achievements: achievements(streak_days, total_sessions, total_time_secs),
            recent,
        }
    }
}

/// Consecutive practice days ending today, or yesterday if today has no session yet.
fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

fn achievements(streak_days: u32, total_sessions: u64, total_time_secs: u64) -> Vec<Achievement> {
    let mut earned = Vec::new();
    if streak_days >= 7 {
        earned.push(Achievement::WeekWarrior);
    }
    if streak_days >= 30 {
        earned.push(Achievement::MonthMaster);
    }
    if total_sessions >= 10 {
        earned.push(Achievement::DedicatedBreather);
    }
    if total_sessions >= 50 {
        earned.push(Achievement::BreathingExpert);
    }
    if total_time_secs >= 3600 {
        earned.push(Achievement::HourOfZen);
    }
    earned
}

//
// ─── FORMATTING ────────────────────────────────────────────────────────────────
//

/// `1h 2m 3s`, `2m 3s` or `3s`.
#[must_use]
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Session clock as `m:ss`.
#[must_use]
pub fn format_clock(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Human label for a completion date relative to `today`.
#[must_use]
pub fn relative_day(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_owned(),
        1 => "Yesterday".to_owned(),
        n @ 2..=6 => format!("{n} days ago"),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}
