use serene_core::cycle::RunSnapshot;
use serene_core::model::Phase;
use serene_core::stats::format_clock;

/// Presentation-agnostic status line for a running session.
///
/// Carries the numbers a front end renders; it does not decide layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub label: &'static str,
    pub seconds_left: u64,
    /// One-based cycle number, capped at the total.
    pub cycle: u32,
    pub total_cycles: u32,
    pub clock: String,
    pub circle_scale: f32,
    pub is_paused: bool,
}

impl SessionView {
    #[must_use]
    pub fn from_snapshot(snapshot: &RunSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            label: snapshot.phase.label(),
            seconds_left: snapshot.phase_seconds_left(),
            cycle: (snapshot.cycle_index + 1).min(snapshot.total_cycles),
            total_cycles: snapshot.total_cycles,
            clock: format_clock(snapshot.elapsed),
            circle_scale: snapshot.circle_scale(),
            is_paused: snapshot.is_paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn renders_snapshot_numbers() {
        let snapshot = RunSnapshot {
            phase: Phase::Exhale,
            phase_remaining: Duration::from_millis(2_100),
            phase_duration: Duration::from_secs(8),
            cycle_index: 2,
            total_cycles: 5,
            elapsed: Duration::from_millis(61_500),
            is_paused: false,
        };
        let view = SessionView::from_snapshot(&snapshot);
        assert_eq!(view.label, "Breathe Out");
        assert_eq!(view.seconds_left, 3);
        assert_eq!(view.cycle, 3);
        assert_eq!(view.clock, "1:01");
        assert!(view.circle_scale < 1.3 && view.circle_scale > 0.8);
    }
}
