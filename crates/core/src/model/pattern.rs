use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::model::Phase;

/// Upper bound for a single phase, matching the widest settings slider with headroom.
pub const MAX_PHASE_SECONDS: f64 = 60.0;
/// Upper bound for the number of cycles in one session.
pub const MAX_CYCLES: u32 = 100;
/// Cycle count used when a technique does not prescribe its own rounds.
pub const DEFAULT_CYCLES: u32 = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PatternError {
    #[error("{phase} duration must be a finite, non-negative number of seconds, got {provided}")]
    InvalidDuration { phase: Phase, provided: f64 },

    #[error("{phase} duration must be greater than zero")]
    ZeroBreath { phase: Phase },

    #[error("{phase} duration must be at most 60s, got {provided}")]
    PhaseTooLong { phase: Phase, provided: f64 },

    #[error("total cycles must be between 1 and 100, got {provided}")]
    InvalidCycles { provided: u32 },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated pattern as entered through settings sliders or technique data, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternDraft {
    pub inhale: f64,
    pub hold_after_inhale: f64,
    pub exhale: f64,
    pub hold_after_exhale: f64,
    pub total_cycles: u32,
}

impl PatternDraft {
    #[must_use]
    pub fn new(
        inhale: f64,
        hold_after_inhale: f64,
        exhale: f64,
        hold_after_exhale: f64,
        total_cycles: u32,
    ) -> Self {
        Self {
            inhale,
            hold_after_inhale,
            exhale,
            hold_after_exhale,
            total_cycles,
        }
    }

    /// Validate the draft and convert seconds to whole milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `PatternError` if a duration is negative, non-finite or too long, if
    /// inhale/exhale are zero, or if the cycle count is out of range.
    pub fn validate(self) -> Result<BreathingPattern, PatternError> {
        if self.total_cycles == 0 || self.total_cycles > MAX_CYCLES {
            return Err(PatternError::InvalidCycles {
                provided: self.total_cycles,
            });
        }

        let inhale = seconds_to_duration(Phase::Inhale, self.inhale)?;
        let hold_after_inhale = seconds_to_duration(Phase::HoldAfterInhale, self.hold_after_inhale)?;
        let exhale = seconds_to_duration(Phase::Exhale, self.exhale)?;
        let hold_after_exhale = seconds_to_duration(Phase::HoldAfterExhale, self.hold_after_exhale)?;

        // Inhale and exhale must take time, otherwise a cycle could complete without time passing.
        if inhale.is_zero() {
            return Err(PatternError::ZeroBreath {
                phase: Phase::Inhale,
            });
        }
        if exhale.is_zero() {
            return Err(PatternError::ZeroBreath {
                phase: Phase::Exhale,
            });
        }

        Ok(BreathingPattern {
            inhale,
            hold_after_inhale,
            exhale,
            hold_after_exhale,
            total_cycles: self.total_cycles,
        })
    }
}

fn seconds_to_duration(phase: Phase, seconds: f64) -> Result<Duration, PatternError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(PatternError::InvalidDuration {
            phase,
            provided: seconds,
        });
    }
    if seconds > MAX_PHASE_SECONDS {
        return Err(PatternError::PhaseTooLong {
            phase,
            provided: seconds,
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = (seconds * 1000.0).round() as u64;
    Ok(Duration::from_millis(millis))
}

//
// ─── PATTERN ───────────────────────────────────────────────────────────────────
//

/// Validated breathing rhythm. Immutable for the lifetime of a session run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreathingPattern {
    inhale: Duration,
    hold_after_inhale: Duration,
    exhale: Duration,
    hold_after_exhale: Duration,
    total_cycles: u32,
}

impl BreathingPattern {
    /// Returns the configured duration of `phase`.
    #[must_use]
    pub fn duration_of(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::HoldAfterInhale => self.hold_after_inhale,
            Phase::Exhale => self.exhale,
            Phase::HoldAfterExhale => self.hold_after_exhale,
        }
    }

    #[must_use]
    pub fn total_cycles(&self) -> u32 {
        self.total_cycles
    }

    /// Length of one full inhale-hold-exhale-hold traversal.
    #[must_use]
    pub fn cycle_duration(&self) -> Duration {
        self.inhale + self.hold_after_inhale + self.exhale + self.hold_after_exhale
    }

    /// Expected session length ignoring tick drift.
    #[must_use]
    pub fn nominal_duration(&self) -> Duration {
        self.cycle_duration() * self.total_cycles
    }

    /// Returns a copy of the pattern with a different cycle count.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::InvalidCycles` if the count is out of range.
    pub fn with_total_cycles(self, total_cycles: u32) -> Result<Self, PatternError> {
        PatternDraft {
            total_cycles,
            ..self.to_draft()
        }
        .validate()
    }

    /// Converts back to the seconds-based representation used for persistence.
    #[must_use]
    pub fn to_draft(&self) -> PatternDraft {
        PatternDraft {
            inhale: self.inhale.as_secs_f64(),
            hold_after_inhale: self.hold_after_inhale.as_secs_f64(),
            exhale: self.exhale.as_secs_f64(),
            hold_after_exhale: self.hold_after_exhale.as_secs_f64(),
            total_cycles: self.total_cycles,
        }
    }

    /// Compact `inhale-hold-exhale-hold` notation, e.g. `4-7-8-0`.
    #[must_use]
    pub fn notation(&self) -> String {
        Phase::ALL
            .into_iter()
            .map(|phase| format_seconds(self.duration_of(phase)))
            .collect::<Vec<_>>()
            .join("-")
    }
}

fn format_seconds(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 == 0 {
        (millis / 1000).to_string()
    } else {
        let secs = duration.as_secs_f64();
        let text = format!("{secs:.3}");
        text.trim_end_matches('0').to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_seconds_to_millis() {
        let pattern = PatternDraft::new(5.5, 0.0, 0.3, 0.0, 3).validate().unwrap();
        assert_eq!(pattern.duration_of(Phase::Inhale), Duration::from_millis(5500));
        assert_eq!(pattern.duration_of(Phase::Exhale), Duration::from_millis(300));
        assert_eq!(pattern.cycle_duration(), Duration::from_millis(5800));
        assert_eq!(pattern.nominal_duration(), Duration::from_millis(17_400));
    }

    #[test]
    fn zero_hold_phases_are_allowed() {
        let pattern = PatternDraft::new(2.0, 0.0, 1.0, 0.0, 30).validate().unwrap();
        assert!(pattern.duration_of(Phase::HoldAfterInhale).is_zero());
        assert!(pattern.duration_of(Phase::HoldAfterExhale).is_zero());
    }

    #[test]
    fn rejects_zero_inhale_or_exhale() {
        assert_eq!(
            PatternDraft::new(0.0, 4.0, 4.0, 4.0, 1).validate(),
            Err(PatternError::ZeroBreath {
                phase: Phase::Inhale
            })
        );
        assert_eq!(
            PatternDraft::new(4.0, 4.0, 0.0, 4.0, 1).validate(),
            Err(PatternError::ZeroBreath {
                phase: Phase::Exhale
            })
        );
    }

    #[test]
    fn rejects_bad_numbers_and_cycle_counts() {
        assert!(matches!(
            PatternDraft::new(4.0, -1.0, 4.0, 4.0, 1).validate(),
            Err(PatternError::InvalidDuration { .. })
        ));
        assert!(matches!(
            PatternDraft::new(f64::NAN, 1.0, 4.0, 4.0, 1).validate(),
            Err(PatternError::InvalidDuration { .. })
        ));
        assert!(matches!(
            PatternDraft::new(61.0, 1.0, 4.0, 4.0, 1).validate(),
            Err(PatternError::PhaseTooLong { .. })
        ));
        assert_eq!(
            PatternDraft::new(4.0, 4.0, 4.0, 4.0, 0).validate(),
            Err(PatternError::InvalidCycles { provided: 0 })
        );
    }

    #[test]
    fn notation_trims_fractions() {
        let pattern = PatternDraft::new(4.0, 7.0, 8.0, 0.0, 1).validate().unwrap();
        assert_eq!(pattern.notation(), "4-7-8-0");
        let pattern = PatternDraft::new(5.5, 0.0, 0.3, 0.0, 1).validate().unwrap();
        assert_eq!(pattern.notation(), "5.5-0-0.3-0");
    }

    #[test]
    fn with_total_cycles_revalidates() {
        let pattern = PatternDraft::new(4.0, 4.0, 4.0, 4.0, 5).validate().unwrap();
        assert_eq!(pattern.with_total_cycles(12).unwrap().total_cycles(), 12);
        assert!(pattern.with_total_cycles(0).is_err());
    }
}
