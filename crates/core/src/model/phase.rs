use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown breathing phase: {0}")]
pub struct UnknownPhase(pub String);

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// One of the four steps of a breathing cycle.
///
/// Phases always run in the fixed order
/// `Inhale -> HoldAfterInhale -> Exhale -> HoldAfterExhale -> Inhale ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Inhale,
    #[serde(rename = "hold-inhale")]
    HoldAfterInhale,
    Exhale,
    #[serde(rename = "hold-exhale")]
    HoldAfterExhale,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Inhale,
        Phase::HoldAfterInhale,
        Phase::Exhale,
        Phase::HoldAfterExhale,
    ];

    /// The phase that follows this one in the cycle.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::HoldAfterInhale,
            Phase::HoldAfterInhale => Phase::Exhale,
            Phase::Exhale => Phase::HoldAfterExhale,
            Phase::HoldAfterExhale => Phase::Inhale,
        }
    }

    /// True when moving from this phase closes a full cycle.
    #[must_use]
    pub fn wraps(self) -> bool {
        matches!(self, Phase::HoldAfterExhale)
    }

    /// True for the phase a transition lands on when a cycle completes.
    #[must_use]
    pub fn is_wrap_target(self) -> bool {
        matches!(self, Phase::Inhale)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Inhale => "inhale",
            Phase::HoldAfterInhale => "hold-inhale",
            Phase::Exhale => "exhale",
            Phase::HoldAfterExhale => "hold-exhale",
        }
    }

    /// Short instruction shown to the user while the phase is active.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe In",
            Phase::HoldAfterInhale | Phase::HoldAfterExhale => "Hold",
            Phase::Exhale => "Breathe Out",
        }
    }

    #[must_use]
    pub fn cue(self) -> FeedbackCue {
        match self {
            Phase::Inhale => FeedbackCue::Inhale,
            Phase::HoldAfterInhale | Phase::HoldAfterExhale => FeedbackCue::Hold,
            Phase::Exhale => FeedbackCue::Exhale,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_owned()))
    }
}

/// Coarse grouping of phases used to pick phase-keyed haptic pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackCue {
    Inhale,
    Hold,
    Exhale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_cyclic() {
        let mut phase = Phase::Inhale;
        for expected in [
            Phase::HoldAfterInhale,
            Phase::Exhale,
            Phase::HoldAfterExhale,
            Phase::Inhale,
        ] {
            phase = phase.next();
            assert_eq!(phase, expected);
        }
    }

    #[test]
    fn only_hold_after_exhale_wraps() {
        let wrapping: Vec<_> = Phase::ALL.into_iter().filter(|p| p.wraps()).collect();
        assert_eq!(wrapping, vec![Phase::HoldAfterExhale]);
        assert!(Phase::HoldAfterExhale.next().is_wrap_target());
    }

    #[test]
    fn string_keys_round_trip_through_from_str() {
        for phase in Phase::ALL {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("breathe".parse::<Phase>().is_err());
    }

    #[test]
    fn serde_uses_string_keys() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
    }
}
