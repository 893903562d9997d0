use serene_core::catalog::{Technique, TimingOverrides};
use serene_core::model::{BreathingPattern, CustomPattern};

/// Where a session plan came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Technique(&'static str),
    Custom(String),
}

/// Everything the session timer needs to run one practice.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub technique_name: String,
    pub source: PlanSource,
    pub pattern: BreathingPattern,
    pub warnings: &'static [&'static str],
}

impl SessionPlan {
    #[must_use]
    pub fn from_technique(technique: &'static Technique, pattern: BreathingPattern) -> Self {
        Self {
            technique_name: technique.name.to_owned(),
            source: PlanSource::Technique(technique.id),
            pattern,
            warnings: technique.warnings,
        }
    }

    #[must_use]
    pub fn from_custom(custom: &CustomPattern, pattern: BreathingPattern) -> Self {
        Self {
            technique_name: custom.name().to_owned(),
            source: PlanSource::Custom(custom.name().to_owned()),
            pattern,
            warnings: &[],
        }
    }

    /// Plan for an ad-hoc pattern that is not in the library.
    #[must_use]
    pub fn ad_hoc(technique_name: impl Into<String>, pattern: BreathingPattern) -> Self {
        let technique_name = technique_name.into();
        Self {
            source: PlanSource::Custom(technique_name.clone()),
            technique_name,
            pattern,
            warnings: &[],
        }
    }
}

/// User adjustments applied when resolving a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanOverrides {
    pub cycles: Option<u32>,
    pub timings: TimingOverrides,
}
