mod app_settings;
mod custom_pattern;
mod ids;
mod pattern;
mod phase;
mod session;

pub use app_settings::{FeedbackSettings, FeedbackSettingsDraft, FeedbackSettingsError};
pub use custom_pattern::{CustomPattern, CustomPatternError, MAX_CUSTOM_NAME_LEN};
pub use ids::{ParseIdError, SessionId};
pub use pattern::{
    BreathingPattern, DEFAULT_CYCLES, MAX_CYCLES, MAX_PHASE_SECONDS, PatternDraft, PatternError,
};
pub use phase::{FeedbackCue, Phase, UnknownPhase};
pub use session::{CompletedSession, CompletedSessionRow};
