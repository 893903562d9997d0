#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod feedback;
pub mod history_service;
pub mod library_service;
pub mod sessions;
pub mod settings_service;

pub use serene_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, HistoryError, LibraryError, SessionError, SettingsServiceError};
pub use feedback::{
    CapabilityError, FeedbackDispatcher, NoTonePlayer, NoVibrator, TonePlayer, Vibrator,
};
pub use history_service::{ClearedData, ExportData, ExportedPattern, HistoryService};
pub use library_service::LibraryService;
pub use settings_service::SettingsService;

pub use sessions::{
    BreathingSessionService, PlanOverrides, PlanSource, SessionControls, SessionEnd,
    SessionHandle, SessionPlan, SessionUpdate, SessionView,
};
