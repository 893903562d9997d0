mod plan;
mod service;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{PlanOverrides, PlanSource, SessionPlan};
pub use service::{
    BreathingSessionService, SessionControls, SessionEnd, SessionHandle, SessionUpdate,
};
pub use view::SessionView;
