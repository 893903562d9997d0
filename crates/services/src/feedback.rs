//! Best-effort haptic and tone cues fired on phase entry.
//!
//! Devices are optional capabilities. Failures are logged and swallowed so a missing
//! vibration motor or audio device never disturbs the session timer.

use std::sync::Arc;

use serene_core::feedback::ToneSpec;
use serene_core::model::{FeedbackSettings, Phase};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CapabilityError {
    #[error("{0} is not available on this device")]
    Unavailable(&'static str),
    #[error("{0}")]
    Failed(String),
}

/// Platform vibration output. `pulses` alternates on/off durations in milliseconds.
pub trait Vibrator: Send + Sync {
    /// # Errors
    ///
    /// Returns `CapabilityError` when the device cannot vibrate.
    fn vibrate(&self, pulses: &[u32]) -> Result<(), CapabilityError>;
}

/// Platform tone output. Playback is fire-and-forget.
pub trait TonePlayer: Send + Sync {
    /// # Errors
    ///
    /// Returns `CapabilityError` when audio output is unavailable or fails.
    fn play(&self, tone: &ToneSpec) -> Result<(), CapabilityError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoVibrator;

impl Vibrator for NoVibrator {
    fn vibrate(&self, _pulses: &[u32]) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unavailable("vibration"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTonePlayer;

impl TonePlayer for NoTonePlayer {
    fn play(&self, _tone: &ToneSpec) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unavailable("audio"))
    }
}

/// Maps phase entries to device cues according to the user's settings.
#[derive(Clone)]
pub struct FeedbackDispatcher {
    settings: FeedbackSettings,
    vibrator: Arc<dyn Vibrator>,
    tones: Arc<dyn TonePlayer>,
}

impl FeedbackDispatcher {
    #[must_use]
    pub fn new(
        settings: FeedbackSettings,
        vibrator: Arc<dyn Vibrator>,
        tones: Arc<dyn TonePlayer>,
    ) -> Self {
        Self {
            settings,
            vibrator,
            tones,
        }
    }

    /// Dispatcher that never touches a device.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(
            FeedbackSettings::default(),
            Arc::new(NoVibrator),
            Arc::new(NoTonePlayer),
        )
    }

    #[must_use]
    pub fn settings(&self) -> FeedbackSettings {
        self.settings
    }

    #[must_use]
    pub fn with_settings(mut self, settings: FeedbackSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_phase_enter(&self, phase: Phase) {
        if self.settings.haptics_active() {
            self.vibrate(self.settings.haptic_pattern().pulses(phase.cue()));
        }
        if self.settings.sound_active() {
            self.play(phase);
        }
    }

    /// Play the inhale tone of the selected sound, as the settings preview does.
    pub fn preview_sound(&self) {
        if self.settings.sound_active() {
            self.play(Phase::Inhale);
        }
    }

    /// Fire the selected haptic pattern once.
    pub fn test_haptic(&self) {
        if self.settings.haptics_active() {
            self.vibrate(self.settings.haptic_pattern().pulses(Phase::Inhale.cue()));
        }
    }

    fn vibrate(&self, pulses: &[u32]) {
        if pulses.is_empty() {
            return;
        }
        if let Err(err) = self.vibrator.vibrate(pulses) {
            tracing::debug!(error = %err, "haptic feedback skipped");
        }
    }

    fn play(&self, phase: Phase) {
        let Some(tone) = ToneSpec::for_phase(self.settings.sound_type(), phase) else {
            return;
        };
        if let Err(err) = self.tones.play(&tone) {
            tracing::debug!(error = %err, %phase, "tone feedback skipped");
        }
    }
}
