use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feedback::{HapticPattern, SoundType};

/// User-selected feedback configuration for sessions.
///
/// Loaded once from storage and handed to the feedback dispatcher explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSettings {
    haptic_enabled: bool,
    haptic_pattern: HapticPattern,
    sound_enabled: bool,
    sound_type: SoundType,
}

/// Partial update of `FeedbackSettings` using the persisted string keys.
#[derive(Clone, Debug, Default)]
pub struct FeedbackSettingsDraft {
    pub haptic_enabled: Option<bool>,
    pub haptic_pattern: Option<String>,
    pub sound_enabled: Option<bool>,
    pub sound_type: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackSettingsError {
    #[error("unknown haptic pattern: {0}")]
    UnknownHapticPattern(String),
    #[error("unknown sound type: {0}")]
    UnknownSoundType(String),
}

impl FeedbackSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the draft on top of `base`, leaving unset fields untouched.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackSettingsError` if a pattern or sound key is not recognised.
    pub fn apply_to(
        self,
        base: FeedbackSettings,
    ) -> Result<FeedbackSettings, FeedbackSettingsError> {
        let haptic_pattern = match normalize_optional(self.haptic_pattern) {
            Some(key) => HapticPattern::from_key(&key)
                .ok_or(FeedbackSettingsError::UnknownHapticPattern(key))?,
            None => base.haptic_pattern,
        };
        let sound_type = match normalize_optional(self.sound_type) {
            Some(key) => {
                SoundType::from_key(&key).ok_or(FeedbackSettingsError::UnknownSoundType(key))?
            }
            None => base.sound_type,
        };

        Ok(FeedbackSettings {
            haptic_enabled: self.haptic_enabled.unwrap_or(base.haptic_enabled),
            haptic_pattern,
            sound_enabled: self.sound_enabled.unwrap_or(base.sound_enabled),
            sound_type,
        })
    }
}

impl FeedbackSettings {
    #[must_use]
    pub fn new(
        haptic_enabled: bool,
        haptic_pattern: HapticPattern,
        sound_enabled: bool,
        sound_type: SoundType,
    ) -> Self {
        Self {
            haptic_enabled,
            haptic_pattern,
            sound_enabled,
            sound_type,
        }
    }

    /// Rehydrate settings from the persisted string keys.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackSettingsError` if a stored key is not recognised.
    pub fn from_persisted(
        haptic_enabled: bool,
        haptic_pattern: &str,
        sound_enabled: bool,
        sound_type: &str,
    ) -> Result<Self, FeedbackSettingsError> {
        FeedbackSettingsDraft {
            haptic_enabled: Some(haptic_enabled),
            haptic_pattern: Some(haptic_pattern.to_owned()),
            sound_enabled: Some(sound_enabled),
            sound_type: Some(sound_type.to_owned()),
        }
        .apply_to(Self::default())
    }

    #[must_use]
    pub fn haptic_enabled(&self) -> bool {
        self.haptic_enabled
    }

    #[must_use]
    pub fn haptic_pattern(&self) -> HapticPattern {
        self.haptic_pattern
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    #[must_use]
    pub fn sound_type(&self) -> SoundType {
        self.sound_type
    }

    /// Haptics actually fire only when enabled and not set to `Off`.
    #[must_use]
    pub fn haptics_active(&self) -> bool {
        self.haptic_enabled && self.haptic_pattern != HapticPattern::Off
    }

    /// Tones actually play only when enabled and not set to `Silent`.
    #[must_use]
    pub fn sound_active(&self) -> bool {
        self.sound_enabled && self.sound_type != SoundType::Silent
    }
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            haptic_enabled: true,
            haptic_pattern: HapticPattern::Gentle,
            sound_enabled: false,
            sound_type: SoundType::GentleBells,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_ascii_lowercase())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_haptics_but_not_sound() {
        let settings = FeedbackSettings::default();
        assert!(settings.haptics_active());
        assert!(!settings.sound_active());
        assert_eq!(settings.haptic_pattern(), HapticPattern::Gentle);
        assert_eq!(settings.sound_type(), SoundType::GentleBells);
    }

    #[test]
    fn draft_only_touches_given_fields() {
        let updated = FeedbackSettingsDraft {
            sound_enabled: Some(true),
            sound_type: Some(" Singing-Bowls ".into()),
            ..FeedbackSettingsDraft::new()
        }
        .apply_to(FeedbackSettings::default())
        .unwrap();

        assert!(updated.sound_active());
        assert_eq!(updated.sound_type(), SoundType::SingingBowls);
        assert!(updated.haptic_enabled());
        assert_eq!(updated.haptic_pattern(), HapticPattern::Gentle);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FeedbackSettingsDraft {
            haptic_pattern: Some("buzz".into()),
            ..FeedbackSettingsDraft::new()
        }
        .apply_to(FeedbackSettings::default())
        .unwrap_err();
        assert_eq!(err, FeedbackSettingsError::UnknownHapticPattern("buzz".into()));
    }

    #[test]
    fn off_and_silent_deactivate_feedback() {
        let settings = FeedbackSettings::new(true, HapticPattern::Off, true, SoundType::Silent);
        assert!(!settings.haptics_active());
        assert!(!settings.sound_active());
    }
}
