//! Haptic pulse patterns and synthesised tone profiles fired on phase entry.
//!
//! This module only describes *what* to play. Driving a vibration motor or an audio
//! device is left to the host through the services layer.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::time::Duration;

use crate::model::{FeedbackCue, Phase};

/// Peak gain of every tone, kept low so cues stay in the background.
pub const PEAK_GAIN: f32 = 0.1;
/// Sustain plateau between decay and release.
pub const SUSTAIN_HOLD_SECS: f32 = 0.1;
/// Cut-off of the warmth low-pass filter.
pub const LOWPASS_CUTOFF_HZ: f32 = 2000.0;
pub const LOWPASS_Q: f32 = 1.0;

//
// ─── HAPTICS ───────────────────────────────────────────────────────────────────
//

/// Vibration pattern selected in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HapticPattern {
    Gentle,
    Rhythmic,
    Progressive,
    Subtle,
    Strong,
    /// Rising pulses on inhale, a short tap on holds and falling pulses on exhale.
    Guided,
    Off,
}

impl HapticPattern {
    pub const ALL: [HapticPattern; 7] = [
        HapticPattern::Gentle,
        HapticPattern::Rhythmic,
        HapticPattern::Progressive,
        HapticPattern::Subtle,
        HapticPattern::Strong,
        HapticPattern::Guided,
        HapticPattern::Off,
    ];

    /// Alternating vibrate/pause durations in milliseconds, starting with a vibration.
    #[must_use]
    pub fn pulses(self, cue: FeedbackCue) -> &'static [u32] {
        match self {
            HapticPattern::Gentle => &[50],
            HapticPattern::Rhythmic => &[100, 50, 100],
            HapticPattern::Progressive => &[50, 30, 80, 30, 120],
            HapticPattern::Subtle => &[30],
            HapticPattern::Strong => &[150],
            HapticPattern::Guided => match cue {
                FeedbackCue::Inhale => &[50, 50, 100],
                FeedbackCue::Hold => &[30],
                FeedbackCue::Exhale => &[100, 30, 50],
            },
            HapticPattern::Off => &[],
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            HapticPattern::Gentle => "gentle",
            HapticPattern::Rhythmic => "rhythmic",
            HapticPattern::Progressive => "progressive",
            HapticPattern::Subtle => "subtle",
            HapticPattern::Strong => "strong",
            HapticPattern::Guided => "guided",
            HapticPattern::Off => "off",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pattern| pattern.key() == key)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HapticPattern::Gentle => "Gentle",
            HapticPattern::Rhythmic => "Rhythmic",
            HapticPattern::Progressive => "Progressive",
            HapticPattern::Subtle => "Subtle",
            HapticPattern::Strong => "Strong",
            HapticPattern::Guided => "Guided",
            HapticPattern::Off => "Off",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            HapticPattern::Gentle => "Soft, single pulses",
            HapticPattern::Rhythmic => "Pattern-based vibrations",
            HapticPattern::Progressive => "Gradually increasing intensity",
            HapticPattern::Subtle => "Very light vibrations",
            HapticPattern::Strong => "More pronounced feedback",
            HapticPattern::Guided => "Rising on inhale, falling on exhale",
            HapticPattern::Off => "No haptic feedback",
        }
    }
}

//
// ─── SOUND ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundType {
    GentleBells,
    NatureSounds,
    SingingBowls,
    SoftTones,
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    /// Oscillator value for a phase angle expressed in cycles.
    #[must_use]
    pub fn sample(self, cycles: f32) -> f32 {
        let angle = 2.0 * PI * cycles;
        match self {
            Waveform::Sine => angle.sin(),
            Waveform::Triangle => (2.0 / PI) * angle.sin().asin(),
        }
    }
}

/// Attack/decay/sustain/release shape, times in seconds and sustain as a fraction of peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Envelope {
    /// Total audible length including the sustain plateau.
    #[must_use]
    pub fn total_secs(&self) -> f32 {
        self.attack + self.decay + SUSTAIN_HOLD_SECS + self.release
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        Duration::from_secs_f32(self.total_secs())
    }

    /// Linear-ramp gain at `t` seconds after note-on.
    #[must_use]
    pub fn gain_at(&self, t: f32) -> f32 {
        let sustain_gain = PEAK_GAIN * self.sustain;
        let decay_end = self.attack + self.decay;
        let hold_end = decay_end + SUSTAIN_HOLD_SECS;
        let release_end = hold_end + self.release;

        if t < 0.0 || t >= release_end {
            0.0
        } else if t < self.attack {
            PEAK_GAIN * (t / self.attack)
        } else if t < decay_end {
            let progress = (t - self.attack) / self.decay;
            PEAK_GAIN + (sustain_gain - PEAK_GAIN) * progress
        } else if t < hold_end {
            sustain_gain
        } else {
            let progress = (t - hold_end) / self.release;
            sustain_gain * (1.0 - progress)
        }
    }
}

/// Timbre and per-phase pitch of a sound type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub inhale_hz: f32,
    pub hold_inhale_hz: f32,
    pub exhale_hz: f32,
    pub hold_exhale_hz: f32,
    pub waveform: Waveform,
    pub envelope: Envelope,
}

impl SoundProfile {
    #[must_use]
    pub fn frequency(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Inhale => self.inhale_hz,
            Phase::HoldAfterInhale => self.hold_inhale_hz,
            Phase::Exhale => self.exhale_hz,
            Phase::HoldAfterExhale => self.hold_exhale_hz,
        }
    }
}

const GENTLE_BELLS: SoundProfile = SoundProfile {
    name: "Gentle Bells",
    description: "Soft, peaceful chimes",
    inhale_hz: 523.0,
    hold_inhale_hz: 659.0,
    exhale_hz: 392.0,
    hold_exhale_hz: 349.0,
    waveform: Waveform::Sine,
    envelope: Envelope {
        attack: 0.1,
        decay: 0.3,
        sustain: 0.3,
        release: 0.8,
    },
};

const NATURE_SOUNDS: SoundProfile = SoundProfile {
    name: "Nature Sounds",
    description: "Water drops and wind chimes",
    inhale_hz: 440.0,
    hold_inhale_hz: 554.0,
    exhale_hz: 330.0,
    hold_exhale_hz: 294.0,
    waveform: Waveform::Triangle,
    envelope: Envelope {
        attack: 0.2,
        decay: 0.4,
        sustain: 0.2,
        release: 1.0,
    },
};

const SINGING_BOWLS: SoundProfile = SoundProfile {
    name: "Singing Bowls",
    description: "Meditation bowl tones",
    inhale_hz: 256.0,
    hold_inhale_hz: 341.0,
    exhale_hz: 192.0,
    hold_exhale_hz: 171.0,
    waveform: Waveform::Sine,
    envelope: Envelope {
        attack: 0.3,
        decay: 0.5,
        sustain: 0.4,
        release: 1.5,
    },
};

const SOFT_TONES: SoundProfile = SoundProfile {
    name: "Soft Tones",
    description: "Warm, rounded tones",
    inhale_hz: 432.0,
    hold_inhale_hz: 540.0,
    exhale_hz: 324.0,
    hold_exhale_hz: 288.0,
    waveform: Waveform::Sine,
    envelope: Envelope {
        attack: 0.15,
        decay: 0.2,
        sustain: 0.5,
        release: 0.6,
    },
};

const SILENT: SoundProfile = SoundProfile {
    name: "Silent",
    description: "No sound",
    inhale_hz: 0.0,
    hold_inhale_hz: 0.0,
    exhale_hz: 0.0,
    hold_exhale_hz: 0.0,
    waveform: Waveform::Sine,
    envelope: Envelope {
        attack: 0.0,
        decay: 0.0,
        sustain: 0.0,
        release: 0.0,
    },
};

impl SoundType {
    pub const ALL: [SoundType; 5] = [
        SoundType::GentleBells,
        SoundType::NatureSounds,
        SoundType::SingingBowls,
        SoundType::SoftTones,
        SoundType::Silent,
    ];

    #[must_use]
    pub fn profile(self) -> &'static SoundProfile {
        match self {
            SoundType::GentleBells => &GENTLE_BELLS,
            SoundType::NatureSounds => &NATURE_SOUNDS,
            SoundType::SingingBowls => &SINGING_BOWLS,
            SoundType::SoftTones => &SOFT_TONES,
            SoundType::Silent => &SILENT,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            SoundType::GentleBells => "gentle-bells",
            SoundType::NatureSounds => "nature-sounds",
            SoundType::SingingBowls => "singing-bowls",
            SoundType::SoftTones => "soft-tones",
            SoundType::Silent => "silent",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sound| sound.key() == key)
    }
}

//
// ─── TONE ──────────────────────────────────────────────────────────────────────
//

/// A single cue tone ready to be rendered or handed to an audio backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub envelope: Envelope,
}

impl ToneSpec {
    /// Tone for entering `phase` with the given sound, or `None` when nothing should play.
    #[must_use]
    pub fn for_phase(sound: SoundType, phase: Phase) -> Option<Self> {
        if sound == SoundType::Silent {
            return None;
        }
        let profile = sound.profile();
        let frequency_hz = profile.frequency(phase);
        if frequency_hz <= 0.0 {
            return None;
        }
        Some(Self {
            frequency_hz,
            waveform: profile.waveform,
            envelope: profile.envelope,
        })
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.envelope.total()
    }

    /// Synthesise mono samples at `sample_rate`, shaped by the envelope and low-passed.
    #[must_use]
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        if sample_rate == 0 {
            return Vec::new();
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = sample_rate as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let len = (self.envelope.total_secs() * rate).ceil() as usize;

        let mut filter = Biquad::lowpass(LOWPASS_CUTOFF_HZ, LOWPASS_Q, rate);
        let mut out = Vec::with_capacity(len);
        for n in 0..len {
            #[allow(clippy::cast_precision_loss)]
            let t = n as f32 / rate;
            let raw = self.waveform.sample(self.frequency_hz * t) * self.envelope.gain_at(t);
            out.push(filter.process(raw));
        }
        out
    }
}

/// Direct form I biquad with RBJ low-pass coefficients.
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    fn lowpass(cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        // Keep the cut-off below Nyquist for low sample rates.
        let cutoff = cutoff_hz.min(sample_rate * 0.45);
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 - cos_w0) / 2.0) / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: ((1.0 - cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}
