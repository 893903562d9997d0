//! Terminal and speaker outputs for the feedback dispatcher.
//!
//! A terminal cannot vibrate, so haptic cues ring the bell. Tones go to the default
//! audio device when one exists and fall back to the bell otherwise.

use std::io::Write;
use std::sync::Arc;

use serene_core::feedback::ToneSpec;
use services::{CapabilityError, TonePlayer, Vibrator};

const BEL: &[u8] = b"\x07";

fn ring() -> Result<(), CapabilityError> {
    let mut err = std::io::stderr().lock();
    err.write_all(BEL)
        .and_then(|()| err.flush())
        .map_err(|e| CapabilityError::Failed(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalVibrator;

impl Vibrator for TerminalVibrator {
    fn vibrate(&self, pulses: &[u32]) -> Result<(), CapabilityError> {
        tracing::debug!(?pulses, "haptic cue");
        ring()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl TonePlayer for TerminalBell {
    fn play(&self, tone: &ToneSpec) -> Result<(), CapabilityError> {
        tracing::debug!(
            frequency_hz = tone.frequency_hz,
            waveform = ?tone.waveform,
            duration = ?tone.duration(),
            "tone cue"
        );
        ring()
    }
}

/// Speaker output when an audio device is available, the terminal bell otherwise.
pub fn tone_player() -> Arc<dyn TonePlayer> {
    speaker_player().unwrap_or_else(|| Arc::new(TerminalBell))
}

#[cfg(feature = "speaker")]
fn speaker_player() -> Option<Arc<dyn TonePlayer>> {
    match speaker::SpeakerTonePlayer::open() {
        Ok(player) => Some(Arc::new(player)),
        Err(err) => {
            tracing::debug!(error = %err, "using the terminal bell for tones");
            None
        }
    }
}

#[cfg(not(feature = "speaker"))]
fn speaker_player() -> Option<Arc<dyn TonePlayer>> {
    None
}

/// Write `samples` from `cursor` into interleaved `out`, copying each sample to every
/// channel and padding with silence once the tone is exhausted.
#[cfg_attr(not(feature = "speaker"), allow(dead_code))]
fn write_frames<T>(out: &mut [T], channels: usize, samples: &[f32], cursor: &mut usize)
where
    T: Copy + From<SampleValue>,
{
    for frame in out.chunks_mut(channels.max(1)) {
        let value = samples.get(*cursor).copied().unwrap_or(0.0);
        *cursor = (*cursor + 1).min(samples.len());
        frame.fill(T::from(SampleValue(value.clamp(-1.0, 1.0))));
    }
}

/// One mono sample, converted to the device's sample format.
#[derive(Debug, Clone, Copy)]
struct SampleValue(f32);

impl From<SampleValue> for f32 {
    fn from(value: SampleValue) -> Self {
        value.0
    }
}

impl From<SampleValue> for i16 {
    fn from(value: SampleValue) -> Self {
        (value.0 * f32::from(i16::MAX)) as i16
    }
}

impl From<SampleValue> for u16 {
    fn from(value: SampleValue) -> Self {
        ((value.0 + 1.0) * 0.5 * f32::from(u16::MAX)) as u16
    }
}

#[cfg(feature = "speaker")]
mod speaker {
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::time::{Duration, Instant};

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{Device, SampleFormat, SizedSample, Stream, StreamConfig};
    use serene_core::feedback::ToneSpec;
    use services::{CapabilityError, TonePlayer};

    use super::{SampleValue, write_frames};

    /// Streams stay alive this long past the tone so the release tail is not cut.
    const TAIL: Duration = Duration::from_millis(150);
    const REAP_EVERY: Duration = Duration::from_millis(250);

    /// Plays tones on a dedicated audio thread that owns the cpal device and streams.
    pub struct SpeakerTonePlayer {
        tones: mpsc::Sender<ToneSpec>,
    }

    impl SpeakerTonePlayer {
        /// Open the default output device.
        ///
        /// # Errors
        ///
        /// Returns `CapabilityError::Unavailable` when there is no output device, or
        /// `CapabilityError::Failed` when its configuration cannot be read.
        pub fn open() -> Result<Self, CapabilityError> {
            let (tones, queue) = mpsc::channel();
            let (ready_tx, ready_rx) = mpsc::sync_channel(1);
            std::thread::Builder::new()
                .name("sereneflow-audio".into())
                .spawn(move || match Output::open() {
                    Ok(output) => {
                        let _ = ready_tx.send(Ok(()));
                        output.serve(&queue);
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                    }
                })
                .map_err(|e| CapabilityError::Failed(e.to_string()))?;

            ready_rx
                .recv()
                .map_err(|_| CapabilityError::Unavailable("audio output"))??;
            Ok(Self { tones })
        }
    }

    impl TonePlayer for SpeakerTonePlayer {
        fn play(&self, tone: &ToneSpec) -> Result<(), CapabilityError> {
            self.tones
                .send(*tone)
                .map_err(|_| CapabilityError::Unavailable("audio output"))
        }
    }

    struct Output {
        device: Device,
        config: StreamConfig,
        sample_format: SampleFormat,
    }

    impl Output {
        fn open() -> Result<Self, CapabilityError> {
            let device = cpal::default_host()
                .default_output_device()
                .ok_or(CapabilityError::Unavailable("audio output"))?;
            let supported = device
                .default_output_config()
                .map_err(|e| CapabilityError::Failed(format!("audio config: {e}")))?;
            tracing::debug!(
                device = %device.name().unwrap_or_default(),
                sample_rate = supported.sample_rate().0,
                channels = supported.channels(),
                "audio output ready"
            );
            Ok(Self {
                sample_format: supported.sample_format(),
                config: supported.config(),
                device,
            })
        }

        /// Play queued tones until the player is dropped.
        fn serve(&self, queue: &mpsc::Receiver<ToneSpec>) {
            let mut playing: Vec<(Stream, Instant)> = Vec::new();
            loop {
                match queue.recv_timeout(REAP_EVERY) {
                    Ok(tone) => match self.start(&tone) {
                        Ok(stream) => playing.push((stream, Instant::now() + tone.duration() + TAIL)),
                        Err(err) => tracing::debug!(error = %err, "tone skipped"),
                    },
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                let now = Instant::now();
                playing.retain(|(_, until)| *until > now);
            }
        }

        fn start(&self, tone: &ToneSpec) -> Result<Stream, CapabilityError> {
            let samples = tone.render(self.config.sample_rate.0);
            let stream = match self.sample_format {
                SampleFormat::F32 => self.build::<f32>(samples)?,
                SampleFormat::I16 => self.build::<i16>(samples)?,
                SampleFormat::U16 => self.build::<u16>(samples)?,
                other => {
                    return Err(CapabilityError::Failed(format!(
                        "unsupported sample format {other:?}"
                    )));
                }
            };
            stream
                .play()
                .map_err(|e| CapabilityError::Failed(format!("start stream: {e}")))?;
            Ok(stream)
        }

        fn build<T>(&self, samples: Vec<f32>) -> Result<Stream, CapabilityError>
        where
            T: SizedSample + From<SampleValue>,
        {
            let channels = usize::from(self.config.channels);
            let mut cursor = 0;
            self.device
                .build_output_stream(
                    &self.config,
                    move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                        write_frames(data, channels, &samples, &mut cursor);
                    },
                    |err| tracing::warn!(error = %err, "audio stream error"),
                    None,
                )
                .map_err(|e| CapabilityError::Failed(format!("build stream: {e}")))
        }
    }
}
