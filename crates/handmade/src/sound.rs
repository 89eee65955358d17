//! # Tone Output
//!
//! A continuous sine tone written into interleaved `f32` buffers. The phase
//! carries over between buffers so frequency changes never click.

use std::f32::consts::TAU;

use crate::config::AudioConfig;

/// Output format and queue depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channels.
    pub channels: u16,
    /// How far ahead the queue is kept filled.
    pub target_latency_ms: u32,
    /// Amplitude, `0..=1`.
    pub volume: f32,
}

impl AudioSettings {
    /// Settings from the `[audio]` section.
    #[must_use]
    pub fn from_config(config: &AudioConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            channels: config.channels,
            target_latency_ms: config.target_latency_ms,
            volume: config.volume,
        }
    }

    /// Frames (one sample per channel) the queue should hold.
    #[must_use]
    pub fn target_queue_frames(&self) -> usize {
        let frames = u64::from(self.sample_rate) * u64::from(self.target_latency_ms) / 1000;
        usize::try_from(frames).unwrap_or(usize::MAX)
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::from_config(&AudioConfig::default())
    }
}

/// Frames to generate so the queue reaches its target depth.
#[must_use]
pub fn frames_to_queue(settings: &AudioSettings, queued_frames: usize) -> usize {
    settings.target_queue_frames().saturating_sub(queued_frames)
}

/// Sine oscillator with persistent phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToneGenerator {
    /// Position in the current cycle, `[0, 1)`.
    phase: f32,
}

impl ToneGenerator {
    /// An oscillator at phase zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current phase, `[0, 1)`.
    #[must_use]
    pub const fn phase(&self) -> f32 {
        self.phase
    }

    /// Fills `out` with whole interleaved frames of a `tone_hz` sine.
    ///
    /// Every channel of a frame carries the same sample. A trailing partial
    /// frame is left silent. Returns the number of frames written.
    pub fn fill(&mut self, settings: &AudioSettings, tone_hz: f32, out: &mut [f32]) -> usize {
        let channels = usize::from(settings.channels);
        if settings.sample_rate == 0 || channels == 0 {
            out.fill(0.0);
            return 0;
        }

        #[allow(clippy::cast_precision_loss)]
        let step = (tone_hz.max(0.0) / settings.sample_rate as f32).fract();
        let mut frames = 0;

        let mut chunks = out.chunks_exact_mut(channels);
        for frame in &mut chunks {
            let sample = (self.phase * TAU).sin() * settings.volume;
            frame.fill(sample);
            self.phase = (self.phase + step).fract();
            frames += 1;
        }
        chunks.into_remainder().fill(0.0);

        frames
    }
}
