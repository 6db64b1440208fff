use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Master clock driven by the number of audio samples actually played.
///
/// Shared between the UI thread, the decoder thread and the rodio source.
#[derive(Clone)]
pub struct AudioClock {
    position_us: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    /// Set on seek so the audio source drops stale samples
    flush_pending: Arc<AtomicBool>,
    sample_rate: u32,
    channels: u16,
}

impl AudioClock {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            position_us: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(true)),
            flush_pending: Arc::new(AtomicBool::new(false)),
            sample_rate,
            channels,
        }
    }

    /// Position in seconds
    pub fn position(&self) -> f64 {
        self.position_us.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }

    /// Jump to `seconds` and request a flush of buffered audio.
    /// Negative positions are stored as zero.
    pub fn set_position(&self, seconds: f64) {
        let us = (seconds.max(0.0) * 1_000_000.0) as u64;
        self.position_us.store(us, Ordering::Relaxed);
        self.flush_pending.store(true, Ordering::Relaxed);
    }

    /// Consume the flush request, if one is pending
    pub fn take_flush(&self) -> bool {
        self.flush_pending.swap(false, Ordering::Relaxed)
    }

    /// Advance by a count of interleaved samples. Ignored while paused.
    pub fn advance_samples(&self, samples: u64) {
        if self.paused.load(Ordering::Relaxed) {
            return;
        }
        let us_per_sample = 1_000_000.0 / (self.sample_rate as f64 * self.channels as f64);
        let delta_us = (samples as f64 * us_per_sample) as u64;
        self.position_us.fetch_add(delta_us, Ordering::Relaxed);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
