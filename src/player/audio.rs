use parking_lot::Mutex;
use rodio::Source;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::clock::AudioClock;

/// Samples consumed between clock updates
const CLOCK_BATCH: u64 = 256;

/// Interleaved f32 samples handed from the decoder to the audio device.
///
/// Writers never block: once full, the oldest samples are overwritten.
pub struct SampleRing {
    inner: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        })
    }

    pub fn push_slice(&self, samples: &[f32]) {
        let mut buf = self.inner.lock();
        for &sample in samples {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(sample);
        }
    }

    pub fn try_pop(&self) -> Option<f32> {
        self.inner.lock().pop_front()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

/// Endless rodio source reading from a [`SampleRing`] and ticking the clock.
///
/// Underruns play silence. With a decoded audio track the clock only counts
/// real samples, so it waits for the decoder to catch up. For files without
/// audio the silence itself paces the clock.
pub struct AudioSource {
    ring: Arc<SampleRing>,
    clock: AudioClock,
    samples_consumed: u64,
    silence_ticks_clock: bool,
}

impl AudioSource {
    pub fn new(ring: Arc<SampleRing>, clock: AudioClock) -> Self {
        Self {
            ring,
            clock,
            samples_consumed: 0,
            silence_ticks_clock: false,
        }
    }

    /// Source for a file with no audio stream
    pub fn silent(ring: Arc<SampleRing>, clock: AudioClock) -> Self {
        Self {
            silence_ticks_clock: true,
            ..Self::new(ring, clock)
        }
    }

    fn count_sample(&mut self) {
        self.samples_consumed += 1;
        if self.samples_consumed % CLOCK_BATCH == 0 {
            self.clock.advance_samples(CLOCK_BATCH);
        }
    }
}

impl Iterator for AudioSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.clock.take_flush() {
            self.ring.clear();
            self.samples_consumed = 0;
            return Some(0.0);
        }

        match self.ring.try_pop() {
            Some(sample) => {
                self.count_sample();
                Some(sample)
            }
            None => {
                if self.silence_ticks_clock {
                    self.count_sample();
                }
                Some(0.0)
            }
        }
    }
}

impl Source for AudioSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.clock.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_overwrites_oldest_when_full() {
        let ring = SampleRing::new(3);
        ring.push_slice(&[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(ring.try_pop(), Some(2.0));
        assert_eq!(ring.try_pop(), Some(3.0));
        assert_eq!(ring.try_pop(), Some(4.0));
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn source_plays_silence_on_underrun() {
        let clock = AudioClock::new(48_000, 2);
        let mut source = AudioSource::new(SampleRing::new(8), clock);
        assert_eq!(source.next(), Some(0.0));
    }

    #[test]
    fn underrun_holds_clock_when_file_has_audio() {
        let clock = AudioClock::new(1_000, 1);
        clock.resume();
        let mut source = AudioSource::new(SampleRing::new(8), clock.clone());

        for _ in 0..CLOCK_BATCH * 4 {
            assert_eq!(source.next(), Some(0.0));
        }
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn silent_source_keeps_clock_running() {
        // One second of stereo silence at 44.1 kHz
        let clock = AudioClock::new(44_100, 2);
        clock.resume();
        let mut source = AudioSource::silent(SampleRing::new(8), clock.clone());

        for _ in 0..88_200 {
            assert_eq!(source.next(), Some(0.0));
        }
        assert!((clock.position() - 1.0).abs() < 0.01);
    }

    #[test]
    fn silent_source_respects_pause() {
        let clock = AudioClock::new(44_100, 2);
        let mut source = AudioSource::silent(SampleRing::new(8), clock.clone());

        for _ in 0..CLOCK_BATCH * 4 {
            source.next();
        }
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn source_flushes_stale_samples_after_seek() {
        let clock = AudioClock::new(48_000, 2);
        let ring = SampleRing::new(8);
        ring.push_slice(&[0.5, 0.5]);
        let mut source = AudioSource::new(ring.clone(), clock.clone());

        clock.set_position(5.0);
        assert_eq!(source.next(), Some(0.0));
        assert_eq!(ring.try_pop(), None);
    }

    #[test]
    fn source_advances_clock_per_batch() {
        let clock = AudioClock::new(1_000, 1);
        clock.resume();
        let ring = SampleRing::new(1024);
        ring.push_slice(&[0.25; CLOCK_BATCH as usize]);
        let mut source = AudioSource::new(ring, clock.clone());

        for _ in 0..CLOCK_BATCH {
            assert_eq!(source.next(), Some(0.25));
        }
        assert!((clock.position() - 0.256).abs() < 1e-6);
    }
}
