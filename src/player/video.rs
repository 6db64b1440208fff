use crossbeam_channel::Receiver;
use std::collections::VecDeque;

use super::decoder::DecodedVideoFrame;

/// Frames older than this (seconds behind the clock) are dropped
const DROP_THRESHOLD: f64 = 0.02;
/// Frames newer than this (seconds ahead of the clock) are held back
const HOLD_THRESHOLD: f64 = 0.02;
/// Frames this far before a seek target are still accepted after a seek
const SEEK_TOLERANCE: f64 = 0.5;

/// Buffers decoded frames and picks the one matching the audio clock.
pub struct VideoFrameQueue {
    receiver: Receiver<DecodedVideoFrame>,
    buffer: VecDeque<DecodedVideoFrame>,
    current_frame: Option<DecodedVideoFrame>,
    max_buffer_size: usize,
}

impl VideoFrameQueue {
    pub fn new(receiver: Receiver<DecodedVideoFrame>, max_buffer_size: usize) -> Self {
        Self {
            receiver,
            buffer: VecDeque::with_capacity(max_buffer_size),
            current_frame: None,
            max_buffer_size,
        }
    }

    fn receive_frames(&mut self) {
        while self.buffer.len() < self.max_buffer_size {
            match self.receiver.try_recv() {
                Ok(frame) => self.buffer.push_back(frame),
                Err(_) => break,
            }
        }
    }

    fn drop_before(&mut self, pts: f64) {
        while self.buffer.front().is_some_and(|frame| frame.pts < pts) {
            self.buffer.pop_front();
        }
    }

    /// Frame to show at `audio_time`. Late frames are skipped and early
    /// ones held, so the previous frame may be returned again.
    pub fn display_frame(&mut self, audio_time: f64) -> Option<&DecodedVideoFrame> {
        self.receive_frames();
        self.drop_before(audio_time - DROP_THRESHOLD);

        if self
            .buffer
            .front()
            .is_some_and(|frame| frame.pts <= audio_time + HOLD_THRESHOLD)
        {
            self.current_frame = self.buffer.pop_front();
        }

        self.current_frame.as_ref()
    }

    /// First frame at or near `seek_target`, ignoring the clock.
    pub fn first_frame_after_seek(&mut self, seek_target: f64) -> Option<&DecodedVideoFrame> {
        self.receive_frames();
        self.drop_before(seek_target - SEEK_TOLERANCE);

        if let Some(frame) = self.buffer.pop_front() {
            self.current_frame = Some(frame);
        }

        self.current_frame.as_ref()
    }

    /// Drop everything buffered, including frames still in the channel
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.current_frame = None;
        while self.receiver.try_recv().is_ok() {}
    }

    /// No frames wait behind the one on screen
    pub fn is_drained(&self) -> bool {
        self.buffer.is_empty() && self.receiver.is_empty()
    }
}
