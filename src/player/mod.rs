mod audio;
mod clock;
mod decoder;
mod video;

use anyhow::{Context as _, Result};
use crossbeam_channel::{bounded, Sender};
use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::session::PlayerLoader;
use audio::{AudioSource, SampleRing};
use clock::AudioClock;
use decoder::{probe_media, start_decoder_thread, DecodedVideoFrame, DecoderCommand};
use video::VideoFrameQueue;

/// Frames buffered between the decoder thread and the UI
const FRAME_QUEUE_LEN: usize = 30;
/// How close to the duration the clock must get to count as finished
const END_OF_STREAM_MARGIN: f64 = 0.1;

/// Transport controls the session drives the active player through.
pub trait Transport {
    fn play(&mut self);
    fn pause(&mut self);
    /// Seek to an absolute position in seconds
    fn seek(&mut self, position: f64);
    /// Playback rate, zero when not playing
    fn rate(&self) -> f64;
    /// Current position in seconds
    fn position(&self) -> f64;
}

/// Display mode for video rendering
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DisplayMode {
    FitToWindow,
    NativeSize,
}

/// Player state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerState {
    Stopped,
    Playing,
    Paused,
}

/// FFmpeg-backed player for a single file
pub struct VideoPlayer {
    state: PlayerState,
    display_mode: DisplayMode,
    seeking: bool,
    seek_target: f64,

    width: u32,
    height: u32,
    duration: f64,

    decoder_handle: Option<JoinHandle<()>>,
    command_sender: Sender<DecoderCommand>,
    stop_flag: Arc<AtomicBool>,

    _output_stream: OutputStream, // Keep alive
    _stream_handle: OutputStreamHandle,
    sink: Sink,
    clock: AudioClock,

    frame_queue: VideoFrameQueue,
    texture: TextureHandle,
}

impl VideoPlayer {
    /// Open a video file. The first frame is decoded but playback stays
    /// stopped until [`Transport::play`].
    pub fn open(path: &Path, ctx: Context) -> Result<Self> {
        let info = probe_media(path)?;
        tracing::debug!(
            width = info.width,
            height = info.height,
            duration = info.duration,
            sample_rate = info.sample_rate,
            has_audio = info.has_audio,
            "Probed {}",
            path.display()
        );

        let clock = AudioClock::new(info.sample_rate, info.channels);

        let (output_stream, stream_handle) =
            OutputStream::try_default().context("No audio output device")?;
        let sink = Sink::try_new(&stream_handle)?;

        // Roughly one second of interleaved samples
        let ring = SampleRing::new(info.sample_rate as usize * info.channels as usize * 2);
        let source = if info.has_audio {
            AudioSource::new(ring.clone(), clock.clone())
        } else {
            AudioSource::silent(ring.clone(), clock.clone())
        };
        sink.append(source);
        sink.pause();

        let (video_sender, video_receiver) = bounded(FRAME_QUEUE_LEN);
        let frame_queue = VideoFrameQueue::new(video_receiver, FRAME_QUEUE_LEN);

        let (command_sender, command_receiver) = bounded(16);

        let stop_flag = Arc::new(AtomicBool::new(false));
        let decoder_handle = start_decoder_thread(
            path,
            video_sender,
            ring,
            command_receiver,
            clock.clone(),
            stop_flag.clone(),
        )?;

        let texture = ctx.load_texture(
            "video_frame",
            ColorImage::new(
                [info.width as usize, info.height as usize],
                egui::Color32::BLACK,
            ),
            TextureOptions::LINEAR,
        );

        let mut player = Self {
            state: PlayerState::Stopped,
            display_mode: DisplayMode::FitToWindow,
            seeking: false,
            seek_target: 0.0,
            width: info.width,
            height: info.height,
            duration: info.duration,
            decoder_handle: Some(decoder_handle),
            command_sender,
            stop_flag,
            _output_stream: output_stream,
            _stream_handle: stream_handle,
            sink,
            clock,
            frame_queue,
            texture,
        };

        // Let the decoder run long enough to produce the first frame
        player.send(DecoderCommand::Resume);
        player.seek_to(0.0);

        Ok(player)
    }

    fn send(&self, command: DecoderCommand) {
        if self.command_sender.send(command).is_err() {
            tracing::debug!("Decoder thread already gone");
        }
    }

    /// Clamp to the media and restart decoding from there
    fn seek_to(&mut self, position: f64) {
        let position = clamp_seek(position, self.duration);
        self.seeking = true;
        self.seek_target = position;
        self.sink.pause(); // Keep the clock still until the first frame lands
        self.frame_queue.clear();
        self.clock.set_position(position);
        self.send(DecoderCommand::Seek(position));
    }

    /// Set volume (0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn volume(&self) -> f32 {
        self.sink.volume()
    }

    pub fn toggle_display_mode(&mut self) {
        self.display_mode = match self.display_mode {
            DisplayMode::FitToWindow => DisplayMode::NativeSize,
            DisplayMode::NativeSize => DisplayMode::FitToWindow,
        };
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Pull decoded frames and refresh the texture. Call once per UI frame.
    pub fn update(&mut self, ctx: &Context) {
        if self.seeking {
            let target = self.seek_target;
            if let Some(frame) = self.frame_queue.first_frame_after_seek(target) {
                let pts = frame.pts;
                upload(&mut self.texture, frame);
                self.clock.set_position(pts);
                self.seeking = false;
                if self.state == PlayerState::Playing {
                    self.sink.play();
                }
            }
            ctx.request_repaint();
            return;
        }

        if self.state != PlayerState::Playing {
            return;
        }

        let audio_time = self.clock.position();
        if let Some(frame) = self.frame_queue.display_frame(audio_time) {
            upload(&mut self.texture, frame);
        }

        if self.frame_queue.is_drained() && reached_end(audio_time, self.duration) {
            tracing::debug!("End of stream at {audio_time:.2}s");
            self.state = PlayerState::Stopped;
            self.sink.pause();
        }

        ctx.request_repaint();
    }

    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    pub fn video_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }
}

/// Seek targets never go negative. The upper bound only applies when the
/// container reported a duration.
fn clamp_seek(position: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        position.clamp(0.0, duration)
    } else {
        position.max(0.0)
    }
}

/// Unknown durations never end on the clock alone
fn reached_end(position: f64, duration: f64) -> bool {
    duration > 0.0 && position >= duration - END_OF_STREAM_MARGIN
}

fn upload(texture: &mut TextureHandle, frame: &DecodedVideoFrame) {
    let image = ColorImage::from_rgba_unmultiplied(
        [frame.width as usize, frame.height as usize],
        &frame.rgba,
    );
    texture.set(image, TextureOptions::LINEAR);
}

impl Transport for VideoPlayer {
    /// Playing a finished file starts it over
    fn play(&mut self) {
        if self.state == PlayerState::Stopped && reached_end(self.position(), self.duration) {
            tracing::debug!("Rewinding finished video");
            self.seek_to(0.0);
        }
        if self.state != PlayerState::Playing {
            self.state = PlayerState::Playing;
            if !self.seeking {
                self.sink.play();
            }
            self.send(DecoderCommand::Resume);
        }
    }

    fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.state = PlayerState::Paused;
            self.sink.pause();
            self.send(DecoderCommand::Pause);
        }
    }

    fn seek(&mut self, position: f64) {
        self.seek_to(position);
    }

    fn rate(&self) -> f64 {
        if self.is_playing() {
            1.0
        } else {
            0.0
        }
    }

    /// Shows the seek target while a seek is in flight
    fn position(&self) -> f64 {
        if self.seeking {
            self.seek_target
        } else {
            self.clock.position()
        }
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        let _ = self.command_sender.send(DecoderCommand::Stop);

        if let Some(handle) = self.decoder_handle.take() {
            if handle.join().is_err() {
                tracing::error!("Decoder thread panicked");
            }
        }
    }
}

/// Opens files as [`VideoPlayer`]s rendering into the given egui context.
pub struct VideoLoader {
    ctx: Context,
}

impl VideoLoader {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

impl PlayerLoader for VideoLoader {
    type Player = VideoPlayer;

    fn load(&mut self, path: &Path) -> Result<VideoPlayer> {
        VideoPlayer::open(path, self.ctx.clone())
            .with_context(|| format!("Cannot open {}", path.display()))
    }
}
