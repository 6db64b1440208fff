use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::{Audio as AudioFrame, Video as VideoFrame};
use ffmpeg_next::media::Type;
use ffmpeg_next::software::resampling::Context as ResamplerContext;
use ffmpeg_next::software::scaling::{Context as ScalerContext, Flags};
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;
use ffmpeg_next::{codec, Packet, Rational};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::audio::SampleRing;
use super::clock::AudioClock;

/// Sleep while paused or parked at end of file
const IDLE_POLL: Duration = Duration::from_millis(10);
/// Retry interval while the frame channel is full
const BACKPRESSURE_POLL: Duration = Duration::from_millis(1);
/// Audio is always resampled to interleaved stereo
const OUTPUT_CHANNELS: u16 = 2;

/// A decoded RGBA frame ready for upload
pub struct DecodedVideoFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pts: f64, // seconds
}

/// Commands sent to the decoder thread
pub enum DecoderCommand {
    Seek(f64),
    Pause,
    Resume,
    Stop,
}

/// Stream parameters read before decoding starts
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u16,
    /// False when the file has no audio stream to drive the clock
    pub has_audio: bool,
}

/// Read stream parameters without decoding any frames.
/// Files without audio get a 44.1 kHz clock paced by the silence the audio
/// source plays in their place.
pub fn probe_media(path: &Path) -> Result<MediaInfo> {
    let input = ffmpeg_next::format::input(path).context("Failed to open input file")?;

    let video_stream = input
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow!("No video stream found"))?;

    let video_decoder = codec::Context::from_parameters(video_stream.parameters())?
        .decoder()
        .video()?;

    let audio_rate = match input.streams().best(Type::Audio) {
        Some(audio) => Some(
            codec::Context::from_parameters(audio.parameters())?
                .decoder()
                .audio()?
                .rate(),
        ),
        None => None,
    };

    let duration = if input.duration() > 0 {
        input.duration() as f64 / ffmpeg_next::ffi::AV_TIME_BASE as f64
    } else {
        0.0
    };

    Ok(MediaInfo {
        width: video_decoder.width(),
        height: video_decoder.height(),
        duration,
        sample_rate: audio_rate.unwrap_or(44100),
        channels: OUTPUT_CHANNELS,
        has_audio: audio_rate.is_some(),
    })
}

/// Spawn the decode thread for `path`
pub fn start_decoder_thread(
    path: &Path,
    video_sender: Sender<DecodedVideoFrame>,
    ring: Arc<SampleRing>,
    command_receiver: Receiver<DecoderCommand>,
    clock: AudioClock,
    stop_flag: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let path = path.to_path_buf();

    let handle = thread::Builder::new()
        .name("decoder".into())
        .spawn(move || {
            let mut decoder = Decoder {
                video_sender,
                ring,
                command_receiver,
                clock,
                paused: true,
                pending_seek: None,
            };
            match decoder.run(&path, &stop_flag) {
                Ok(()) => tracing::debug!("Decoder for {} finished", path.display()),
                Err(e) => tracing::error!("Decoder error for {}: {e:#}", path.display()),
            }
        })
        .context("Failed to spawn decoder thread")?;

    Ok(handle)
}

/// Whether the decode loop should keep going after handling commands
enum Flow {
    Continue,
    Exit,
}

enum Delivery {
    Sent,
    /// Dropped because a seek arrived while waiting
    Abandoned,
    Exit,
}

struct Decoder {
    video_sender: Sender<DecodedVideoFrame>,
    ring: Arc<SampleRing>,
    command_receiver: Receiver<DecoderCommand>,
    clock: AudioClock,
    paused: bool,
    pending_seek: Option<f64>,
}

impl Decoder {
    /// Apply every queued command
    fn drain_commands(&mut self) -> Flow {
        loop {
            match self.command_receiver.try_recv() {
                Ok(command) => {
                    if let Flow::Exit = self.apply(command) {
                        return Flow::Exit;
                    }
                }
                Err(TryRecvError::Empty) => return Flow::Continue,
                Err(TryRecvError::Disconnected) => return Flow::Exit,
            }
        }
    }

    fn apply(&mut self, command: DecoderCommand) -> Flow {
        match command {
            DecoderCommand::Stop => return Flow::Exit,
            DecoderCommand::Pause => {
                self.paused = true;
                self.clock.pause();
            }
            DecoderCommand::Resume => {
                self.paused = false;
                self.clock.resume();
            }
            DecoderCommand::Seek(target) => self.pending_seek = Some(target),
        }
        Flow::Continue
    }

    /// Hand a frame to the UI, polling for commands while the channel is full
    fn deliver(&mut self, mut frame: DecodedVideoFrame) -> Delivery {
        loop {
            if let Flow::Exit = self.drain_commands() {
                return Delivery::Exit;
            }
            if self.pending_seek.is_some() {
                return Delivery::Abandoned;
            }

            match self.video_sender.try_send(frame) {
                Ok(()) => return Delivery::Sent,
                Err(TrySendError::Full(f)) => {
                    frame = f;
                    thread::sleep(BACKPRESSURE_POLL);
                }
                Err(TrySendError::Disconnected(_)) => return Delivery::Exit,
            }
        }
    }

    fn run(&mut self, path: &Path, stop_flag: &AtomicBool) -> Result<()> {
        let mut input = ffmpeg_next::format::input(path)?;

        let video_stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow!("No video stream"))?;
        let video_stream_index = video_stream.index();
        let video_time_base = video_stream.time_base();
        let video_params = video_stream.parameters();

        let audio_stream = input.streams().best(Type::Audio);
        let audio_stream_index = audio_stream.as_ref().map(|s| s.index());
        let audio_params = audio_stream.map(|s| s.parameters());

        let mut video_decoder = codec::Context::from_parameters(video_params)?
            .decoder()
            .video()?;

        let mut audio_decoder = match audio_params {
            Some(params) => Some(codec::Context::from_parameters(params)?.decoder().audio()?),
            None => None,
        };

        let mut scaler = ScalerContext::get(
            video_decoder.format(),
            video_decoder.width(),
            video_decoder.height(),
            Pixel::RGBA,
            video_decoder.width(),
            video_decoder.height(),
            Flags::BILINEAR,
        )?;

        // Everything is resampled to packed f32 stereo at the clock's rate
        let mut resampler = match audio_decoder {
            Some(ref decoder) => Some(ResamplerContext::get(
                decoder.format(),
                decoder.channel_layout(),
                decoder.rate(),
                Sample::F32(ffmpeg_next::util::format::sample::Type::Packed),
                ChannelLayout::STEREO,
                self.clock.sample_rate(),
            )?),
            None => None,
        };

        let mut video_frame = VideoFrame::empty();
        let mut audio_frame = AudioFrame::empty();
        let mut rgba_frame = VideoFrame::empty();
        let mut at_eof = false;

        while !stop_flag.load(Ordering::Relaxed) {
            if let Flow::Exit = self.drain_commands() {
                return Ok(());
            }

            if let Some(target) = self.pending_seek.take() {
                let target_ts = (target * ffmpeg_next::ffi::AV_TIME_BASE as f64) as i64;
                match input.seek(target_ts, ..target_ts) {
                    Ok(()) => {
                        video_decoder.flush();
                        if let Some(ref mut dec) = audio_decoder {
                            dec.flush();
                        }
                        self.clock.set_position(target);
                        at_eof = false;
                    }
                    Err(e) => tracing::warn!("Seek to {target:.2}s failed: {e}"),
                }
            }

            if self.paused || at_eof {
                thread::sleep(IDLE_POLL);
                continue;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut input) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => {
                    tracing::debug!("Reached end of {}", path.display());
                    at_eof = true;
                    continue;
                }
                Err(e) => {
                    tracing::trace!("Skipping unreadable packet: {e}");
                    continue;
                }
            }

            let stream_index = packet.stream();

            if stream_index == video_stream_index {
                video_decoder.send_packet(&packet)?;

                while video_decoder.receive_frame(&mut video_frame).is_ok() {
                    scaler.run(&video_frame, &mut rgba_frame)?;
                    let frame = to_rgba(&video_frame, &rgba_frame, video_time_base);
                    match self.deliver(frame) {
                        Delivery::Sent => {}
                        Delivery::Abandoned => break,
                        Delivery::Exit => return Ok(()),
                    }
                }
            } else if Some(stream_index) == audio_stream_index {
                if let (Some(decoder), Some(resampler)) =
                    (audio_decoder.as_mut(), resampler.as_mut())
                {
                    decoder.send_packet(&packet)?;

                    while decoder.receive_frame(&mut audio_frame).is_ok() {
                        let mut resampled = AudioFrame::empty();
                        if resampler.run(&audio_frame, &mut resampled).is_ok() {
                            let samples = packed_samples(
                                resampled.data(0),
                                resampled.samples() * OUTPUT_CHANNELS as usize,
                            );
                            self.ring.push_slice(&samples);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn to_rgba(source: &VideoFrame, rgba: &VideoFrame, time_base: Rational) -> DecodedVideoFrame {
    let pts = source.pts().unwrap_or(0);
    let (width, height) = (rgba.width(), rgba.height());
    DecodedVideoFrame {
        rgba: packed_rows(rgba.data(0), rgba.stride(0), width as usize * 4, height as usize),
        width,
        height,
        pts: pts as f64 * f64::from(time_base),
    }
}

/// Copy `height` rows of `row_bytes` out of a plane whose rows are `stride`
/// bytes apart. FFmpeg pads rows for alignment; egui wants them tight.
fn packed_rows(plane: &[u8], stride: usize, row_bytes: usize, height: usize) -> Vec<u8> {
    if stride == row_bytes {
        return plane[..row_bytes * height].to_vec();
    }
    let mut packed = Vec::with_capacity(row_bytes * height);
    for row in plane.chunks(stride).take(height) {
        packed.extend_from_slice(&row[..row_bytes]);
    }
    packed
}

/// Read the first `count` native-endian f32 samples of a packed plane.
/// The plane itself may be longer than the frame's samples.
fn packed_samples(plane: &[u8], count: usize) -> Vec<f32> {
    plane
        .chunks_exact(4)
        .take(count)
        .map(|bytes| f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}
