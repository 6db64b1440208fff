//! Playback session: the playlist, the current index and the active player.

use anyhow::Result;
use std::fmt;
use std::path::Path;

use crate::player::Transport;
use crate::playlist::{Playlist, PlaylistEntry};

/// Seconds moved by a single seek step
pub const SEEK_STEP_SECS: f64 = 10.0;

/// Creates a player handle for a video path.
pub trait PlayerLoader {
    type Player: Transport;

    fn load(&mut self, path: &Path) -> Result<Self::Player>;
}

/// Outcome of a transport action, printed for the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportStatus {
    Playing,
    Paused,
    SeekingBackward(f64),
    SeekingForward(f64),
    SeekingTo(f64),
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
            Self::SeekingBackward(step) => write!(f, "Seeking backward {step} seconds"),
            Self::SeekingForward(step) => write!(f, "Seeking forward {step} seconds"),
            Self::SeekingTo(position) => write!(f, "Seeking to {position:.1} seconds"),
        }
    }
}

/// State shared by every input handler.
///
/// `current` always addresses a valid playlist entry. The player handle is
/// replaced wholesale on each index change, and the old one is dropped
/// before the new one is opened.
pub struct PlaylistSession<L: PlayerLoader> {
    playlist: Playlist,
    current: usize,
    loader: L,
    player: Option<L::Player>,
    load_error: Option<String>,
}

impl<L: PlayerLoader> PlaylistSession<L> {
    /// Create the session at the first entry and start playing it.
    pub fn new(playlist: Playlist, loader: L) -> Self {
        let mut session = Self {
            playlist,
            current: 0,
            loader,
            player: None,
            load_error: None,
        };
        session.activate_current();
        session
    }

    /// Move to the next entry. Returns false at the end of the playlist.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current += 1;
        self.activate_current();
        true
    }

    /// Move to the previous entry. Returns false at the start of the playlist.
    pub fn previous(&mut self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.current -= 1;
        self.activate_current();
        true
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.playlist.len()
    }

    pub fn can_previous(&self) -> bool {
        self.current > 0
    }

    /// Start playback when stopped, pause otherwise.
    pub fn toggle_playback(&mut self) -> Option<TransportStatus> {
        let player = self.player.as_mut()?;
        if player.rate() == 0.0 {
            player.play();
            Some(TransportStatus::Playing)
        } else {
            player.pause();
            Some(TransportStatus::Paused)
        }
    }

    /// Seek relative to the current position. The target is not clamped
    /// here; the player bounds it to the media duration.
    pub fn seek_by(&mut self, offset: f64) -> Option<TransportStatus> {
        let player = self.player.as_mut()?;
        let target = player.position() + offset;
        player.seek(target);
        Some(if offset < 0.0 {
            TransportStatus::SeekingBackward(offset.abs())
        } else {
            TransportStatus::SeekingForward(offset)
        })
    }

    /// Jump to an absolute position, as the seek bar does
    pub fn seek_to(&mut self, position: f64) -> Option<TransportStatus> {
        self.player.as_mut()?.seek(position);
        Some(TransportStatus::SeekingTo(position))
    }

    pub fn seek_backward(&mut self) -> Option<TransportStatus> {
        self.seek_by(-SEEK_STEP_SECS)
    }

    pub fn seek_forward(&mut self) -> Option<TransportStatus> {
        self.seek_by(SEEK_STEP_SECS)
    }

    fn activate_current(&mut self) {
        // Tear down first so the old decoder is gone before the new file opens
        self.player = None;
        self.load_error = None;

        let entry = &self.playlist.entries()[self.current];
        tracing::info!(
            index = self.current + 1,
            total = self.playlist.len(),
            path = %entry.path().display(),
            "Opening video"
        );

        match self.loader.load(entry.path()) {
            Ok(mut player) => {
                player.play();
                self.player = Some(player);
            }
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), "Failed to open video: {e:#}");
                self.load_error = Some(format!("Failed to open video: {e:#}"));
            }
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_entry(&self) -> &PlaylistEntry {
        &self.playlist.entries()[self.current]
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Window title for the current entry, with its 1-based position
    pub fn title(&self) -> String {
        format!(
            "Video Player - {} [{}/{}]",
            self.current_entry().file_name(),
            self.current + 1,
            self.playlist.len()
        )
    }

    pub fn label(&self) -> &str {
        self.current_entry().label()
    }

    pub fn player(&self) -> Option<&L::Player> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut L::Player> {
        self.player.as_mut()
    }

    /// Error from the last failed open, if any
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}
