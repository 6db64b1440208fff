pub mod app;
pub mod cli;
pub mod error;
pub mod input;
pub mod player;
pub mod playlist;
pub mod session;
pub mod ui;

pub use app::PlaylistApp;
pub use error::UsageError;
pub use player::{DisplayMode, PlayerState, Transport, VideoPlayer};
pub use playlist::{ParseMode, Playlist, PlaylistEntry};
pub use session::{PlayerLoader, PlaylistSession};
