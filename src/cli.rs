//! Command-line interface.

use clap::Parser;

use crate::error::UsageError;
use crate::input::KEY_BINDINGS;
use crate::playlist::{ParseMode, Playlist};

/// One-line usage printed when the arguments cannot form a playlist
pub const USAGE: &str = "Usage: playlist-player video1.mp4 [video2.mp4 ...]\n       \
                         playlist-player --labeled \"Name 1\" video1.mp4 [\"Name 2\" video2.mp4 ...]";

/// Play a list of videos one at a time
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Treat arguments as "label path" pairs
    #[arg(short, long)]
    pub labeled: bool,

    /// Do not keep the window above other windows
    #[arg(long)]
    pub windowed: bool,

    /// Video files, or label/path pairs with --labeled
    #[arg(value_name = "VIDEOS")]
    pub videos: Vec<String>,
}

impl Args {
    pub fn mode(&self) -> ParseMode {
        if self.labeled {
            ParseMode::Labeled
        } else {
            ParseMode::Paths
        }
    }

    pub fn playlist(&self) -> Result<Playlist, UsageError> {
        Playlist::parse(&self.videos, self.mode())
    }
}

/// Print the keyboard shortcuts
pub fn print_controls() {
    println!("Controls:");
    for (key, description) in KEY_BINDINGS {
        println!("{key}: {description}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn positional_videos_default_to_paths() {
        let args = Args::try_parse_from(["playlist-player", "a.mp4", "b.mp4"]).unwrap();
        assert_eq!(args.mode(), ParseMode::Paths);
        assert_eq!(args.playlist().unwrap().len(), 2);
    }

    #[test]
    fn labeled_flag_pairs_arguments() {
        let args = Args::try_parse_from([
            "playlist-player",
            "--labeled",
            "Cafe A",
            "a.mp4",
            "Cafe B",
            "b.mp4",
        ])
        .unwrap();

        let playlist = args.playlist().unwrap();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.get(0).unwrap().label(), "Cafe A");
    }

    #[test]
    fn missing_videos_reach_playlist_as_usage_error() {
        let args = Args::try_parse_from(["playlist-player"]).unwrap();
        assert_eq!(args.playlist(), Err(UsageError::NoVideos));
    }
}
