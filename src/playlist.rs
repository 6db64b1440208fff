//! Playlist construction from command-line arguments.

use std::path::{Path, PathBuf};

use crate::error::UsageError;

/// How positional arguments are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Every argument is a video path.
    #[default]
    Paths,
    /// Arguments come in `label path` pairs.
    Labeled,
}

/// One playable video and the name shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    path: PathBuf,
    label: String,
}

impl PlaylistEntry {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display label, empty when none was given
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Last path component, used in the window title
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// Ordered, non-empty list of videos fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Wrap a list of entries, rejecting an empty one.
    pub fn new(entries: Vec<PlaylistEntry>) -> Result<Self, UsageError> {
        if entries.is_empty() {
            return Err(UsageError::NoVideos);
        }
        Ok(Self { entries })
    }

    /// Build a playlist from positional arguments (program name excluded).
    pub fn parse<S: AsRef<str>>(args: &[S], mode: ParseMode) -> Result<Self, UsageError> {
        if args.is_empty() {
            return Err(UsageError::NoVideos);
        }

        let entries = match mode {
            ParseMode::Paths => args
                .iter()
                .map(|path| {
                    let path: &str = path.as_ref();
                    PlaylistEntry::new(path, String::new())
                })
                .collect(),
            ParseMode::Labeled => {
                if args.len() % 2 != 0 {
                    return Err(UsageError::MissingLabel { count: args.len() });
                }
                args.chunks_exact(2)
                    .map(|pair| {
                        let (label, path): (&str, &str) = (pair[0].as_ref(), pair[1].as_ref());
                        PlaylistEntry::new(path, label)
                    })
                    .collect()
            }
        };

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a playlist built through `new` or `parse`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_mode_keeps_every_argument_in_order() {
        let playlist = Playlist::parse(&["a.mp4", "b.mp4", "c.mp4"], ParseMode::Paths).unwrap();

        assert_eq!(playlist.len(), 3);
        let paths: Vec<_> = playlist.entries().iter().map(|e| e.path()).collect();
        assert_eq!(
            paths,
            vec![Path::new("a.mp4"), Path::new("b.mp4"), Path::new("c.mp4")]
        );
        assert!(playlist.entries().iter().all(|e| e.label().is_empty()));
    }

    #[test]
    fn labeled_mode_pairs_label_with_following_path() {
        let args = ["Cafe A", "a.mp4", "Cafe B", "b.mp4"];
        let playlist = Playlist::parse(&args, ParseMode::Labeled).unwrap();

        assert_eq!(
            playlist.entries(),
            &[
                PlaylistEntry::new("a.mp4", "Cafe A"),
                PlaylistEntry::new("b.mp4", "Cafe B"),
            ]
        );
    }

    #[test]
    fn no_arguments_is_a_usage_error_in_both_modes() {
        let empty: [&str; 0] = [];
        assert_eq!(
            Playlist::parse(&empty, ParseMode::Paths),
            Err(UsageError::NoVideos)
        );
        assert_eq!(
            Playlist::parse(&empty, ParseMode::Labeled),
            Err(UsageError::NoVideos)
        );
    }

    #[test]
    fn odd_labeled_argument_count_is_rejected() {
        let result = Playlist::parse(&["Cafe A", "a.mp4", "Cafe B"], ParseMode::Labeled);
        assert_eq!(result, Err(UsageError::MissingLabel { count: 3 }));
    }

    #[test]
    fn mixed_arguments_without_labeled_flag_are_all_paths() {
        let playlist = Playlist::parse(&["a.mp4", "Cafe B"], ParseMode::Paths).unwrap();

        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.get(1).unwrap().path(), Path::new("Cafe B"));
        assert_eq!(playlist.get(1).unwrap().label(), "");
    }

    #[test]
    fn empty_entry_list_is_rejected() {
        assert_eq!(Playlist::new(Vec::new()), Err(UsageError::NoVideos));
    }

    #[test]
    fn file_name_uses_last_component() {
        let entry = PlaylistEntry::new("/videos/lunch/cafe.mp4", "Cafe");
        assert_eq!(entry.file_name(), "cafe.mp4");
    }
}
