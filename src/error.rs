//! Command-line usage errors.

/// Errors raised while turning the command line into a playlist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("No videos given")]
    NoVideos,

    #[error("Each video must have a label ({count} arguments given)")]
    MissingLabel { count: usize },
}
