use std::path::PathBuf;

pub mod audio;
pub mod cli;
pub mod config;
pub mod scan;
pub mod sync;
pub mod tags;
pub mod utils;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("IO error at {}: {source}", .path.display())]
    Fs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("ID3 tag error: {0}")]
    Tag(#[from] id3::Error),
    #[error("Metadata extraction error: {0}")]
    Metadata(String),
    #[error("Transcoding failed: {0}")]
    Transcode(String),
    #[error("Two audio files share the name '{0}' in one directory")]
    DuplicateAudioKey(String),
    #[error("Target file is not an mp3: {}", .0.display())]
    UnexpectedTargetFormat(PathBuf),
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SyncError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Fs { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

// Re-exports for convenience
pub use config::Config;
pub use scan::tree::{AudioFormat, RelativeKey, Scanner, TreeSnapshot};
pub use sync::apply::{SyncSummary, Synchronizer};
pub use sync::diff::{diff, ActionSet};
pub use tags::{Canonicalizer, TagSet};
