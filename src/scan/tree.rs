use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use log::debug;
use walkdir::WalkDir;

use crate::{Result, SyncError};

/// Extension given to every audio file on the target side.
pub const TARGET_EXTENSION: &str = "mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Lossless,
    Compressed,
}

impl AudioFormat {
    /// Case-insensitive; anything other than flac/mp3 is a plain file.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "flac" => Some(AudioFormat::Lossless),
            "mp3" => Some(AudioFormat::Compressed),
            _ => None,
        }
    }
}

/// Path relative to a tree root with `/` separators. Audio keys omit the extension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativeKey(String);

impl RelativeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_relative_path(path: &Path) -> Result<Self> {
        let mut parts = Vec::new();
        for component in path.components() {
            if let Component::Normal(part) = component {
                let part = part
                    .to_str()
                    .ok_or_else(|| SyncError::NonUtf8Path(path.to_path_buf()))?;
                parts.push(part);
            }
        }
        Ok(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }

    /// Path of `<key>.<ext>` under `root`.
    pub fn resolve_with_extension(&self, root: &Path, ext: &str) -> PathBuf {
        root.join(format!("{}.{}", self.0, ext))
    }
}

impl fmt::Display for RelativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEntry {
    pub key: RelativeKey,
    pub format: AudioFormat,
    /// Extension as found on disk, case preserved.
    pub extension: String,
    pub modified: SystemTime,
}

impl AudioEntry {
    pub fn path_in(&self, root: &Path) -> PathBuf {
        self.key.resolve_with_extension(root, &self.extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainEntry {
    pub key: RelativeKey,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub key: RelativeKey,
    /// Nesting level below the root, starting at 0.
    pub depth: usize,
}

/// Immutable view of one tree, built once per side per run.
#[derive(Debug, Clone, Default)]
pub struct TreeSnapshot {
    pub root: PathBuf,
    pub audio: BTreeMap<RelativeKey, AudioEntry>,
    pub other: BTreeMap<RelativeKey, PlainEntry>,
    pub dirs: BTreeMap<RelativeKey, DirEntry>,
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> Result<&'a Path> {
    path.strip_prefix(root).map_err(|_| {
        SyncError::fs(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not below the scanned root {}", root.display()),
            ),
        )
    })
}

#[derive(Debug, Clone, Default)]
pub struct Scanner {
    ignore_dirs: BTreeSet<String>,
}

impl Scanner {
    pub fn new(ignore_dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ignore_dirs: ignore_dirs.into_iter().map(Into::into).collect(),
        }
    }

    fn is_ignored(&self, entry: &walkdir::DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.ignore_dirs.contains(name))
    }

    /// Walks `root` and classifies every entry. Ignored directories drop out
    /// together with everything below them.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<TreeSnapshot> {
        let root = root.as_ref();
        let mut snapshot = TreeSnapshot {
            root: root.to_path_buf(),
            ..TreeSnapshot::default()
        };

        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e));

        for entry in walker {
            let entry = entry?;
            let relative = relative_to(root, entry.path())?;

            if entry.file_type().is_dir() {
                let key = RelativeKey::from_relative_path(relative)?;
                snapshot.dirs.insert(
                    key.clone(),
                    DirEntry {
                        key,
                        depth: entry.depth() - 1,
                    },
                );
                continue;
            }

            if !entry.file_type().is_file() {
                debug!("Skipping non-regular entry: {}", entry.path().display());
                continue;
            }

            let modified = entry
                .metadata()?
                .modified()
                .map_err(|e| SyncError::fs(entry.path(), e))?;

            let audio = relative
                .extension()
                .and_then(|e| e.to_str())
                .and_then(|ext| AudioFormat::from_extension(ext).map(|f| (f, ext.to_string())));

            match audio {
                Some((format, extension)) => {
                    let key = RelativeKey::from_relative_path(&relative.with_extension(""))?;
                    if snapshot.audio.contains_key(&key) {
                        return Err(SyncError::DuplicateAudioKey(key.to_string()));
                    }
                    snapshot.audio.insert(
                        key.clone(),
                        AudioEntry {
                            key,
                            format,
                            extension,
                            modified,
                        },
                    );
                }
                None => {
                    let key = RelativeKey::from_relative_path(relative)?;
                    snapshot.other.insert(key.clone(), PlainEntry { key, modified });
                }
            }
        }

        debug!(
            "Scanned {}: {} audio, {} other, {} dirs",
            root.display(),
            snapshot.audio.len(),
            snapshot.other.len(),
            snapshot.dirs.len()
        );
        Ok(snapshot)
    }
}
