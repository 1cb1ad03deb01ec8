//! Run configuration: built-in defaults, an optional TOML file, then CLI overrides.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::{Result, SyncError};

const DEFAULT_FIELD_MAP: &[(&str, &str)] = &[
    ("artist", "TPE1"),
    ("title", "TIT2"),
    ("album", "TALB"),
    ("albumartist", "TPE2"),
    ("tracknumber", "TRCK"),
    ("discnumber", "TPOS"),
    ("composer", "TCOM"),
    ("conductor", "TPE3"),
    ("remixer", "TPE4"),
    ("date", "TDRC"),
    ("comment", "COMM"),
    ("genre", "TCON"),
    ("language", "TLAN"),
    ("bpm", "TBPM"),
];

/// Encoder settings frame added by LAME.
const DEFAULT_IGNORE_FRAMES: &[&str] = &["TSSE"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tree holding flac, mp3 and other files.
    pub source: PathBuf,
    /// Mp3-only mirror kept in sync with `source`.
    pub target: PathBuf,
    /// Directory names skipped at any depth on both sides.
    pub ignore_dirs: Vec<String>,
    /// Vorbis field name to ID3 frame id. Unlisted fields become TXXX frames.
    pub field_map: BTreeMap<String, String>,
    /// Frames left out when comparing tags.
    pub ignore_frames: BTreeSet<String>,
    /// LAME preset, e.g. `V2`.
    pub quality: String,
    pub silent: bool,
    pub flac_program: PathBuf,
    pub lame_program: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            ignore_dirs: Vec::new(),
            field_map: DEFAULT_FIELD_MAP
                .iter()
                .map(|(field, frame)| (field.to_string(), frame.to_string()))
                .collect(),
            ignore_frames: DEFAULT_IGNORE_FRAMES.iter().map(|f| f.to_string()).collect(),
            quality: "V2".to_string(),
            silent: false,
            flac_program: PathBuf::from("flac"),
            lame_program: PathBuf::from("lame"),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| SyncError::fs(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, path) in [("source", &self.source), ("target", &self.target)] {
            if path.as_os_str().is_empty() {
                return Err(SyncError::Config(format!("no {name} directory given")));
            }
            if !path.is_dir() {
                return Err(SyncError::Config(format!(
                    "{name} directory does not exist: {}",
                    path.display()
                )));
            }
        }

        let same = match (fs::canonicalize(&self.source), fs::canonicalize(&self.target)) {
            (Ok(source), Ok(target)) => source == target,
            _ => self.source == self.target,
        };
        if same {
            return Err(SyncError::Config(
                "source and target are the same directory".to_string(),
            ));
        }

        if self.quality.trim().is_empty() {
            return Err(SyncError::Config("quality must not be empty".to_string()));
        }
        Ok(())
    }
}
