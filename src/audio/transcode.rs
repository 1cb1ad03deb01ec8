use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::audio::metadata::{MetadataExtractor, StreamInfo};
use crate::config::Config;
use crate::tags::TagSet;
use crate::{Result, SyncError};

/// External encoder/decoder used for lossless sources.
pub trait Transcoder {
    /// Canonical fields of a lossless file.
    fn lossless_tags(&self, source: &Path) -> Result<TagSet>;

    /// Encodes a lossless file to mp3 at `dest`, overwriting it.
    /// Tags are written afterwards by the caller.
    fn encode(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// `flac -d` piped into `lame -r`.
pub struct FlacLameTranscoder {
    flac_program: PathBuf,
    lame_program: PathBuf,
    quality: String,
}

impl FlacLameTranscoder {
    pub fn new(
        flac_program: impl Into<PathBuf>,
        lame_program: impl Into<PathBuf>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            flac_program: flac_program.into(),
            lame_program: lame_program.into(),
            quality: quality.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.flac_program, &config.lame_program, &config.quality)
    }

    fn lame_args(&self, stream: &StreamInfo) -> Vec<String> {
        let mut args = vec![format!("-{}", self.quality), "-r".to_string()];
        if let Some(rate) = stream.sample_rate {
            args.push("-s".to_string());
            args.push(format!("{}", rate as f64 / 1000.0));
        }
        if let Some(bits) = stream.bits_per_sample {
            args.push("--bitwidth".to_string());
            args.push(bits.to_string());
        }
        if stream.channels == Some(1) {
            args.push("-m".to_string());
            args.push("m".to_string());
        }
        args.extend(
            ["--quiet", "--add-id3v2", "--noreplaygain", "-"]
                .iter()
                .map(|a| a.to_string()),
        );
        args
    }
}

impl Transcoder for FlacLameTranscoder {
    fn lossless_tags(&self, source: &Path) -> Result<TagSet> {
        Ok(MetadataExtractor::extract(source)?.tags)
    }

    fn encode(&self, source: &Path, dest: &Path) -> Result<()> {
        let stream = MetadataExtractor::extract(source)?.stream;
        let lame_args = self.lame_args(&stream);
        debug!("{} {} {}", self.lame_program.display(), lame_args.join(" "), dest.display());

        let mut decoder = Command::new(&self.flac_program)
            .args(["-d", "-s", "--force-raw-format", "--endian=little", "--sign=signed", "-c"])
            .arg(source)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SyncError::Transcode(format!("cannot run {}: {e}", self.flac_program.display()))
            })?;

        let pcm = decoder
            .stdout
            .take()
            .ok_or_else(|| SyncError::Transcode("decoder produced no output stream".to_string()))?;

        let encoder_status = match Command::new(&self.lame_program)
            .args(&lame_args)
            .arg(dest)
            .stdin(Stdio::from(pcm))
            .status()
        {
            Ok(status) => status,
            Err(e) => {
                let _ = decoder.kill();
                let _ = decoder.wait();
                return Err(SyncError::Transcode(format!(
                    "cannot run {}: {e}",
                    self.lame_program.display()
                )));
            }
        };
        let decoder_status = decoder.wait()?;

        if !decoder_status.success() {
            return Err(SyncError::Transcode(format!(
                "decoding {} failed ({decoder_status})",
                source.display()
            )));
        }
        if !encoder_status.success() {
            return Err(SyncError::Transcode(format!(
                "encoding {} failed ({encoder_status})",
                dest.display()
            )));
        }

        match fs::metadata(dest) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(SyncError::Transcode(format!(
                "encoder left no output at {}",
                dest.display()
            ))),
        }
    }
}
