use std::path::Path;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision};
use symphonia::core::probe::Hint;

use crate::tags::TagSet;
use crate::{Result, SyncError};

/// PCM layout of the default track, as far as the container states it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: Option<u32>,
    pub bits_per_sample: Option<u32>,
    pub channels: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct LosslessInfo {
    pub tags: TagSet,
    pub stream: StreamInfo,
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Probes a flac file for its Vorbis comments and stream parameters.
    /// Field names are lower-cased and combined `N/M` numbers are split.
    pub fn extract(path: impl AsRef<Path>) -> Result<LosslessInfo> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| SyncError::fs(path, e))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| SyncError::Metadata(format!("{}: {e}", path.display())))?;

        let mut format = probed.format;

        let stream = format
            .default_track()
            .map(|track| {
                let params = &track.codec_params;
                StreamInfo {
                    sample_rate: params.sample_rate,
                    bits_per_sample: params.bits_per_sample,
                    channels: params.channels.map(|c| c.count()),
                }
            })
            .unwrap_or_default();

        // Vorbis comments live in the container; fall back to anything found while probing.
        let tags = match format.metadata().current().map(collect_tags) {
            Some(tags) => tags,
            None => probed
                .metadata
                .get()
                .and_then(|metadata| metadata.current().map(collect_tags))
                .unwrap_or_default(),
        };

        Ok(LosslessInfo {
            tags: tags.split_totals(),
            stream,
        })
    }
}

fn collect_tags(revision: &MetadataRevision) -> TagSet {
    let mut tags = TagSet::new();
    for tag in revision.tags() {
        tags.push(tag.key.to_lowercase(), tag.value.to_string());
    }
    tags
}
