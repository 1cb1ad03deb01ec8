//! Executes an [`ActionSet`] against the target tree.
//!
//! Stages run in a fixed order: create directories, copy other files,
//! update changed audio, create missing audio, delete audio, delete other
//! files, remove directories. Any error aborts the run.

use std::path::Path;

use log::info;

use crate::audio::transcode::Transcoder;
use crate::scan::tree::{AudioEntry, AudioFormat, TARGET_EXTENSION};
use crate::sync::diff::{ActionSet, ChangedAudio};
use crate::tags::{Canonicalizer, TagSet};
use crate::utils::file_ops::FileManager;
use crate::utils::reporting::{Action, Reporter};
use crate::{Result, SyncError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub dirs_created: usize,
    pub files_copied: usize,
    pub encoded: usize,
    pub tags_updated: usize,
    pub files_deleted: usize,
    pub dirs_removed: usize,
}

impl SyncSummary {
    pub fn log(&self) {
        info!(
            "Done: {} encoded, {} copied, {} tag updates, {} deleted, {} dirs created, {} dirs removed",
            self.encoded,
            self.files_copied,
            self.tags_updated,
            self.files_deleted,
            self.dirs_created,
            self.dirs_removed
        );
    }
}

pub struct Synchronizer<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    canonicalizer: &'a Canonicalizer,
    transcoder: &'a dyn Transcoder,
    reporter: &'a dyn Reporter,
    files: FileManager,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        source_root: &'a Path,
        target_root: &'a Path,
        canonicalizer: &'a Canonicalizer,
        transcoder: &'a dyn Transcoder,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            source_root,
            target_root,
            canonicalizer,
            transcoder,
            reporter,
            files: FileManager::new(),
        }
    }

    pub fn apply(&self, actions: &ActionSet) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();

        for dir in &actions.dirs_to_create {
            let path = dir.key.resolve(self.target_root);
            self.reporter.report(&Action::CreateDir(path.clone()));
            if self.files.ensure_directory(&path)? {
                summary.dirs_created += 1;
            }
        }

        for key in &actions.other_to_copy {
            let from = key.resolve(self.source_root);
            let to = key.resolve(self.target_root);
            self.reporter.report(&Action::Copy {
                from: from.clone(),
                to: to.clone(),
            });
            self.files.copy_preserving_times(&from, &to)?;
            summary.files_copied += 1;
        }

        for changed in &actions.audio_changed {
            self.update_changed(changed, &mut summary)?;
        }

        for entry in &actions.audio_left_only {
            self.create_missing(entry, &mut summary)?;
        }

        for entry in &actions.audio_to_delete {
            let path = entry.path_in(self.target_root);
            self.reporter.report(&Action::Delete(path.clone()));
            self.files.remove_file(&path)?;
            summary.files_deleted += 1;
        }

        for key in &actions.other_to_delete {
            let path = key.resolve(self.target_root);
            self.reporter.report(&Action::Delete(path.clone()));
            self.files.remove_file(&path)?;
            summary.files_deleted += 1;
        }

        for dir in &actions.dirs_to_delete {
            let path = dir.key.resolve(self.target_root);
            self.reporter.report(&Action::RemoveDir(path.clone()));
            self.files.remove_directory(&path)?;
            summary.dirs_removed += 1;
        }

        Ok(summary)
    }

    fn source_tags(&self, entry: &AudioEntry) -> Result<TagSet> {
        let path = entry.path_in(self.source_root);
        match entry.format {
            AudioFormat::Lossless => self.transcoder.lossless_tags(&path),
            AudioFormat::Compressed => self.canonicalizer.read_mp3(&path),
        }
    }

    /// Tags differ: rewrite the target's tags only. Tags equal: the audio
    /// itself changed, so encode or copy it again.
    fn update_changed(&self, changed: &ChangedAudio, summary: &mut SyncSummary) -> Result<()> {
        let source_path = changed.source.path_in(self.source_root);
        let target_path = changed.target.path_in(self.target_root);
        if changed.target.format != AudioFormat::Compressed {
            return Err(SyncError::UnexpectedTargetFormat(target_path));
        }

        let source_tags = self.source_tags(&changed.source)?;
        let target_tags = self.canonicalizer.read_mp3(&target_path)?;

        if source_tags != target_tags {
            self.reporter.report(&Action::CopyTags {
                from: source_path,
                to: target_path.clone(),
            });
            self.canonicalizer.write_mp3(&target_path, &source_tags)?;
            summary.tags_updated += 1;
            return Ok(());
        }

        match changed.source.format {
            AudioFormat::Lossless => {
                self.reporter.report(&Action::Encode {
                    from: source_path.clone(),
                    to: target_path.clone(),
                });
                self.transcoder.encode(&source_path, &target_path)?;
                self.canonicalizer.write_mp3(&target_path, &source_tags)?;
                summary.encoded += 1;
            }
            AudioFormat::Compressed => {
                self.reporter.report(&Action::Copy {
                    from: source_path.clone(),
                    to: target_path.clone(),
                });
                self.files.copy_preserving_times(&source_path, &target_path)?;
                summary.files_copied += 1;
            }
        }
        Ok(())
    }

    fn create_missing(&self, entry: &AudioEntry, summary: &mut SyncSummary) -> Result<()> {
        let source_path = entry.path_in(self.source_root);
        let target_path = entry
            .key
            .resolve_with_extension(self.target_root, TARGET_EXTENSION);

        match entry.format {
            AudioFormat::Lossless => {
                self.reporter.report(&Action::Encode {
                    from: source_path.clone(),
                    to: target_path.clone(),
                });
                let tags = self.transcoder.lossless_tags(&source_path)?;
                self.transcoder.encode(&source_path, &target_path)?;
                self.canonicalizer.write_mp3(&target_path, &tags)?;
                summary.encoded += 1;
            }
            AudioFormat::Compressed => {
                self.reporter.report(&Action::Copy {
                    from: source_path.clone(),
                    to: target_path.clone(),
                });
                self.files.copy_preserving_times(&source_path, &target_path)?;
                summary.files_copied += 1;
            }
        }
        Ok(())
    }
}
