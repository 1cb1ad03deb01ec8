//! Turns two tree snapshots into the set of steps that brings the target in
//! line with the source.
//!
//! | class  | source only | target only | source newer          | target newer or same |
//! |--------|-------------|-------------|-----------------------|----------------------|
//! | flac   | encode      | delete      | encode or copy tags   | nothing              |
//! | mp3    | copy        | delete      | copy or copy tags     | nothing              |
//! | other  | copy        | delete      | copy                  | copy unless same     |
//!
//! Whether a newer audio file is re-encoded or only gets its tags copied is
//! decided while applying, once tags can be read.

use crate::scan::tree::{AudioEntry, DirEntry, RelativeKey, TreeSnapshot};

/// A key present on both sides whose source copy is strictly newer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedAudio {
    pub source: AudioEntry,
    pub target: AudioEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    CreateDir,
    CopyOther,
    UpdateAudio,
    CreateAudio,
    DeleteAudio,
    DeleteOther,
    RemoveDir,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::CreateDir => "mkdir",
            PlanKind::CopyOther => "copy",
            PlanKind::UpdateAudio => "update",
            PlanKind::CreateAudio => "create",
            PlanKind::DeleteAudio | PlanKind::DeleteOther => "delete",
            PlanKind::RemoveDir => "rmdir",
        }
    }
}

/// Seven disjoint collections; every list is in apply order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    /// Parents before children.
    pub dirs_to_create: Vec<DirEntry>,
    /// Deepest first.
    pub dirs_to_delete: Vec<DirEntry>,
    pub other_to_copy: Vec<RelativeKey>,
    pub other_to_delete: Vec<RelativeKey>,
    /// Target-side entries.
    pub audio_to_delete: Vec<AudioEntry>,
    /// Source-side entries.
    pub audio_left_only: Vec<AudioEntry>,
    pub audio_changed: Vec<ChangedAudio>,
}

impl ActionSet {
    pub fn len(&self) -> usize {
        self.dirs_to_create.len()
            + self.dirs_to_delete.len()
            + self.other_to_copy.len()
            + self.other_to_delete.len()
            + self.audio_to_delete.len()
            + self.audio_left_only.len()
            + self.audio_changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every step with its key, in the order `apply` runs them.
    pub fn planned(&self) -> Vec<(PlanKind, &RelativeKey)> {
        let mut plan = Vec::with_capacity(self.len());
        plan.extend(self.dirs_to_create.iter().map(|d| (PlanKind::CreateDir, &d.key)));
        plan.extend(self.other_to_copy.iter().map(|k| (PlanKind::CopyOther, k)));
        plan.extend(self.audio_changed.iter().map(|c| (PlanKind::UpdateAudio, &c.source.key)));
        plan.extend(self.audio_left_only.iter().map(|a| (PlanKind::CreateAudio, &a.key)));
        plan.extend(self.audio_to_delete.iter().map(|a| (PlanKind::DeleteAudio, &a.key)));
        plan.extend(self.other_to_delete.iter().map(|k| (PlanKind::DeleteOther, k)));
        plan.extend(self.dirs_to_delete.iter().map(|d| (PlanKind::RemoveDir, &d.key)));
        plan
    }
}

pub fn diff(source: &TreeSnapshot, target: &TreeSnapshot) -> ActionSet {
    let dirs_to_create = source
        .dirs
        .values()
        .filter(|d| !target.dirs.contains_key(&d.key))
        .cloned()
        .collect();

    let mut dirs_to_delete: Vec<DirEntry> = target
        .dirs
        .values()
        .filter(|d| !source.dirs.contains_key(&d.key))
        .cloned()
        .collect();
    dirs_to_delete.sort_by(|a, b| b.depth.cmp(&a.depth).then_with(|| b.key.cmp(&a.key)));

    // Any mismatch copies, including a newer target file.
    let other_to_copy = source
        .other
        .values()
        .filter(|entry| {
            target
                .other
                .get(&entry.key)
                .map_or(true, |existing| existing.modified != entry.modified)
        })
        .map(|entry| entry.key.clone())
        .collect();

    let other_to_delete = target
        .other
        .keys()
        .filter(|key| !source.other.contains_key(*key))
        .cloned()
        .collect();

    let audio_to_delete = target
        .audio
        .values()
        .filter(|entry| !source.audio.contains_key(&entry.key))
        .cloned()
        .collect();

    let mut audio_left_only = Vec::new();
    let mut audio_changed = Vec::new();
    for entry in source.audio.values() {
        match target.audio.get(&entry.key) {
            None => audio_left_only.push(entry.clone()),
            Some(existing) if entry.modified > existing.modified => {
                audio_changed.push(ChangedAudio {
                    source: entry.clone(),
                    target: existing.clone(),
                })
            }
            Some(_) => {}
        }
    }

    ActionSet {
        dirs_to_create,
        dirs_to_delete,
        other_to_copy,
        other_to_delete,
        audio_to_delete,
        audio_left_only,
        audio_changed,
    }
}
