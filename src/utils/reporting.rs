use std::fmt;
use std::path::{Path, PathBuf};

use csv::Writer;
use log::info;

use crate::sync::diff::ActionSet;
use crate::Result;

/// One filesystem step, announced before it is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateDir(PathBuf),
    Copy { from: PathBuf, to: PathBuf },
    Encode { from: PathBuf, to: PathBuf },
    CopyTags { from: PathBuf, to: PathBuf },
    Delete(PathBuf),
    RemoveDir(PathBuf),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CreateDir(path) => write!(f, "creating {}", path.display()),
            Action::Copy { from, to } => write!(f, "copying {} to {}", from.display(), to.display()),
            Action::Encode { from, to } => {
                write!(f, "encoding {} to {}", from.display(), to.display())
            }
            Action::CopyTags { from, to } => {
                write!(f, "copying tags {} to {}", from.display(), to.display())
            }
            Action::Delete(path) => write!(f, "deleting {}", path.display()),
            Action::RemoveDir(path) => write!(f, "removing {}", path.display()),
        }
    }
}

pub trait Reporter {
    fn report(&self, action: &Action);
}

/// Logs every action at info level.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, action: &Action) {
        info!("{action}");
    }
}

/// Silent mode.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _action: &Action) {}
}

pub fn reporter_for(silent: bool) -> Box<dyn Reporter> {
    if silent {
        Box::new(SilentReporter)
    } else {
        Box::new(LogReporter)
    }
}

pub struct PlanReport;

impl PlanReport {
    pub fn new() -> Self {
        Self
    }

    /// Writes one row per planned step, in the order they would be applied.
    /// Returns the number of rows written.
    pub fn generate(&self, actions: &ActionSet, output_path: impl AsRef<Path>) -> Result<usize> {
        let mut writer = Writer::from_path(output_path.as_ref())?;

        writer.write_record(["Action", "Path"])?;
        let mut rows = 0;
        for (kind, key) in actions.planned() {
            writer.write_record([kind.as_str(), key.as_str()])?;
            rows += 1;
        }

        writer.flush()?;
        Ok(rows)
    }
}

impl Default for PlanReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::tree::{RelativeKey, TreeSnapshot};
    use crate::sync::diff::diff;
    use std::time::SystemTime;

    #[test]
    fn action_lines_read_naturally() {
        let action = Action::Copy {
            from: PathBuf::from("/src/a.txt"),
            to: PathBuf::from("/dst/a.txt"),
        };
        assert_eq!(action.to_string(), "copying /src/a.txt to /dst/a.txt");
    }

    #[test]
    fn plan_report_lists_each_step() {
        let mut source = TreeSnapshot::default();
        let key = RelativeKey::new("cover.jpg");
        source.other.insert(
            key.clone(),
            crate::scan::tree::PlainEntry {
                key,
                modified: SystemTime::UNIX_EPOCH,
            },
        );
        let actions = diff(&source, &TreeSnapshot::default());

        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("plan.csv");
        let rows = PlanReport::new().generate(&actions, &out).unwrap();

        assert_eq!(rows, 1);
        let content = std::fs::read_to_string(out).unwrap();
        assert_eq!(content, "Action,Path\ncopy,cover.jpg\n");
    }

    #[test]
    fn empty_plan_writes_only_the_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("plan.csv");

        let rows = PlanReport::new().generate(&ActionSet::default(), &out).unwrap();

        assert_eq!(rows, 0);
        assert_eq!(std::fs::read_to_string(out).unwrap(), "Action,Path\n");
    }
}
