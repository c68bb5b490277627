use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::actions::{delete_file, ActionResult, FileOperation};
use crate::error::SkipReason;
use crate::groups::DuplicateSets;

/// Outcome of removing duplicates from a scan.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    /// The file left in place for each set, in set order
    pub keepers: Vec<PathBuf>,
    pub actions: ActionResult,
    pub dry_run: bool,
}

impl DeletionReport {
    pub fn removed(&self) -> impl Iterator<Item = &Path> {
        self.actions
            .operations
            .iter()
            .filter(|op| op.succeeded())
            .map(|op| op.path.as_path())
    }
}

/// Delete all but one member of every duplicate set.
///
/// Members are joined onto `dir`: entry names from a flat scan land in that
/// directory, absolute paths from a recursive scan replace it. A member that
/// does not resolve to a path under `dir` is refused, never removed. The
/// keeper is the first member under `dir` in sorted order, preferring a
/// regular file over a symlink. A failed removal is recorded
/// in the report and the remaining files are still processed.
pub fn remove_duplicates(dir: &Path, sets: &DuplicateSets, dry_run: bool) -> DeletionReport {
    let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let mut report = DeletionReport {
        dry_run,
        ..DeletionReport::default()
    };

    for (index, set) in sets.iter().enumerate() {
        let targets: Vec<PathBuf> = set.members.iter().map(|m| dir.join(m)).collect();
        let inside: Vec<&PathBuf> = targets.iter().filter(|t| is_within(&dir, t)).collect();
        let Some(keeper) = inside
            .iter()
            .find(|target| !is_symlink(target))
            .or_else(|| inside.first())
            .copied()
            .or_else(|| targets.first())
            .cloned()
        else {
            continue;
        };

        log::debug!(
            "Set {}: keeping {} ({} to remove)",
            index + 1,
            keeper.display(),
            set.len() - 1
        );

        let mut result = ActionResult::new();
        for target in targets {
            if target == keeper {
                continue;
            }
            let operation = if is_within(&dir, &target) {
                delete_file(&target, set.size, dry_run)
            } else {
                log::warn!("Refusing to delete {} outside {}", target.display(), dir.display());
                FileOperation {
                    path: target,
                    outcome: Err(SkipReason::OutsideRoot),
                    space_saved: 0,
                }
            };
            result.add_operation(operation);
        }

        report.keepers.push(keeper);
        report.actions.merge(result);
    }

    report
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}

/// `path` names an entry strictly below `dir`
fn is_within(dir: &Path, path: &Path) -> bool {
    path != dir
        && path.starts_with(dir)
        && !path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
}
