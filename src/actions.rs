use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SkipReason;

/// Result of performing actions on files
#[derive(Debug, Clone, Default)]
pub struct ActionResult {
    pub operations: Vec<FileOperation>,
    pub total_space_saved: u64,
    pub total_files_processed: usize,
}

/// A single removal attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperation {
    pub path: PathBuf,
    pub outcome: Result<(), SkipReason>,
    pub space_saved: u64,
}

impl FileOperation {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl ActionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operation(&mut self, operation: FileOperation) {
        self.total_space_saved += operation.space_saved;
        self.total_files_processed += 1;
        self.operations.push(operation);
    }

    pub fn merge(&mut self, other: ActionResult) {
        for operation in other.operations {
            self.add_operation(operation);
        }
    }

    pub fn success_count(&self) -> usize {
        self.operations.iter().filter(|op| op.succeeded()).count()
    }

    pub fn error_count(&self) -> usize {
        self.operations.iter().filter(|op| !op.succeeded()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOperation> {
        self.operations.iter().filter(|op| !op.succeeded())
    }
}

/// Remove a file, or only report its size when `dry_run` is set.
///
/// Failures are returned inside the operation rather than as an error.
pub fn delete_file(path: &Path, size: u64, dry_run: bool) -> FileOperation {
    if dry_run {
        log::info!("Would delete: {}", path.display());
        return FileOperation {
            path: path.to_path_buf(),
            outcome: Ok(()),
            space_saved: size,
        };
    }

    match fs::remove_file(path) {
        Ok(()) => {
            log::info!("Deleted: {}", path.display());
            FileOperation {
                path: path.to_path_buf(),
                outcome: Ok(()),
                space_saved: size,
            }
        }
        Err(e) => {
            log::warn!("Failed to delete {}: {}", path.display(), e);
            FileOperation {
                path: path.to_path_buf(),
                outcome: Err(SkipReason::Remove(e.kind())),
                space_saved: 0,
            }
        }
    }
}
