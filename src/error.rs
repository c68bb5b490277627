use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that abort a scan. Per-file problems never end up here, see [`Skipped`].
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single file was dropped from consideration.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The real path could not be resolved (dangling symlink, vanished entry)
    #[error("cannot resolve real path ({0:?})")]
    Unresolvable(io::ErrorKind),

    #[error("cannot read metadata ({0:?})")]
    Stat(io::ErrorKind),

    #[error("cannot open ({0:?})")]
    Open(io::ErrorKind),

    #[error("read failed ({0:?})")]
    Read(io::ErrorKind),

    /// Removal failed during deletion
    #[error("cannot remove ({0:?})")]
    Remove(io::ErrorKind),

    /// Deletion target does not lie under the scanned directory
    #[error("outside the scanned directory")]
    OutsideRoot,
}

impl SkipReason {
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match *self {
            SkipReason::Unresolvable(kind)
            | SkipReason::Stat(kind)
            | SkipReason::Open(kind)
            | SkipReason::Read(kind)
            | SkipReason::Remove(kind) => Some(kind),
            SkipReason::OutsideRoot => None,
        }
    }
}

/// Pipeline stage at which a file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Traversal,
    PrefixHash,
    FullHash,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Traversal => "traversal",
            Stage::PrefixHash => "prefix hash",
            Stage::FullHash => "full hash",
        };
        f.write_str(name)
    }
}

/// A file excluded from the scan, with the stage and reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub stage: Stage,
    pub reason: SkipReason,
}

impl Skipped {
    pub fn new(path: impl Into<PathBuf>, stage: Stage, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            stage,
            reason,
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path.display(), self.stage, self.reason)
    }
}
