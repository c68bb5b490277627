//! Find byte-identical files under a directory and remove the extra copies.
//!
//! Files are narrowed in three passes, each cheaper than the next: grouping
//! by size, hashing a bounded prefix, then hashing full contents. Only files
//! that survive every pass are compared in full.

pub mod actions;
pub mod dedup;
pub mod error;
pub mod groups;
pub mod hashing;
pub mod logging;
pub mod report;
pub mod scanner;
pub mod utils;

pub use dedup::{remove_duplicates, DeletionReport};
pub use error::{ScanError, SkipReason, Skipped, Stage};
pub use groups::{DuplicateSet, DuplicateSets, ScanReport, StageStats};
pub use hashing::Digest;
pub use scanner::{FileRecord, ScanConfig, ScanMode, Scanner};
