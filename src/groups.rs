use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Skipped;

/// Files confirmed to be byte-identical.
///
/// Members are basenames in flat mode and full resolved paths in recursive
/// mode, see [`crate::ScanMode::member_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    pub size: u64,
    pub members: BTreeSet<PathBuf>,
}

impl DuplicateSet {
    fn new(size: u64, a: PathBuf, b: PathBuf) -> Self {
        let mut members = BTreeSet::new();
        members.insert(a);
        members.insert(b);
        Self { size, members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, member: &Path) -> bool {
        self.members.contains(member)
    }

    /// Bytes reclaimable by keeping a single copy
    pub fn wasted_space(&self) -> u64 {
        self.size * self.len().saturating_sub(1) as u64
    }
}

/// Ordered collection of duplicate sets, in the order they were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSets {
    sets: Vec<DuplicateSet>,
}

impl DuplicateSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed duplicate pair.
    ///
    /// Both members are added to the first set already holding either of
    /// them; otherwise a new set is started. Every pair coming out of the
    /// seen-map shares the canonical first path of its digest, so at most one
    /// existing set can ever match.
    pub fn insert_pair(&mut self, size: u64, a: PathBuf, b: PathBuf) {
        if let Some(set) = self
            .sets
            .iter_mut()
            .find(|set| set.contains(&a) || set.contains(&b))
        {
            set.members.insert(a);
            set.members.insert(b);
            return;
        }

        self.sets.push(DuplicateSet::new(size, a, b));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of files that could be removed, not counting keepers
    pub fn duplicate_count(&self) -> usize {
        self.sets.iter().map(|set| set.len().saturating_sub(1)).sum()
    }

    pub fn wasted_space(&self) -> u64 {
        self.sets.iter().map(DuplicateSet::wasted_space).sum()
    }
}

impl<'a> IntoIterator for &'a DuplicateSets {
    type Item = &'a DuplicateSet;
    type IntoIter = std::slice::Iter<'a, DuplicateSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

/// How many files entered each stage of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StageStats {
    /// Distinct regular files found by traversal
    pub files_found: usize,
    pub total_size: u64,
    /// Files sharing their size with at least one other file
    pub size_candidates: usize,
    /// Files sharing (prefix digest, size) with at least one other file
    pub prefix_candidates: usize,
    /// Files whose full content was hashed successfully
    pub full_hashed: usize,
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub sets: DuplicateSets,
    pub skipped: Vec<Skipped>,
    pub stats: StageStats,
}

impl ScanReport {
    pub fn duplicate_count(&self) -> usize {
        self.sets.duplicate_count()
    }

    pub fn wasted_space(&self) -> u64 {
        self.sets.wasted_space()
    }
}
