use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{ScanError, SkipReason, Skipped, Stage};
use crate::groups::{DuplicateSets, ScanReport, StageStats};
use crate::hashing::{self, Digest, DEFAULT_CHUNK_SIZE, PREFIX_LEN};

/// How far the scan reaches and how duplicate-set members are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Only the immediate contents of the root. Members are entry names and
    /// deletion resolves them against the root directory.
    #[default]
    Flat,
    /// The whole tree below the root. Members are full entry paths under it.
    Recursive,
}

impl ScanMode {
    /// Identity of an entry found under the root inside a duplicate set.
    ///
    /// Always derived from the entry itself, never from a symlink target, so
    /// deleting a member can only touch something inside the root.
    pub fn member_key(&self, path: &Path) -> PathBuf {
        match self {
            ScanMode::Flat => path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
            ScanMode::Recursive => path.to_path_buf(),
        }
    }

    fn max_depth(&self) -> usize {
        match self {
            ScanMode::Flat => 1,
            ScanMode::Recursive => usize::MAX,
        }
    }
}

/// Configuration for file scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub mode: ScanMode,
    pub prefix_len: usize,
    pub chunk_size: usize,
    pub min_size: u64,
    pub max_size: Option<u64>,
    pub include_extensions: HashSet<String>,
    pub exclude_extensions: HashSet<String>,
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::default(),
            prefix_len: PREFIX_LEN,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_size: 0,
            max_size: None,
            include_extensions: HashSet::new(),
            exclude_extensions: HashSet::new(),
            show_progress: false,
        }
    }
}

/// A regular file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Real path, used for hashing and identity
    pub path: PathBuf,
    /// Path of the directory entry that led to it
    pub entry: PathBuf,
    pub size: u64,
    /// The entry is a symlink rather than the file itself
    pub via_link: bool,
}

/// Index into the record arena of one scan
type RecordId = usize;

/// Mutable state owned by a single scan.
#[derive(Default)]
struct ScanState {
    records: Vec<FileRecord>,
    /// Real path -> record, one record per underlying file
    resolved: HashMap<PathBuf, RecordId>,
    skipped: Vec<Skipped>,
    stats: StageStats,
    /// Full digest -> first record seen with it, across the whole scan
    seen: HashMap<Digest, RecordId>,
    sets: DuplicateSets,
}

impl ScanState {
    fn skip(&mut self, path: &Path, stage: Stage, reason: SkipReason) {
        log::debug!("Skipping {} during {}: {}", path.display(), stage, reason);
        self.skipped.push(Skipped::new(path, stage, reason));
    }

    fn into_report(self) -> ScanReport {
        ScanReport {
            sets: self.sets,
            skipped: self.skipped,
            stats: self.stats,
        }
    }
}

/// Scanner for finding duplicate files
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn set_mode(&mut self, mode: ScanMode) {
        self.config.mode = mode;
    }

    pub fn set_prefix_len(&mut self, len: usize) {
        self.config.prefix_len = len;
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.config.chunk_size = size.max(1);
    }

    pub fn set_min_size(&mut self, size: u64) {
        self.config.min_size = size;
    }

    pub fn set_max_size(&mut self, size: u64) {
        self.config.max_size = Some(size);
    }

    pub fn set_include_extensions(&mut self, extensions: Vec<String>) {
        self.config.include_extensions = normalize_extensions(extensions);
    }

    pub fn set_exclude_extensions(&mut self, extensions: Vec<String>) {
        self.config.exclude_extensions = normalize_extensions(extensions);
    }

    pub fn set_show_progress(&mut self, show: bool) {
        self.config.show_progress = show;
    }

    /// Scan `root` and return every set of byte-identical files under it.
    ///
    /// Files that cannot be resolved, stat'ed or read are left out and listed
    /// in [`ScanReport::skipped`]; only a bad root aborts the scan.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, ScanError> {
        let root = resolve_root(root)?;
        let mut state = ScanState::default();

        self.collect_files(&root, &mut state);
        log::info!(
            "Found {} files under {}",
            state.stats.files_found,
            root.display()
        );

        let size_groups = group_by_size(&state.records);
        state.stats.size_candidates = size_groups.values().map(Vec::len).sum();
        log::debug!(
            "{} size groups hold {} candidates",
            size_groups.len(),
            state.stats.size_candidates
        );

        let prefix_groups = self.group_by_prefix(size_groups, &mut state);
        state.stats.prefix_candidates = prefix_groups.values().map(Vec::len).sum();
        log::debug!(
            "{} prefix groups hold {} candidates",
            prefix_groups.len(),
            state.stats.prefix_candidates
        );

        self.confirm_duplicates(prefix_groups, &mut state);
        log::info!(
            "{} duplicate sets, {} files skipped",
            state.sets.len(),
            state.skipped.len()
        );

        Ok(state.into_report())
    }

    /// Walk the root and record every distinct regular file by its real path
    fn collect_files(&self, root: &Path, state: &mut ScanState) {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.config.mode.max_depth())
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    let kind = e.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
                    state.skip(&path, Stage::Traversal, SkipReason::Stat(kind));
                    continue;
                }
            };

            let file_type = entry.file_type();
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let real_path = match fs::canonicalize(entry.path()) {
                Ok(path) => path,
                Err(e) => {
                    state.skip(entry.path(), Stage::Traversal, SkipReason::Unresolvable(e.kind()));
                    continue;
                }
            };

            let metadata = match fs::metadata(&real_path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    state.skip(&real_path, Stage::Traversal, SkipReason::Stat(e.kind()));
                    continue;
                }
            };

            // Symlinks to directories are not descended into
            if !metadata.is_file() {
                continue;
            }

            let size = metadata.len();
            if !self.should_include_file(entry.path(), size) {
                continue;
            }

            let via_link = file_type.is_symlink();
            if let Some(&id) = state.resolved.get(&real_path) {
                log::trace!("{} already recorded", real_path.display());
                // Prefer naming the file itself over a link to it
                let record = &mut state.records[id];
                if record.via_link && !via_link {
                    record.entry = entry.path().to_path_buf();
                    record.via_link = false;
                }
                continue;
            }

            state.stats.files_found += 1;
            state.stats.total_size += size;
            state.resolved.insert(real_path.clone(), state.records.len());
            state.records.push(FileRecord {
                path: real_path,
                entry: entry.path().to_path_buf(),
                size,
                via_link,
            });
        }
    }

    /// Check if a file should be included based on filters
    fn should_include_file(&self, path: &Path, size: u64) -> bool {
        if size < self.config.min_size {
            return false;
        }

        if let Some(max_size) = self.config.max_size {
            if size > max_size {
                return false;
            }
        }

        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_lowercase();
                if !self.config.include_extensions.is_empty()
                    && !self.config.include_extensions.contains(&ext)
                {
                    return false;
                }
                !self.config.exclude_extensions.contains(&ext)
            }
            None => self.config.include_extensions.is_empty(),
        }
    }

    /// Partition size candidates by (prefix digest, size)
    fn group_by_prefix(
        &self,
        size_groups: BTreeMap<u64, Vec<RecordId>>,
        state: &mut ScanState,
    ) -> BTreeMap<(Digest, u64), Vec<RecordId>> {
        let candidates: Vec<RecordId> = size_groups.into_values().flatten().collect();
        let progress = self.progress_bar(candidates.len(), "prefix");
        let prefix_len = self.config.prefix_len;

        let records = &state.records;
        let digests: Vec<(RecordId, Result<Digest, SkipReason>)> = candidates
            .into_par_iter()
            .map(|id| {
                let result = hashing::prefix_digest(&records[id].path, prefix_len);
                progress.inc(1);
                (id, result)
            })
            .collect();
        progress.finish_and_clear();

        let mut groups: BTreeMap<(Digest, u64), Vec<RecordId>> = BTreeMap::new();
        for (id, result) in digests {
            match result {
                Ok(digest) => groups
                    .entry((digest, state.records[id].size))
                    .or_default()
                    .push(id),
                Err(reason) => {
                    let path = state.records[id].path.clone();
                    state.skip(&path, Stage::PrefixHash, reason);
                }
            }
        }

        groups.retain(|_, ids| ids.len() > 1);
        groups
    }

    /// Hash full contents of prefix candidates and fold them into duplicate sets
    fn confirm_duplicates(
        &self,
        prefix_groups: BTreeMap<(Digest, u64), Vec<RecordId>>,
        state: &mut ScanState,
    ) {
        let candidates: Vec<RecordId> = prefix_groups.into_values().flatten().collect();
        let progress = self.progress_bar(candidates.len(), "full");
        let chunk_size = self.config.chunk_size;

        let records = &state.records;
        let digests: Vec<(RecordId, Result<Digest, SkipReason>)> = candidates
            .into_par_iter()
            .map(|id| {
                let result = hashing::full_digest(&records[id].path, chunk_size);
                progress.inc(1);
                (id, result)
            })
            .collect();
        progress.finish_and_clear();

        let mode = self.config.mode;
        for (id, result) in digests {
            let digest = match result {
                Ok(digest) => digest,
                Err(reason) => {
                    let path = state.records[id].path.clone();
                    state.skip(&path, Stage::FullHash, reason);
                    continue;
                }
            };
            state.stats.full_hashed += 1;

            match state.seen.get(&digest).copied() {
                Some(first) => {
                    let current = &state.records[id];
                    let original = &state.records[first];
                    log::debug!(
                        "{} duplicates {}",
                        current.entry.display(),
                        original.entry.display()
                    );
                    state.sets.insert_pair(
                        current.size,
                        mode.member_key(&current.entry),
                        mode.member_key(&original.entry),
                    );
                }
                None => {
                    state.seen.insert(digest, id);
                }
            }
        }
    }

    fn progress_bar(&self, len: usize, stage: &'static str) -> ProgressBar {
        if !self.config.show_progress || len == 0 {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:>6} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            progress.set_style(style.progress_chars("##-"));
        }
        progress.set_message(stage);
        progress
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition records by byte size, dropping sizes held by a single file
fn group_by_size(records: &[FileRecord]) -> BTreeMap<u64, Vec<RecordId>> {
    let mut groups: BTreeMap<u64, Vec<RecordId>> = BTreeMap::new();
    for (id, record) in records.iter().enumerate() {
        groups.entry(record.size).or_default().push(id);
    }

    groups.retain(|_, ids| ids.len() > 1);
    groups
}

fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let resolved = fs::canonicalize(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::RootNotFound(root.to_path_buf()),
        _ => ScanError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    Ok(resolved)
}

fn normalize_extensions(extensions: Vec<String>) -> HashSet<String> {
    extensions
        .into_iter()
        .map(|ext| ext.trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
