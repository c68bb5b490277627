use std::path::{Path, PathBuf};

use console::style;
use serde::Serialize;

use crate::dedup::DeletionReport;
use crate::error::Stage;
use crate::groups::{ScanReport, StageStats};
use crate::utils::{calculate_percentage, display_path, format_file_size};

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub root: PathBuf,
    pub sets: Vec<JsonSet>,
    pub skipped: Vec<JsonSkipped>,
    pub stats: StageStats,
    pub duplicate_count: usize,
    pub wasted_space: u64,
}

#[derive(Debug, Serialize)]
pub struct JsonSet {
    pub size: u64,
    pub members: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct JsonSkipped {
    pub path: PathBuf,
    pub stage: Stage,
    pub reason: String,
}

impl JsonReport {
    pub fn new(root: &Path, report: &ScanReport) -> Self {
        Self {
            root: root.to_path_buf(),
            sets: report
                .sets
                .iter()
                .map(|set| JsonSet {
                    size: set.size,
                    members: set.members.iter().cloned().collect(),
                })
                .collect(),
            skipped: report
                .skipped
                .iter()
                .map(|s| JsonSkipped {
                    path: s.path.clone(),
                    stage: s.stage,
                    reason: s.reason.to_string(),
                })
                .collect(),
            stats: report.stats,
            duplicate_count: report.duplicate_count(),
            wasted_space: report.wasted_space(),
        }
    }
}

pub fn to_json(root: &Path, report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(root, report))
}

pub fn print_scan(root: &Path, report: &ScanReport, verbose: bool) {
    println!();
    println!("{}", style("📊 Duplicate Files Found").cyan().bold());
    println!("{}", style("=".repeat(40)).cyan());

    for (index, set) in report.sets.iter().enumerate() {
        println!();
        println!(
            "{} {} files, {} each",
            style(format!("Set {}:", index + 1)).bold(),
            set.len(),
            format_file_size(set.size)
        );
        for member in &set.members {
            println!("  {}", display_path(root, member).display());
        }
    }

    if verbose && !report.skipped.is_empty() {
        println!();
        println!("{}", style("⚠ Skipped files").yellow().bold());
        for skipped in &report.skipped {
            println!("  {}", skipped);
        }
    }

    let stats = &report.stats;
    println!();
    println!("{}", style("📈 Summary").green().bold());
    println!("{}", style("-".repeat(20)).green());
    println!("Files scanned: {} ({})", stats.files_found, format_file_size(stats.total_size));
    println!(
        "Candidates by size / prefix / full hash: {} / {} / {}",
        stats.size_candidates, stats.prefix_candidates, stats.full_hashed
    );
    println!("Duplicate sets: {}", report.sets.len());
    println!("Duplicate files: {}", report.duplicate_count());
    println!(
        "Potential space savings: {} ({:.1}%)",
        format_file_size(report.wasted_space()),
        calculate_percentage(report.wasted_space(), stats.total_size)
    );
    if !report.skipped.is_empty() {
        println!("Skipped files: {}", report.skipped.len());
    }
}

pub fn print_deletion(report: &DeletionReport) {
    let actions = &report.actions;

    println!();
    println!("{}", style("📊 Action Summary").green().bold());
    println!("{}", style("-".repeat(20)).green());
    println!("Files kept: {}", report.keepers.len());
    println!("Files processed: {}", actions.total_files_processed);
    println!("Successful operations: {}", actions.success_count());
    println!("Failed operations: {}", actions.error_count());
    println!("Total space saved: {}", format_file_size(actions.total_space_saved));

    if actions.error_count() > 0 {
        println!();
        println!("{}", style("❌ Errors:").red().bold());
        for op in actions.failures() {
            if let Err(reason) = &op.outcome {
                println!("  {}: {}", op.path.display(), reason);
            }
        }
    }
}
