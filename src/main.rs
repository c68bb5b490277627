use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use duplicate_scanner::hashing::{DEFAULT_CHUNK_SIZE, PREFIX_LEN};
use duplicate_scanner::logging::init_logging;
use duplicate_scanner::utils::is_safe_path;
use duplicate_scanner::{remove_duplicates, report, ScanMode, Scanner};

#[derive(Parser)]
#[command(
    name = "dupscan",
    version,
    about = "Find and remove byte-identical files in a directory",
    long_about = "Group files by size, then by a hash of their first bytes, then by a hash of their full contents. Files sharing a full hash are reported as duplicate sets and can optionally be removed, keeping one copy per set."
)]
struct Cli {
    /// Directory to scan
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Walk the whole tree instead of only the directory's own files
    #[arg(
        short,
        long,
        help = "Scan subdirectories too; duplicate sets then hold full paths"
    )]
    recursive: bool,

    /// Delete every duplicate except one per set
    #[arg(long, help = "Delete all but one file of every duplicate set")]
    delete: bool,

    /// Perform a dry run without making actual changes
    #[arg(long, requires = "delete", help = "Show what would be deleted without deleting")]
    dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long, help = "Skip confirmation prompts (use with caution)")]
    yes: bool,

    /// Emit the scan report as JSON
    #[arg(long, help = "Print the scan report as JSON")]
    json: bool,

    /// Minimum file size to consider (in bytes)
    #[arg(long, default_value = "0", help = "Minimum file size in bytes to consider")]
    min_size: u64,

    /// Maximum file size to consider (in bytes)
    #[arg(long, help = "Maximum file size in bytes to consider")]
    max_size: Option<u64>,

    /// File extensions to include (e.g., jpg,png,pdf)
    #[arg(long, value_delimiter = ',', help = "File extensions to include (comma-separated)")]
    include_ext: Vec<String>,

    /// File extensions to exclude (e.g., tmp,log)
    #[arg(long, value_delimiter = ',', help = "File extensions to exclude (comma-separated)")]
    exclude_ext: Vec<String>,

    /// Bytes hashed by the prefix pass
    #[arg(long, default_value_t = PREFIX_LEN, help = "Leading bytes hashed before full hashing")]
    prefix_len: usize,

    /// Read buffer for full hashing
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Chunk size in bytes for full hashing")]
    chunk_size: usize,

    /// Number of threads to use for parallel hashing
    #[arg(long, default_value = "0", help = "Number of threads (0 = auto-detect)")]
    threads: usize,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose, args.quiet);

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let mut scanner = Scanner::new();
    scanner.set_mode(if args.recursive {
        ScanMode::Recursive
    } else {
        ScanMode::Flat
    });
    scanner.set_prefix_len(args.prefix_len);
    scanner.set_chunk_size(args.chunk_size);
    scanner.set_min_size(args.min_size);
    if let Some(max_size) = args.max_size {
        scanner.set_max_size(max_size);
    }
    scanner.set_include_extensions(args.include_ext);
    scanner.set_exclude_extensions(args.exclude_ext);
    scanner.set_show_progress(!args.quiet && !args.json);

    if !args.json {
        println!("{}", style("🔍 Scanning for duplicate files...").cyan().bold());
    }

    let scan_report = scanner
        .scan(&args.dir)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;
    let root = fs::canonicalize(&args.dir)
        .with_context(|| format!("Failed to resolve {}", args.dir.display()))?;

    if args.json {
        println!("{}", report::to_json(&root, &scan_report)?);
    } else if scan_report.sets.is_empty() {
        println!("{}", style("✅ No duplicate files found!").green().bold());
    } else {
        report::print_scan(&root, &scan_report, args.verbose > 0);
    }

    if !args.delete || scan_report.sets.is_empty() {
        return Ok(());
    }

    if !is_safe_path(&root) {
        bail!("Refusing to delete files in system directory {}", root.display());
    }

    if args.dry_run {
        println!("{}", style("🧪 Dry run mode - no changes will be made").yellow().bold());
    } else if !args.yes {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete {} duplicate files?",
                scan_report.duplicate_count()
            ))
            .interact()?;

        if !proceed {
            println!("{}", style("Operation cancelled").yellow());
            return Ok(());
        }
    }

    let deletion = remove_duplicates(&root, &scan_report.sets, args.dry_run);
    if !args.json {
        report::print_deletion(&deletion);
    }

    if deletion.actions.error_count() > 0 {
        log::warn!(
            "{} files could not be deleted",
            deletion.actions.error_count()
        );
    }

    Ok(())
}
