use std::path::{Path, PathBuf};

use humansize::{format_size, DECIMAL};

/// Format file size in human-readable format
pub fn format_file_size(size: u64) -> String {
    format_size(size, DECIMAL)
}

/// Check if a path is safe to delete from (basic safety checks)
pub fn is_safe_path(path: &Path) -> bool {
    // Don't operate on system directories
    let system_dirs = [
        "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/etc", "/boot",
        "/System", "/Library", "/Applications",
        "C:\\Windows", "C:\\Program Files", "C:\\Program Files (x86)",
    ];

    if path.parent().is_none() {
        return false;
    }

    !system_dirs.iter().any(|sys_dir| path.starts_with(sys_dir))
}

/// Path shown to the user: relative to `base` when that is shorter
pub fn display_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        return path.to_path_buf();
    }

    match pathdiff::diff_paths(path, base) {
        Some(relative) if !relative.starts_with("..") => relative,
        _ => path.to_path_buf(),
    }
}

/// Calculate the percentage of one number relative to another
pub fn calculate_percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
