use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Default name of the stats file each simulation leaves in its output directory
pub const DEFAULT_FILE_NAME: &str = "zsim.parquet";

/// Recursively finds every file called `file_name` under `root`, sorted by path
pub fn discover(root: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && entry.file_name() == file_name {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}
