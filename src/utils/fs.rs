//! File-system helpers with path context on every failure.
//!
//! All destination writes go through this module so errors always name
//! the offending path, and so directory creation stays in one place.

use anyhow::{Context, Result};
use std::{
    fs,
    path::Path,
};

/// File names never copied into the output tree
pub const IGNORED_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Remove and recreate a directory, leaving it empty.
///
/// Clearing happens at build *start*, so a failed build leaves no stale
/// output behind.
pub fn clear_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear directory: {}", dir.display()))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(())
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Copy a single file, creating parent directories as needed.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::copy(src, dest)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
    Ok(())
}

/// Recursively copy a directory tree, skipping junk file names.
pub fn copy_dir_recursively(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("Invalid entry in {}", src.display()))?;
        let entry_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let name = entry.file_name();

        if IGNORED_FILE_NAMES.iter().any(|i| name == *i) {
            continue;
        }

        if entry_path.is_dir() {
            copy_dir_recursively(&entry_path, &dest_path)?;
        } else {
            copy_file(&entry_path, &dest_path)?;
        }
    }

    Ok(())
}

/// Read a file to string with path context.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
