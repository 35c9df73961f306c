use crate::error::{CrossyncError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Upper bound on collected entries; the report is an aid, not an audit.
pub const MAX_EMPTY_DIRS: usize = 100;

/// Directories under a source root that have no direct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmptyDirectoryReport {
    dirs: Vec<PathBuf>,
    truncated: bool,
}

impl EmptyDirectoryReport {
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// True when more than [`MAX_EMPTY_DIRS`] empty directories exist.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Walks `root` depth-first and reports directories with zero direct entries.
///
/// A directory holding only empty subdirectories is not itself reported.
/// Paths are relative to `root` and the root is never included. Traversal
/// errors abort the scan and yield an empty report.
pub fn scan_empty_directories<P: AsRef<Path>>(root: P) -> EmptyDirectoryReport {
    let root = root.as_ref();

    if !root.exists() {
        log::warn!("Empty directory scan skipped, {} does not exist", root.display());
        return EmptyDirectoryReport::default();
    }

    log::info!("Empty directory analysis: {}", root.display());

    // One past the cap tells a full report apart from a truncated one.
    match collect_empty_dirs(root, MAX_EMPTY_DIRS + 1) {
        Ok(mut dirs) => {
            let truncated = dirs.len() > MAX_EMPTY_DIRS;
            dirs.truncate(MAX_EMPTY_DIRS);
            if dirs.is_empty() {
                log::info!("  No empty directories found");
            } else if truncated {
                log::info!("  Found more than {} empty directories", MAX_EMPTY_DIRS);
            } else {
                log::info!("  Found {} empty directories", dirs.len());
            }
            EmptyDirectoryReport { dirs, truncated }
        }
        Err(e) => {
            log::error!("{}", e);
            EmptyDirectoryReport::default()
        }
    }
}

fn collect_empty_dirs(root: &Path, cap: usize) -> Result<Vec<PathBuf>> {
    let aborted = |message: String| CrossyncError::ScanAborted {
        root: root.to_path_buf(),
        message,
    };

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| aborted(e.to_string()))?;

        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }

        let mut children = fs::read_dir(entry.path())
            .map_err(|e| aborted(format!("{}: {}", entry.path().display(), e)))?;

        if children.next().is_none() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf();
            found.push(relative);

            if found.len() >= cap {
                break;
            }
        }
    }

    Ok(found)
}
