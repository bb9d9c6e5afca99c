//! Repairs movie trailer files saved with a stray extension.
//!
//! yt-dlp appends the real container extension when the requested format is
//! unavailable, leaving files like `X-trailer.mp4.webm` next to the expected
//! `X-trailer.mp4`. Players match trailers by exact filename, so those files
//! are renamed into place.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::classify::is_system_entry;
use crate::error::{Error, Result};
use crate::trailer::TRAILER_SUFFIX;

/// In-flight download leftovers that must never be renamed.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl"];

/// Summary of one fix-extensions run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixupReport {
    /// Files renamed to the expected trailer name.
    pub renamed: usize,
    /// Strays left alone because the expected file already exists.
    pub skipped: usize,
    /// Rename attempts that failed.
    pub failed: usize,
}

impl FixupReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: FixupReport) {
        self.renamed += other.renamed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Rename stray trailer files under every movie folder of `root`.
///
/// A stray is a regular file named `<folder>-trailer.<anything>` that is not
/// the expected `<folder>-trailer.mp4` itself. With `dry_run` the renames
/// are logged and counted but not performed.
///
/// # Errors
///
/// Fails only when `root` itself cannot be listed. Problems inside a single
/// movie folder are logged and skipped.
pub fn fix_extensions(root: &Path, dry_run: bool) -> Result<FixupReport> {
    let entries = std::fs::read_dir(root).map_err(|e| Error::path_unavailable(root, e))?;

    let mut report = FixupReport::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Failed to read directory entry");
                continue;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_system_entry(name) {
            continue;
        }

        match entry.file_type() {
            Ok(ft) if ft.is_dir() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(entry = name, error = %e, "Entry vanished, skipping");
                continue;
            }
        }

        report.merge(fix_folder(&entry.path(), name, dry_run));
    }

    Ok(report)
}

/// Fix strays inside one movie folder.
fn fix_folder(folder: &Path, folder_name: &str, dry_run: bool) -> FixupReport {
    let mut report = FixupReport::default();

    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(folder = %folder.display(), error = %e, "Media folder vanished, skipping");
            return report;
        }
    };

    let expected_name = format!("{folder_name}{TRAILER_SUFFIX}");
    let prefix_lower = format!("{folder_name}-trailer.").to_lowercase();
    let expected_lower = expected_name.to_lowercase();

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let lower = file_name.to_lowercase();

        if !lower.starts_with(&prefix_lower) || lower == expected_lower {
            continue;
        }
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        if PARTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            debug!(file = file_name, "Download still in flight, leaving alone");
            continue;
        }

        let source = entry.path();
        let target = folder.join(&expected_name);
        if target.exists() {
            warn!(
                stray = %source.display(),
                "Expected trailer already exists, not overwriting"
            );
            report.skipped += 1;
            continue;
        }

        if dry_run {
            info!(from = %source.display(), to = %target.display(), "Would rename");
            report.renamed += 1;
            continue;
        }

        match std::fs::rename(&source, &target) {
            Ok(()) => {
                info!(from = %source.display(), to = %target.display(), "Renamed trailer");
                report.renamed += 1;
            }
            Err(e) => {
                warn!(from = %source.display(), error = %e, "Rename failed");
                report.failed += 1;
            }
        }
    }

    report
}
