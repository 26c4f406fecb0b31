//! Output staging: the timestamped work folder, the asset copy, and the
//! final rename once the submod's name is known.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use walkdir::WalkDir;

use crate::error::Error;

/// Seconds since the Unix epoch, used to keep output folders unique.
pub fn unix_timestamp() -> u64 {
    return SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| return elapsed.as_secs());
}

/// Path of the staging folder `<out_root>/<prefix>-<timestamp>`,
/// created unless `dry_run`.
///
/// # Errors
///
/// Returns `Error::Io` if the folder cannot be created.
pub fn create_out_dir(out_root: &Path, prefix: &str, timestamp: u64, dry_run: bool) -> Result<PathBuf, Error> {
    let out_dir = out_root.join(format!("{prefix}-{timestamp}"));
    if !dry_run {
        std::fs::create_dir_all(&out_dir)?;
    }
    tracing::debug!(path = %out_dir.display(), "staging folder");
    return Ok(out_dir);
}

/// Copy every file and directory under `src` into `dst`, reusing
/// directories that already exist. Symlinks are followed. When `dst` lives
/// inside `src` it is not copied into itself.
///
/// # Errors
///
/// Returns `Error::Walk` if `src` cannot be traversed,
/// or `Error::Io` if a directory or file cannot be written.
pub fn copy_tree(src: &Path, dst: &Path, dry_run: bool) -> Result<(), Error> {
    tracing::info!("Copying files from '{}' to '{}'", src.display(), dst.display());
    if dry_run {
        return Ok(());
    }

    let dst_canonical = dst.canonicalize().ok();
    let walk = WalkDir::new(src).follow_links(true).into_iter().filter_entry(|e| {
        return !(e.file_type().is_dir() && e.path().canonicalize().ok() == dst_canonical);
    });

    for entry in walk {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    return Ok(());
}

/// Rename the staging folder to `<name>-<timestamp>`, keeping the timestamp
/// suffix of the staging folder. Path separators in `name` become `_`.
/// Returns the final path; with `dry_run` nothing is renamed.
///
/// # Errors
///
/// Returns `Error::Io` if the rename fails.
pub fn finalize(out_dir: &Path, name: &str, dry_run: bool) -> Result<PathBuf, Error> {
    let folder = out_dir.file_name().and_then(|f| return f.to_str()).unwrap_or_default();
    let timestamp = folder.rsplit_once('-').map_or(folder, |(_, stamp)| return stamp);
    let safe_name = name.replace(['/', '\\'], "_");
    let final_dir = out_dir.with_file_name(format!("{safe_name}-{timestamp}"));

    if !dry_run {
        std::fs::rename(out_dir, &final_dir)?;
    }
    return Ok(final_dir);
}

/// Remove a staging folder left behind by a failed conversion.
/// Failures are logged; the original error is what the caller reports.
pub fn discard(out_dir: &Path) {
    if let Err(err) = std::fs::remove_dir_all(out_dir) {
        tracing::warn!(path = %out_dir.display(), %err, "could not remove staging folder");
    }
}
