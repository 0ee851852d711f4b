//! Backup copies of the package directories.
//!
//! Nothing here is transactional. Each step is attempted independently and
//! removal failures are swallowed, so a half-finished run leaves whatever it
//! managed to do.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::editor::EditorPaths;
use crate::runtime::Runtime;

/// Copy both package directories to their `.bak` counterparts, dropping any
/// previous backups first.
#[tracing::instrument(skip(runtime, paths))]
pub fn backup<R: Runtime>(runtime: &R, paths: &EditorPaths) -> Result<()> {
    remove_backups(runtime, paths);

    copy_if_absent(
        runtime,
        &paths.installed_packages(),
        &paths.installed_packages_bak(),
    )?;
    copy_if_absent(runtime, &paths.packages(), &paths.packages_bak())?;

    Ok(())
}

/// Remove both backup directories. Best-effort: a backup that cannot be
/// removed is left behind.
#[tracing::instrument(skip(runtime, paths))]
pub fn remove_backups<R: Runtime>(runtime: &R, paths: &EditorPaths) {
    for directory in [paths.packages_bak(), paths.installed_packages_bak()] {
        if !runtime.exists(&directory) {
            continue;
        }
        info!("Remove old backup dir: {}", directory.display());
        if let Err(err) = runtime.remove_dir_all(&directory) {
            debug!("Could not remove {}: {:#}", directory.display(), err);
        }
    }
}

/// Move each backup directory back over its live counterpart.
/// Backups that do not exist are skipped.
#[tracing::instrument(skip(runtime, paths))]
pub fn restore_backups<R: Runtime>(runtime: &R, paths: &EditorPaths) -> Result<()> {
    move_if_present(runtime, &paths.packages_bak(), &paths.packages())?;
    move_if_present(
        runtime,
        &paths.installed_packages_bak(),
        &paths.installed_packages(),
    )?;
    Ok(())
}

fn copy_if_absent<R: Runtime>(runtime: &R, source: &Path, destination: &Path) -> Result<()> {
    if !runtime.exists(source) {
        debug!("Nothing to back up at {}", source.display());
        return Ok(());
    }
    if runtime.exists(destination) {
        debug!("Backup already present at {}", destination.display());
        return Ok(());
    }

    info!("Copy {} to {}", source.display(), destination.display());
    runtime
        .copy_dir_all(source, destination)
        .with_context(|| format!("Failed to back up {}", source.display()))
}

fn move_if_present<R: Runtime>(runtime: &R, source: &Path, destination: &Path) -> Result<()> {
    if !runtime.exists(source) {
        debug!("Nothing to restore at {}", source.display());
        return Ok(());
    }

    if runtime.exists(destination) {
        runtime
            .remove_dir_all(destination)
            .with_context(|| format!("Failed to remove {}", destination.display()))?;
    }

    info!("Move {} to {}", source.display(), destination.display());
    if runtime.rename(source, destination).is_err() {
        // rename cannot cross filesystems; copy and delete instead
        runtime.copy_dir_all(source, destination)?;
        runtime
            .remove_dir_all(source)
            .with_context(|| format!("Failed to remove {}", source.display()))?;
    }

    Ok(())
}
