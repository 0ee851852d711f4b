//! File system operations (read, copy, move, remove).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_dir_impl(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_dir_impl(&self, path: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(path)?.map(|entry| Ok(entry?.path())).collect()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context("Failed to read file to string")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context("Failed to create directory")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn rename_impl(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).context("Failed to rename")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_file_impl(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).context("Failed to remove file")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).context("Failed to remove directory and its contents")?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn copy_dir_all_impl(&self, from: &Path, to: &Path) -> Result<()> {
        fs::create_dir_all(to).context("Failed to create destination directory")?;

        for entry in fs::read_dir(from).context("Failed to read source directory")? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let source = entry.path();
            let target = to.join(entry.file_name());

            if file_type.is_symlink() {
                // Preserve the link itself rather than copying what it points at.
                let link_target = fs::read_link(&source).context("Failed to read symlink")?;
                #[cfg(unix)]
                std::os::unix::fs::symlink(&link_target, &target)
                    .context("Failed to create symlink")?;
                #[cfg(windows)]
                {
                    if source.is_dir() {
                        std::os::windows::fs::symlink_dir(&link_target, &target)
                            .context("Failed to create directory symlink")?;
                    } else {
                        std::os::windows::fs::symlink_file(&link_target, &target)
                            .context("Failed to create file symlink")?;
                    }
                }
            } else if file_type.is_dir() {
                self.copy_dir_all_impl(&source, &target)?;
            } else {
                fs::copy(&source, &target).context("Failed to copy file")?;
            }
        }

        Ok(())
    }
}
