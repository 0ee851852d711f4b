//! Editor data directory discovery and the paths derived from it.

pub mod settings;

use anyhow::{Context, Result, bail};
use log::info;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub const PACKAGES_DIR: &str = "Packages";
pub const INSTALLED_PACKAGES_DIR: &str = "Installed Packages";

/// Suffix applied to package names when they live in `Installed Packages`.
pub const PACKED_SUFFIX: &str = ".sublime-package";

#[cfg(target_os = "linux")]
const DATA_DIR_CANDIDATES: &[&str] = &["sublime-text", "sublime-text-3"];

#[cfg(not(target_os = "linux"))]
const DATA_DIR_CANDIDATES: &[&str] = &["Sublime Text", "Sublime Text 3"];

/// Resolved editor data directory and everything derived from it.
#[derive(Debug)]
pub struct EditorPaths {
    data_dir: PathBuf,
}

impl EditorPaths {
    /// Resolve the data directory: an explicit override wins, otherwise the
    /// first existing candidate under the platform config directory.
    #[tracing::instrument(skip(runtime, override_dir))]
    pub fn resolve<R: Runtime>(runtime: &R, override_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(data_dir) = override_dir {
            info!("Using data directory: {}", data_dir.display());
            return Ok(Self { data_dir });
        }

        let config_dir = runtime
            .config_dir()
            .context("Could not find config directory")?;

        for candidate in DATA_DIR_CANDIDATES {
            let data_dir = config_dir.join(candidate);
            if runtime.is_dir(&data_dir) {
                info!("Using data directory: {}", data_dir.display());
                return Ok(Self { data_dir });
            }
        }

        bail!(
            "Could not find the editor data directory under {}; pass --data-dir",
            config_dir.display()
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn packages(&self) -> PathBuf {
        self.data_dir.join(PACKAGES_DIR)
    }

    pub fn installed_packages(&self) -> PathBuf {
        self.data_dir.join(INSTALLED_PACKAGES_DIR)
    }

    pub fn packages_bak(&self) -> PathBuf {
        bak_path(&self.packages())
    }

    pub fn installed_packages_bak(&self) -> PathBuf {
        bak_path(&self.installed_packages())
    }

    /// Package Control's settings file, the list of externally managed packages.
    pub fn package_control_settings(&self) -> PathBuf {
        self.packages()
            .join("User")
            .join("Package Control.sublime-settings")
    }

    /// Directories that go into an archive, in the order they are passed to
    /// the archiver, paired with the suffix their package entries carry.
    pub fn directory_suffixes(&self) -> [(PathBuf, &'static str); 2] {
        [
            (self.packages(), ""),
            (self.installed_packages(), PACKED_SUFFIX),
        ]
    }

    /// Default extraction target: the common parent of both directories.
    pub fn default_unpack_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// `<path>.bak`, appended to the final component.
fn bak_path(path: &Path) -> PathBuf {
    let mut bak = path.as_os_str().to_os_string();
    bak.push(".bak");
    PathBuf::from(bak)
}
