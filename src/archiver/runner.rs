//! Locating and running the external archiver binary.

use anyhow::{Context, Result, bail};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::runtime::Runtime;

/// Well-known names of 7-Zip-compatible binaries, in preference order.
const CANDIDATES: &[&str] = &["7za", "7z", "7zz"];

/// Seam between command assembly and process spawning.
#[cfg_attr(test, mockall::automock)]
pub trait SevenZip: Send + Sync {
    /// Run the archiver with the given arguments and return its exit code.
    fn run(&self, args: &[OsString]) -> Result<i32>;
}

#[derive(Debug)]
pub struct SevenZipBinary {
    executable: PathBuf,
}

impl SevenZipBinary {
    /// Find the archiver: an explicit override wins, otherwise the first
    /// candidate name found on `PATH`.
    #[tracing::instrument(skip(runtime, override_path))]
    pub fn locate<R: Runtime>(runtime: &R, override_path: Option<PathBuf>) -> Result<Self> {
        if let Some(executable) = override_path {
            if !runtime.exists(&executable) {
                bail!("Archiver binary not found: {}", executable.display());
            }
            debug!("Using archiver: {}", executable.display());
            return Ok(Self { executable });
        }

        let path_var = runtime.env_var("PATH").unwrap_or_default();
        for dir in std::env::split_paths(&path_var) {
            for candidate in CANDIDATES {
                let file_name = if cfg!(windows) {
                    format!("{}.exe", candidate)
                } else {
                    candidate.to_string()
                };
                let executable = dir.join(file_name);
                if runtime.exists(&executable) {
                    debug!("Using archiver: {}", executable.display());
                    return Ok(Self { executable });
                }
            }
        }

        bail!("Couldn't find a 7-Zip binary (tried 7za, 7z, 7zz); install one or pass --sevenzip")
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl SevenZip for SevenZipBinary {
    #[tracing::instrument(skip(self, args))]
    fn run(&self, args: &[OsString]) -> Result<i32> {
        debug!("Running {} {:?}", self.executable.display(), args);

        let mut command = Command::new(&self.executable);
        command.args(args);

        // Keep the child from flashing a console window.
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        // A None code means the process died from a signal
        Ok(status.code().unwrap_or(-1))
    }
}
