//! Packing and unpacking the package directories through the external archiver.

use anyhow::{Result, bail};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::editor::{EditorPaths, settings};
use crate::runtime::Runtime;

pub mod command;
pub mod runner;

use command::{PackCommand, UnpackCommand, build_exclusions};
pub use runner::{SevenZip, SevenZipBinary};

/// 7-Zip exits with 1 for non-fatal problems (e.g. files locked while reading).
const EXIT_WARNING: i32 = 1;

#[derive(Debug)]
pub struct PackOptions {
    pub password: Option<String>,
    pub backup: bool,
    pub exclude_managed: bool,
    pub exclusions: Vec<String>,
    pub output: Option<PathBuf>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            password: None,
            backup: false,
            exclude_managed: true,
            exclusions: Vec::new(),
            output: None,
        }
    }
}

pub struct Archiver<R: Runtime, Z: SevenZip> {
    pub runtime: R,
    pub sevenzip: Z,
    pub paths: EditorPaths,
}

impl<R: Runtime, Z: SevenZip> Archiver<R, Z> {
    pub fn new(runtime: R, sevenzip: Z, paths: EditorPaths) -> Self {
        Self {
            runtime,
            sevenzip,
            paths,
        }
    }

    /// Compress both package directories into a single archive.
    /// Returns the archive path, generated under the temp directory when the
    /// caller did not name one.
    #[tracing::instrument(skip(self, options))]
    pub fn pack(&self, options: PackOptions) -> Result<PathBuf> {
        let managed = if options.exclude_managed && !options.backup {
            settings::managed_packages(&self.runtime, &self.paths)
        } else {
            Vec::new()
        };

        let exclusions = build_exclusions(
            &options.exclusions,
            &managed,
            options.backup,
            options.exclude_managed,
        );
        debug!("Excluded dirs: {:?}", exclusions);

        let (output, generated) = match options.output {
            Some(output) => (output, false),
            None => (self.temp_output(), true),
        };

        let [(packages, _), (installed_packages, _)] = self.paths.directory_suffixes();
        let pack = PackCommand {
            output: output.clone(),
            inputs: [packages, installed_packages],
            password: options.password,
            exclusions,
        };

        info!("Packing into {}", output.display());
        let code = self.sevenzip.run(&pack.args());

        match code {
            Ok(code) if code == 0 || code == EXIT_WARNING => {
                if code == EXIT_WARNING {
                    warn!("Archiver finished with warnings (exit code 1)");
                }
                Ok(output)
            }
            Ok(code) => {
                self.discard_partial_archive(generated, &output);
                bail!("Archiver failed with exit code {}", code)
            }
            Err(err) => {
                self.discard_partial_archive(generated, &output);
                Err(err)
            }
        }
    }

    /// Extract an archive, into the data directory unless told otherwise.
    #[tracing::instrument(skip(self, input, output_dir, password))]
    pub fn unpack(
        &self,
        input: PathBuf,
        output_dir: Option<PathBuf>,
        password: Option<String>,
    ) -> Result<()> {
        if !self.runtime.exists(&input) {
            bail!("Archive not found: {}", input.display());
        }

        let output_dir =
            output_dir.unwrap_or_else(|| self.paths.default_unpack_dir().to_path_buf());
        info!("Extracting into {}", output_dir.display());

        let unpack = UnpackCommand {
            input,
            output_dir,
            password,
        };

        let code = self.sevenzip.run(&unpack.args())?;
        match code {
            0 => Ok(()),
            EXIT_WARNING => {
                warn!("Archiver finished with warnings (exit code 1)");
                Ok(())
            }
            code => bail!("Archiver failed with exit code {}", code),
        }
    }

    fn temp_output(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        self.runtime
            .temp_dir()
            .join(format!("subpack-{}-{}.zip", std::process::id(), millis))
    }

    /// Nothing should keep a half-written archive we named ourselves.
    fn discard_partial_archive(&self, generated: bool, output: &std::path::Path) {
        if generated && self.runtime.exists(output) {
            debug!("Removing partial archive {}", output.display());
            if let Err(err) = self.runtime.remove_file(output) {
                debug!("Could not remove {}: {:#}", output.display(), err);
            }
        }
    }
}
