//! Archiver command-line assembly.
//!
//! Argument order matters to 7-Zip: switches before the archive name,
//! the archive name before the input directories.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::blacklist;
use crate::editor::{INSTALLED_PACKAGES_DIR, PACKAGES_DIR, PACKED_SUFFIX};

/// `a` invocation: create an archive from the package directories.
#[derive(Debug)]
pub struct PackCommand {
    pub output: PathBuf,
    pub inputs: [PathBuf; 2],
    pub password: Option<String>,
    pub exclusions: Vec<String>,
}

impl PackCommand {
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["a".into(), "-tzip".into(), "-y".into()];

        if let Some(password) = &self.password {
            args.push(format!("-p{}", password).into());
        }

        for exclusion in &self.exclusions {
            args.push(format!("-x!{}*", exclusion).into());
        }

        args.push(self.output.clone().into_os_string());
        for input in &self.inputs {
            args.push(input.clone().into_os_string());
        }

        args
    }
}

/// `x` invocation: extract an archive into a directory.
#[derive(Debug)]
pub struct UnpackCommand {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub password: Option<String>,
}

impl UnpackCommand {
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["x".into(), "-tzip".into(), "-y".into()];

        let mut output_flag = OsString::from("-o");
        output_flag.push(&self.output_dir);
        args.push(output_flag);

        if let Some(password) = &self.password {
            args.push(format!("-p{}", password).into());
        }

        args.push(self.input.clone().into_os_string());

        args
    }
}

/// Assemble the exclusion list for a pack run.
///
/// User-supplied exclusions come first, then the static blacklist for each
/// directory, then one entry per managed package per directory. Managed
/// packages stay in the archive when `backup` is set; a backup must be a
/// faithful copy.
pub fn build_exclusions(
    user_exclusions: &[String],
    managed: &[String],
    backup: bool,
    exclude_managed: bool,
) -> Vec<String> {
    let mut exclusions: Vec<String> = user_exclusions.to_vec();

    for entry in blacklist::PACKAGES {
        exclusions.push(join_under(PACKAGES_DIR, entry, ""));
    }
    for entry in blacklist::INSTALLED_PACKAGES {
        exclusions.push(join_under(INSTALLED_PACKAGES_DIR, entry, ""));
    }

    if exclude_managed && !backup {
        for name in managed {
            exclusions.push(join_under(PACKAGES_DIR, name, ""));
            exclusions.push(join_under(INSTALLED_PACKAGES_DIR, name, PACKED_SUFFIX));
        }
    }

    exclusions
}

fn join_under(dir_name: &str, entry: &str, suffix: &str) -> String {
    let mut pattern = Path::new(dir_name)
        .join(entry)
        .to_string_lossy()
        .into_owned();
    pattern.push_str(suffix);
    pattern
}
