//! Reading Package Control's settings file.

use log::{debug, warn};
use serde::Deserialize;

use super::EditorPaths;
use crate::runtime::Runtime;

#[derive(Debug, Default, Deserialize)]
struct PackageControlSettings {
    #[serde(default)]
    installed_packages: Vec<String>,
}

/// Package names Package Control manages on this machine.
///
/// The file belongs to another program, so any failure to read or parse it
/// degrades to an empty list with a warning. Package Control's own entry is
/// dropped, it is never archived or restored through here.
#[tracing::instrument(skip(runtime, paths))]
pub fn managed_packages<R: Runtime>(runtime: &R, paths: &EditorPaths) -> Vec<String> {
    let settings_file = paths.package_control_settings();

    if !runtime.exists(&settings_file) {
        debug!("No settings file at {}", settings_file.display());
        return Vec::new();
    }

    let contents = match runtime.read_to_string(&settings_file) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("Could not read {}: {:#}", settings_file.display(), err);
            return Vec::new();
        }
    };

    let settings: PackageControlSettings = match serde_json::from_str(&contents) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("Could not parse {}: {}", settings_file.display(), err);
            return Vec::new();
        }
    };

    settings
        .installed_packages
        .into_iter()
        .filter(|name| !name.eq_ignore_ascii_case("package control"))
        .collect()
}
