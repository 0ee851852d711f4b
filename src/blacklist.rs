//! Entries that never belong in an archive.
//!
//! Package Control recreates all of these on its own, and its cache and
//! certificate state are machine-specific.

/// Relative paths under the `Packages` directory.
pub const PACKAGES: &[&str] = &[
    "Package Control",
    "User/Package Control.cache",
    "User/Package Control.ca-bundle",
    "User/Package Control.ca-certs",
    "User/Package Control.ca-list",
    "User/Package Control.last-run",
    "User/Package Control.merged-ca-bundle",
    "User/Package Control.system-ca-bundle",
];

/// Relative paths under the `Installed Packages` directory.
pub const INSTALLED_PACKAGES: &[&str] = &["Package Control.sublime-package"];
