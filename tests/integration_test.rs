use assert_cmd::Command;
use assert_cmd::cargo;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn subpack() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("subpack"));
    cmd.env_remove("SUBPACK_DATA_DIR").env_remove("SUBPACK_7Z");
    cmd
}

/// A data directory with empty Packages and Installed Packages trees.
fn setup_data_dir() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Packages/User")).unwrap();
    fs::create_dir_all(dir.path().join("Installed Packages")).unwrap();
    dir
}

fn write_package_control_settings(data_dir: &Path, packages: &[&str]) {
    let entries: Vec<String> = packages.iter().map(|p| format!("\"{}\"", p)).collect();
    fs::write(
        data_dir.join("Packages/User/Package Control.sublime-settings"),
        format!("{{\"installed_packages\": [{}]}}", entries.join(", ")),
    )
    .unwrap();
}

/// Writes a stand-in archiver script that records its argv, one argument per
/// line, then exits with the given code.
#[cfg(unix)]
fn write_stub_archiver(dir: &Path, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let stub = dir.join("7za");
    let log = dir.join("argv.log");
    let script = format!(
        "#!/bin/sh\n: > \"{log}\"\nfor arg in \"$@\"; do printf '%s\\n' \"$arg\" >> \"{log}\"; done\nexit {code}\n",
        log = log.display(),
        code = exit_code,
    );
    fs::write(&stub, script).unwrap();
    let mut perms = fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&stub, perms).unwrap();
    stub
}

#[cfg(unix)]
fn recorded_args(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("argv.log"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(unix)]
#[test]
fn test_pack_records_create_invocation() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);
    let output = stub_dir.path().join("out.zip");

    subpack()
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicates::str::contains("out.zip"));

    let args = recorded_args(stub_dir.path());
    assert_eq!(&args[..3], &["a", "-tzip", "-y"]);
    assert!(args.contains(&"-x!Packages/Package Control*".to_string()));
    assert_eq!(args[args.len() - 3], output.display().to_string());
    assert_eq!(
        args[args.len() - 2],
        data.path().join("Packages").display().to_string()
    );
    assert_eq!(
        args[args.len() - 1],
        data.path().join("Installed Packages").display().to_string()
    );
}

#[cfg(unix)]
#[test]
fn test_pack_password_and_user_exclusions() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);

    subpack()
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg("-o")
        .arg(stub_dir.path().join("out.zip"))
        .arg("-p")
        .arg("s3cret")
        .arg("-x")
        .arg("Packages/Scratch")
        .assert()
        .success();

    let args = recorded_args(stub_dir.path());
    // Password comes right after the fixed switches, before any exclusion
    assert_eq!(args[3], "-ps3cret");
    assert_eq!(args[4], "-x!Packages/Scratch*");
}

#[cfg(unix)]
#[test]
fn test_pack_excludes_managed_packages() {
    let data = setup_data_dir();
    write_package_control_settings(data.path(), &["Package Control", "GitGutter"]);
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);

    subpack()
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg("-o")
        .arg(stub_dir.path().join("out.zip"))
        .assert()
        .success();

    let args = recorded_args(stub_dir.path());
    assert!(args.contains(&"-x!Packages/GitGutter*".to_string()));
    assert!(args.contains(&"-x!Installed Packages/GitGutter.sublime-package*".to_string()));
    // Package Control itself is only excluded through the blacklist entries
    assert!(!args.contains(&"-x!Installed Packages/Package Control.sublime-package.sublime-package*".to_string()));
}

#[cfg(unix)]
#[test]
fn test_pack_backup_mode_keeps_managed_packages() {
    let data = setup_data_dir();
    write_package_control_settings(data.path(), &["GitGutter"]);
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);

    subpack()
        .arg("pack")
        .arg("--backup")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg("-o")
        .arg(stub_dir.path().join("backup.zip"))
        .assert()
        .success();

    let args = recorded_args(stub_dir.path());
    assert!(!args.iter().any(|a| a.contains("GitGutter")));
    // Blacklist still applies
    assert!(args.contains(&"-x!Packages/Package Control*".to_string()));
}

#[cfg(unix)]
#[test]
fn test_pack_failure_reports_exit_code() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 2);

    subpack()
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg("-o")
        .arg(stub_dir.path().join("out.zip"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("exit code 2"));
}

#[cfg(unix)]
#[test]
fn test_pack_warning_exit_code_is_success() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 1);

    subpack()
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg("-o")
        .arg(stub_dir.path().join("out.zip"))
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn test_unpack_records_extract_invocation() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);
    let input = stub_dir.path().join("in.zip");
    fs::write(&input, "not really a zip").unwrap();
    let out_dir = stub_dir.path().join("restore-here");

    subpack()
        .arg("unpack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg(&input)
        .arg("-o")
        .arg(&out_dir)
        .arg("-p")
        .arg("pw")
        .assert()
        .success();

    let args = recorded_args(stub_dir.path());
    assert_eq!(&args[..3], &["x", "-tzip", "-y"]);
    assert_eq!(args[3], format!("-o{}", out_dir.display()));
    assert_eq!(args[4], "-ppw");
    assert_eq!(args[5], input.display().to_string());
}

#[cfg(unix)]
#[test]
fn test_unpack_defaults_to_data_dir() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);
    let input = stub_dir.path().join("in.zip");
    fs::write(&input, "zip").unwrap();

    subpack()
        .arg("unpack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg(&input)
        .assert()
        .success();

    let args = recorded_args(stub_dir.path());
    assert_eq!(args[3], format!("-o{}", data.path().display()));
}

#[cfg(unix)]
#[test]
fn test_unpack_missing_archive_fails() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);

    subpack()
        .arg("unpack")
        .arg("-d")
        .arg(data.path())
        .arg("--sevenzip")
        .arg(&stub)
        .arg(stub_dir.path().join("missing.zip"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("not found"));

    // The archiver was never invoked
    assert!(!stub_dir.path().join("argv.log").exists());
}

#[cfg(unix)]
#[test]
fn test_sevenzip_env_var_override() {
    let data = setup_data_dir();
    let stub_dir = tempdir().unwrap();
    let stub = write_stub_archiver(stub_dir.path(), 0);

    subpack()
        .env("SUBPACK_7Z", &stub)
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .arg("-o")
        .arg(stub_dir.path().join("out.zip"))
        .assert()
        .success();

    let args = recorded_args(stub_dir.path());
    assert_eq!(args[0], "a");
}

#[test]
fn test_missing_archiver_binary_fails() {
    let data = setup_data_dir();

    subpack()
        .env("PATH", "")
        .arg("pack")
        .arg("-d")
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("7-Zip"));
}

#[test]
fn test_backup_restore_clean_roundtrip() {
    let data = setup_data_dir();
    let prefs = data.path().join("Packages/User/Preferences.sublime-settings");
    fs::write(&prefs, "{\"theme\": \"original\"}").unwrap();
    fs::write(
        data.path().join("Installed Packages/Pkg.sublime-package"),
        "pk",
    )
    .unwrap();

    subpack()
        .arg("backup")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success();

    let packages_bak = data.path().join("Packages.bak");
    let installed_bak = data.path().join("Installed Packages.bak");
    assert!(packages_bak.join("User/Preferences.sublime-settings").exists());
    assert!(installed_bak.join("Pkg.sublime-package").exists());

    // Break the live settings, then roll back
    fs::write(&prefs, "broken").unwrap();

    subpack()
        .arg("restore")
        .arg("-y")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&prefs).unwrap(),
        "{\"theme\": \"original\"}"
    );
    assert!(!packages_bak.exists());
    assert!(!installed_bak.exists());

    // Back up again, then clean both backups away
    subpack()
        .arg("backup")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success();
    assert!(packages_bak.exists());

    subpack()
        .arg("clean")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success();
    assert!(!packages_bak.exists());
    assert!(!installed_bak.exists());
}

#[test]
fn test_backup_does_not_overwrite_existing_backup() {
    let data = setup_data_dir();
    fs::write(data.path().join("Packages/User/keep.txt"), "new").unwrap();
    fs::create_dir_all(data.path().join("Packages.bak")).unwrap();
    fs::write(data.path().join("Packages.bak/old.txt"), "old").unwrap();

    // An existing Packages.bak is removed first, so the fresh copy wins
    subpack()
        .arg("backup")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success();

    assert!(data.path().join("Packages.bak/User/keep.txt").exists());
    assert!(!data.path().join("Packages.bak/old.txt").exists());
}

#[test]
fn test_restore_without_backups_is_a_no_op() {
    let data = setup_data_dir();
    fs::write(data.path().join("Packages/User/keep.txt"), "live").unwrap();

    subpack()
        .arg("restore")
        .arg("-y")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(data.path().join("Packages/User/keep.txt")).unwrap(),
        "live"
    );
}

#[test]
fn test_paths_prints_resolved_directories() {
    let data = setup_data_dir();

    subpack()
        .arg("paths")
        .arg("-d")
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicates::str::contains(
            data.path().join("Packages").display().to_string(),
        ))
        .stdout(predicates::str::contains(".bak"));
}

#[test]
fn test_data_dir_env_var_override() {
    let data = setup_data_dir();

    subpack()
        .env("SUBPACK_DATA_DIR", data.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicates::str::contains(data.path().display().to_string()));
}
