//! End-to-end coverage of the pkg-config query protocol.

use std::fs;

use pkgprobe::core::{DependencyOptions, Detector, ProbeError};
use pkgprobe::pkgconfig::PkgConfig;
use serial_test::serial;
use tempfile::TempDir;

use crate::common::{env_with_fake_pkg_config, init_test_logging, write_fake_pkg_config};

#[test]
fn test_probe_reports_version_and_flags() -> anyhow::Result<()> {
    init_test_logging();
    let temp = TempDir::new()?;
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let probe = PkgConfig::probe("foo", &env, &DependencyOptions::new())?;
    assert!(probe.found());
    assert_eq!(probe.version(), Some("2.1.0".to_string()));
    assert_eq!(probe.compile_args(), ["-I/opt/foo/include", "-DFOO"]);
    assert_eq!(probe.link_args(), ["-L/opt/foo/lib", "-lfoo"]);
    assert!(!probe.is_libtool());
    Ok(())
}

#[test]
fn test_probe_static_link_switch() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let probe =
        PkgConfig::probe("foo", &env, &DependencyOptions::new().static_link()).unwrap();
    assert_eq!(probe.link_args(), ["-L/opt/foo/lib", "-lfoo", "-lm"]);
}

#[test]
fn test_probe_satisfied_version_requirement() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let probe = PkgConfig::probe(
        "foo",
        &env,
        &DependencyOptions::new().version(">=2.0"),
    )
    .unwrap();
    assert!(probe.found());
    assert_eq!(probe.version(), Some("2.1.0".to_string()));
}

#[test]
fn test_probe_version_mismatch_degrades_when_optional() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let probe = PkgConfig::probe(
        "foo",
        &env,
        &DependencyOptions::new()
            .optional()
            .versions([">=2.0", ">=3.0"]),
    )
    .unwrap();
    assert!(!probe.found());
    assert!(probe.compile_args().is_empty());
    assert!(probe.link_args().is_empty());
    assert_eq!(probe.unmet_requirements(), [">=3.0"]);
    assert_eq!(probe.met_requirements(), [">=2.0"]);
}

#[test]
fn test_probe_version_mismatch_is_fatal_when_required() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let err = PkgConfig::probe(
        "foo",
        &env,
        &DependencyOptions::new().version(">=3.0"),
    )
    .unwrap_err();
    match err {
        ProbeError::VersionMismatch {
            name,
            found,
            unmet,
            met,
        } => {
            assert_eq!(name, "foo");
            assert_eq!(found, "2.1.0");
            assert_eq!(unmet, [">=3.0"]);
            assert!(met.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_probe_missing_package_policy() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let probe = PkgConfig::probe(
        "no-such-package",
        &env,
        &DependencyOptions::new().optional(),
    )
    .unwrap();
    assert!(!probe.found());
    assert!(probe.compile_args().is_empty());

    let err =
        PkgConfig::probe("no-such-package", &env, &DependencyOptions::new()).unwrap_err();
    assert!(matches!(err, ProbeError::DependencyNotFound { .. }));
}

#[test]
fn test_broken_metadata_is_fatal_even_when_optional() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    // --modversion succeeds, --cflags fails: a broken installation, not
    // absence, so the optional flag does not soften it.
    let err = PkgConfig::probe(
        "brokenpkg",
        &env,
        &DependencyOptions::new().optional(),
    )
    .unwrap_err();
    match err {
        ProbeError::ToolMalfunction { query, name, .. } => {
            assert_eq!(query, "--cflags");
            assert_eq!(name, "brokenpkg");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_libtool_token_is_unwrapped_to_shared_library() {
    let temp = TempDir::new().unwrap();
    let la_path = temp.path().join("libbar.la");
    fs::write(&la_path, "dlname='libbar.so.2'\n").unwrap();
    let staging = temp.path().join(".libs");
    fs::create_dir(&staging).unwrap();
    fs::write(staging.join("libbar.so.2"), "").unwrap();

    let script = write_fake_pkg_config(temp.path(), la_path.to_string_lossy().as_ref());
    let env = env_with_fake_pkg_config(&script);

    let probe = PkgConfig::probe("libbar", &env, &DependencyOptions::new()).unwrap();
    assert!(probe.found());
    assert!(probe.is_libtool());
    assert_eq!(
        probe.link_args(),
        [staging.join("libbar.so.2").to_string_lossy().into_owned()]
    );
}

#[test]
fn test_unresolvable_libtool_token_is_fatal() {
    let temp = TempDir::new().unwrap();
    let la_path = temp.path().join("libbar.la");
    fs::write(&la_path, "dlname='libbar.so.2'\n").unwrap();
    // No shared library anywhere near the descriptor.

    let script = write_fake_pkg_config(temp.path(), la_path.to_string_lossy().as_ref());
    let env = env_with_fake_pkg_config(&script);

    let err = PkgConfig::probe("libbar", &env, &DependencyOptions::new()).unwrap_err();
    assert!(matches!(err, ProbeError::LibtoolArchive { .. }));
}

#[test]
fn test_variable_query() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let probe = PkgConfig::probe("foo", &env, &DependencyOptions::new()).unwrap();
    assert_eq!(probe.variable("prefix").unwrap(), "/opt/foo");

    let err = probe.variable("no-such-variable").unwrap_err();
    assert!(matches!(err, ProbeError::ToolMalfunction { .. }));
}

#[test]
#[serial]
fn test_tool_resolution_honors_environment_override() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");

    // A fresh environment resolves the tool through the PKG_CONFIG override.
    unsafe { std::env::set_var("PKG_CONFIG", &script) };
    let env = pkgprobe::config::Environment::new();
    let probe = PkgConfig::probe("foo", &env, &DependencyOptions::new());
    unsafe { std::env::remove_var("PKG_CONFIG") };

    let probe = probe.unwrap();
    assert!(probe.found());
    assert_eq!(probe.version(), Some("2.1.0".to_string()));
}
