//! End-to-end coverage of the resolution chain and the caching surface.

use std::collections::HashMap;

use pkgprobe::core::{Dependency, DependencyOptions, DetectionMethod, ProbeError};
use pkgprobe::resolver::{DependencyKey, find_external};
use tempfile::TempDir;

use crate::common::{env_with_fake_pkg_config, init_test_logging, write_fake_pkg_config};

#[test]
fn test_resolves_through_pkg_config() -> anyhow::Result<()> {
    init_test_logging();
    let temp = TempDir::new()?;
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let dep = find_external("foo", &env, &DependencyOptions::new())?;
    assert!(dep.found());
    assert_eq!(dep.version(), Some("2.1.0"));
    assert_eq!(dep.method(), DetectionMethod::PkgConfig);
    assert_eq!(dep.compile_args(), ["-I/opt/foo/include", "-DFOO"]);
    assert_eq!(dep.link_args(), ["-L/opt/foo/lib", "-lfoo"]);
    Ok(())
}

#[cfg(not(target_os = "macos"))]
#[test]
fn test_optional_missing_dependency_yields_empty_record() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let dep = find_external(
        "no-such-package",
        &env,
        &DependencyOptions::new().optional(),
    )
    .unwrap();
    assert!(!dep.found());
    assert_eq!(dep.version(), None);
    assert!(dep.compile_args().is_empty());
    assert!(dep.link_args().is_empty());
    assert!(dep.sources().is_empty());
}

#[cfg(not(target_os = "macos"))]
#[test]
fn test_required_missing_dependency_is_fatal() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let err = find_external("no-such-package", &env, &DependencyOptions::new()).unwrap_err();
    assert!(matches!(err, ProbeError::DependencyNotFound { .. }));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn test_required_version_mismatch_propagates() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let err = find_external(
        "foo",
        &env,
        &DependencyOptions::new().version(">=3.0"),
    )
    .unwrap_err();
    assert!(matches!(err, ProbeError::VersionMismatch { .. }));
}

#[test]
fn test_threads_end_to_end() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let dep = find_external("threads", &env, &DependencyOptions::new()).unwrap();
    assert!(dep.found());
    assert!(dep.need_threads());
    assert!(dep.compile_args().is_empty());
    assert!(dep.link_args().is_empty());
}

#[test]
fn test_records_memoize_by_identity_key() {
    let temp = TempDir::new().unwrap();
    let script = write_fake_pkg_config(temp.path(), "");
    let env = env_with_fake_pkg_config(&script);

    let mut cache: HashMap<DependencyKey, Dependency> = HashMap::new();

    let opts_a = DependencyOptions::new().versions([">=2.0", "<3"]);
    let key_a = DependencyKey::new("foo", &env, &opts_a);
    let dep = find_external("foo", &env, &opts_a).unwrap();
    cache.insert(key_a, dep);

    // Same logical lookup, different requirement order and lifecycle options:
    // the cache must hit without probing again.
    let opts_b = DependencyOptions::new().versions(["<3", ">=2.0"]).optional();
    let key_b = DependencyKey::new("foo", &env, &opts_b);
    let cached = cache.get(&key_b).expect("identity key should match");
    assert!(cached.found());
    assert_eq!(cached.version(), Some("2.1.0"));

    // A different constraint set is a different logical dependency.
    let opts_c = DependencyOptions::new().version(">=2.5");
    assert!(!cache.contains_key(&DependencyKey::new("foo", &env, &opts_c)));
}
