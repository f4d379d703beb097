//! Shared helpers for integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;

use pkgprobe::config::Environment;
use pkgprobe::pkgconfig::PkgConfigLocator;

static INIT_LOGGING: Once = Once::new();

/// Initializes test logging once per process; `RUST_LOG` controls verbosity.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Shell script emulating a pkg-config installation with three packages:
///
/// - `foo` 2.1.0 with ordinary flags (static linking adds `-lm`)
/// - `libbar` 1.0 whose `--libs` output is a libtool archive token
/// - `brokenpkg` 3.3 whose metadata is damaged: `--modversion` succeeds but
///   `--cflags` exits non-zero
const FAKE_PKG_CONFIG: &str = r#"#!/bin/sh
cmd="$1"
shift
case "$cmd" in
    --version)
        echo "0.29.2"
        ;;
    --modversion)
        case "$1" in
            foo) echo "2.1.0" ;;
            libbar) echo "1.0" ;;
            brokenpkg) echo "3.3" ;;
            *) echo "Package $1 was not found" >&2; exit 1 ;;
        esac
        ;;
    --cflags)
        case "$1" in
            foo) echo "-I/opt/foo/include -DFOO" ;;
            libbar) echo "-I/opt/bar/include" ;;
            brokenpkg) echo "metadata file is damaged" >&2; exit 1 ;;
            *) exit 1 ;;
        esac
        ;;
    --libs)
        static=""
        if [ "$1" = "--static" ]; then
            static=1
            shift
        fi
        case "$1" in
            foo)
                if [ -n "$static" ]; then
                    echo "-L/opt/foo/lib -lfoo -lm"
                else
                    echo "-L/opt/foo/lib -lfoo"
                fi
                ;;
            libbar) echo "@LA_TOKEN@" ;;
            *) exit 1 ;;
        esac
        ;;
    --variable=prefix)
        echo "/opt/foo"
        ;;
    --variable=*)
        exit 1
        ;;
    *)
        exit 2
        ;;
esac
"#;

/// Writes the fake pkg-config script into `dir` and returns its path.
///
/// `la_token` replaces the `@LA_TOKEN@` placeholder in the `libbar` libs
/// output; tests that never query `libbar` can pass an empty string.
pub fn write_fake_pkg_config(dir: &Path, la_token: &str) -> PathBuf {
    let script = dir.join("pkg-config");
    fs::write(&script, FAKE_PKG_CONFIG.replace("@LA_TOKEN@", la_token)).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// An environment whose pkg-config locator is preseeded with the fake tool.
pub fn env_with_fake_pkg_config(script: &Path) -> Environment {
    Environment::new().with_pkg_config(PkgConfigLocator::with_command(vec![
        script.to_string_lossy().into_owned(),
    ]))
}
