//! Platform-specific conventions and cross-platform compatibility helpers
//!
//! Detection heuristics depend on a handful of platform facts: which files
//! count as directly executable, what shared libraries are called, where
//! libraries and framework bundles conventionally live, and which CPU family
//! the build targets. This module centralizes those facts so the detectors can
//! branch on behavior rather than on `cfg` soup.

use std::path::{Path, PathBuf};

/// File extensions Windows considers directly executable.
///
/// Anything else found on Windows (a shebang script, say) needs an explicit
/// interpreter on the command line.
pub const WINDOWS_EXECUTABLE_EXTENSIONS: [&str; 4] = ["exe", "msc", "com", "bat"];

/// Conventional root for framework bundles on macOS.
pub const DEFAULT_FRAMEWORK_DIR: &str = "/Library/Frameworks";

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Checks if the current platform is macOS.
#[must_use]
pub const fn is_macos() -> bool {
    cfg!(target_os = "macos")
}

/// The CPU family of the running toolchain, normalized the way detectors
/// compare it (`x86`, `x86_64`, `aarch64`, ...).
#[must_use]
pub fn cpu_family() -> &'static str {
    match std::env::consts::ARCH {
        "x86" | "i686" => "x86",
        other => other,
    }
}

/// Filename suffix of shared libraries on the current platform.
#[must_use]
pub const fn shared_library_suffix() -> &'static str {
    if is_macos() { "dylib" } else { "so" }
}

/// Conventional system library directories searched when no explicit library
/// directory is configured.
#[must_use]
pub fn library_dirs() -> Vec<PathBuf> {
    let dirs: &[&str] = if is_windows() {
        &["C:\\mingw\\lib", "C:\\mingw64\\lib"]
    } else {
        &[
            "/usr/local/lib",
            "/usr/local/lib64",
            "/usr/lib",
            "/usr/lib64",
        ]
    };
    dirs.iter().map(PathBuf::from).collect()
}

/// Whether `path` names a file the current platform can execute directly.
///
/// On Windows this is an extension check; Unix-like platforms consult the
/// execute permission bits. Directories are never executable in this sense.
#[cfg(unix)]
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether `path` names a file the current platform can execute directly.
///
/// On Windows this is an extension check; Unix-like platforms consult the
/// execute permission bits. Directories are never executable in this sense.
#[cfg(not(unix))]
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    has_executable_extension(path) && path.is_file()
}

/// Whether the path carries one of the recognized Windows executable
/// extensions.
#[must_use]
pub fn has_executable_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        WINDOWS_EXECUTABLE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}
