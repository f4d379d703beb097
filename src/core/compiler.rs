//! The ambient compiler collaborator.
//!
//! pkgprobe does not implement compilers; it consults one for two narrow
//! services needed during detection. Build systems hand an implementation to
//! [`Environment::with_compiler`](crate::config::Environment::with_compiler).

use std::path::Path;

/// Narrow interface onto the consuming build system's compiler.
pub trait Compiler {
    /// Probes the compiler's own library search path for `name`.
    ///
    /// Returns the link arguments on success, `None` when the compiler cannot
    /// find the library. This is the most reliable signal available and
    /// detectors consult it before synthesizing link flags manually.
    fn find_library(&self, name: &str) -> Option<Vec<String>>;

    /// Arguments that add `dir` to the include search path.
    ///
    /// `system` requests system-header treatment (e.g. `-isystem` instead of
    /// `-I`) so warnings in third-party headers do not fail strict builds.
    fn include_args(&self, dir: &Path, system: bool) -> Vec<String>;
}
