//! Cross-file input and the probing environment.
//!
//! Probing needs a small bundle of ambient facts: whether this is a cross
//! build (and which binaries the cross file declares), which CPU family the
//! build targets, the compiler collaborator, and the shared pkg-config
//! locator. [`Environment`] carries that bundle; callers construct one per
//! build invocation and pass it to every lookup.
//!
//! # Cross Files
//!
//! A cross file is a TOML document; pkgprobe consumes only its `[binaries]`
//! table, which maps logical tool roles to binary names:
//!
//! ```toml
//! [binaries]
//! pkg-config = "aarch64-linux-gnu-pkg-config"
//! c = "aarch64-linux-gnu-gcc"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pkgprobe::config::{CrossConfig, Environment};
//!
//! # fn main() -> pkgprobe::core::Result<()> {
//! let cross = CrossConfig::load(Path::new("aarch64.toml"))?;
//! let env = Environment::new().with_cross(cross);
//! assert!(env.is_cross_build());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::core::compiler::Compiler;
use crate::core::error::{ProbeError, Result};
use crate::pkgconfig::PkgConfigLocator;
use crate::utils::platform;

/// Tool role under which a cross file declares its pkg-config binary.
pub const PKG_CONFIG_ROLE: &str = "pkg-config";

/// The subset of a cross-compilation file that probing consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossConfig {
    /// Logical tool role to binary name.
    #[serde(default)]
    pub binaries: BTreeMap<String, String>,
}

impl CrossConfig {
    /// Loads a cross file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::FileSystem`] when the file cannot be read and
    /// [`ProbeError::Config`] when it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ProbeError::FileSystem {
            operation: "read cross file".to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|err| ProbeError::Config {
            message: format!("invalid cross file {}: {err}", path.display()),
        })
    }

    /// The binary declared for a logical tool role, if any.
    #[must_use]
    pub fn binary(&self, role: &str) -> Option<&str> {
        self.binaries.get(role).map(String::as_str)
    }
}

/// The ambient context a lookup runs in.
///
/// Owns the process-scoped pkg-config locator, so keeping one `Environment`
/// alive for the whole build gives every native lookup the memoized tool path.
/// Lookups borrow the environment immutably; pkgprobe never mutates it beyond
/// the locator's one-time initialization.
pub struct Environment {
    cross: Option<CrossConfig>,
    cpu_family: String,
    compiler: Option<Box<dyn Compiler>>,
    pkg_config: PkgConfigLocator,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A native environment for the running host, with no compiler attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cross: None,
            cpu_family: platform::cpu_family().to_string(),
            compiler: None,
            pkg_config: PkgConfigLocator::new(),
        }
    }

    /// Attaches a cross file, turning this into a cross-build environment.
    #[must_use]
    pub fn with_cross(mut self, cross: CrossConfig) -> Self {
        self.cross = Some(cross);
        self
    }

    /// Attaches the compiler collaborator consulted by detectors.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Box<dyn Compiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Overrides the detected CPU family (used for cross builds and tests).
    #[must_use]
    pub fn with_cpu_family(mut self, family: &str) -> Self {
        self.cpu_family = family.to_string();
        self
    }

    /// Replaces the pkg-config locator, e.g. with a preseeded one.
    #[must_use]
    pub fn with_pkg_config(mut self, locator: PkgConfigLocator) -> Self {
        self.pkg_config = locator;
        self
    }

    /// Whether a cross file is attached.
    #[must_use]
    pub fn is_cross_build(&self) -> bool {
        self.cross.is_some()
    }

    /// The attached cross file, if any.
    #[must_use]
    pub fn cross(&self) -> Option<&CrossConfig> {
        self.cross.as_ref()
    }

    /// The CPU family lookups should validate architectures against.
    #[must_use]
    pub fn cpu_family(&self) -> &str {
        &self.cpu_family
    }

    /// The compiler collaborator, if one was attached.
    #[must_use]
    pub fn compiler(&self) -> Option<&dyn Compiler> {
        self.compiler.as_deref()
    }

    /// The shared pkg-config locator.
    #[must_use]
    pub fn pkg_config(&self) -> &PkgConfigLocator {
        &self.pkg_config
    }

    /// Whether a lookup should use the cross toolchain.
    ///
    /// On a cross build, `native: Some(true)` selects the native tools anyway;
    /// on a native build the flag is ignored.
    #[must_use]
    pub fn want_cross(&self, native: Option<bool>) -> bool {
        match native {
            Some(native) if self.is_cross_build() => !native,
            _ => self.is_cross_build(),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("cross", &self.cross)
            .field("cpu_family", &self.cpu_family)
            .field("has_compiler", &self.compiler.is_some())
            .finish_non_exhaustive()
    }
}
