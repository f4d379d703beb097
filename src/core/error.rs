//! Error handling for pkgprobe
//!
//! Every failure in the probing engine maps onto one of four categories, and the
//! category decides whether a lookup can degrade gracefully:
//!
//! 1. **Configuration errors** - invalid option combinations such as an
//!    unsupported explicit detection method or a missing required module.
//!    Always fatal, raised at detector construction.
//! 2. **Not-found** - a dependency or tool is absent from the system. Fatal only
//!    when the lookup was marked required; otherwise the lookup yields a
//!    well-formed not-found record.
//! 3. **Tool malfunction** - a located tool exits non-zero on a query expected
//!    to succeed once existence is confirmed (`--cflags`, `--libs`,
//!    `--variable=`). Always fatal regardless of required, since it signals a
//!    broken installation rather than absence.
//! 4. **Version mismatch** - the candidate exists but fails its constraints.
//!    Fatal iff required, otherwise not-found with the unmet and met requirement
//!    sets reported.
//!
//! There are no retries and no partial recovery: a failed probe either degrades
//! to not-found or propagates a single [`ProbeError`] carrying a human-readable
//! message.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// The error type for all dependency probing operations.
///
/// Variants are grouped by the categories described in the module
/// documentation. Match on the variant to distinguish a broken installation
/// ([`ToolMalfunction`](Self::ToolMalfunction)) from plain absence
/// ([`DependencyNotFound`](Self::DependencyNotFound)); only the latter is
/// suppressed for optional lookups.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Invalid option value or combination supplied by the caller.
    ///
    /// Raised at detector construction, before any external probing happens.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// An explicitly requested detection method is not applicable to the
    /// dependency, with the allowed set named in the message.
    #[error(
        "Unsupported detection method '{requested}' for dependency '{name}', allowed methods are: {allowed}"
    )]
    UnsupportedMethod {
        /// The dependency whose lookup was misconfigured
        name: String,
        /// The method that was requested
        requested: String,
        /// Comma-separated list of methods the dependency supports
        allowed: String,
    },

    /// A required dependency could not be located by any attempted strategy.
    #[error("Dependency '{name}' not found")]
    DependencyNotFound {
        /// Logical name of the missing dependency
        name: String,
    },

    /// Both the framework scan and the earlier pkg-config attempt failed for a
    /// required dependency; the original pkg-config diagnostic is preserved.
    #[error("Dependency '{name}' not found, tried framework lookup and pkg-config:\n\n{pkg_config_error}")]
    FallbackExhausted {
        /// Logical name of the missing dependency
        name: String,
        /// Rendered error from the pkg-config attempt, empty if it merely
        /// reported not-found
        pkg_config_error: String,
    },

    /// A required external tool is missing from the system.
    #[error("Tool '{tool}' not found")]
    ToolNotFound {
        /// Name of the missing tool
        tool: String,
    },

    /// The cross file does not declare a binary for a tool role needed by a
    /// required cross lookup.
    #[error("Binary for '{role}' missing from cross file")]
    CrossBinaryMissing {
        /// Logical tool role (e.g. `pkg-config`)
        role: String,
    },

    /// The dependency exists but its version fails the supplied constraints.
    #[error("Invalid version of dependency '{name}': need {unmet:?}, found '{found}'")]
    VersionMismatch {
        /// Logical name of the dependency
        name: String,
        /// The version that was actually discovered
        found: String,
        /// Requirements that did not hold
        unmet: Vec<String>,
        /// Requirements that held despite the overall mismatch
        met: Vec<String>,
    },

    /// A located tool failed a query that must succeed once existence is
    /// confirmed, indicating a broken installation.
    #[error("'{tool}' failed on '{query}' query for '{name}':\n\n{output}")]
    ToolMalfunction {
        /// The tool that misbehaved
        tool: String,
        /// The query that failed (e.g. `--cflags`)
        query: String,
        /// The dependency being probed
        name: String,
        /// Output captured from the failing invocation
        output: String,
    },

    /// A requested library module does not exist among the discovered source
    /// modules.
    #[error("Requested {library} module '{module}' not found")]
    ModuleNotFound {
        /// The library whose module set was searched
        library: String,
        /// The module that is missing
        module: String,
    },

    /// A libtool archive descriptor could not be resolved to its shared
    /// library.
    #[error("Could not compute the shared library path for libtool archive '{path}'")]
    LibtoolArchive {
        /// Path to the `.la` descriptor
        path: PathBuf,
    },

    /// An underlying filesystem or subprocess operation failed.
    #[error("File system error during {operation}: {path}")]
    FileSystem {
        /// The operation that failed
        operation: String,
        /// Path involved in the failure
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Whether an optional lookup may swallow this error and degrade to a
    /// not-found record.
    ///
    /// Only plain absence qualifies; configuration errors and tool
    /// malfunctions stay fatal no matter how the lookup was marked.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Self::DependencyNotFound { .. }
                | Self::ToolNotFound { .. }
                | Self::VersionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_mismatch_message_names_requirements() {
        let err = ProbeError::VersionMismatch {
            name: "glib-2.0".to_string(),
            found: "2.48.0".to_string(),
            unmet: vec![">=2.50".to_string()],
            met: vec![">=2.0".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("glib-2.0"));
        assert!(message.contains(">=2.50"));
        assert!(message.contains("2.48.0"));
    }

    #[test]
    fn test_absence_classification() {
        assert!(
            ProbeError::DependencyNotFound {
                name: "zlib".to_string()
            }
            .is_absence()
        );
        assert!(
            !ProbeError::ToolMalfunction {
                tool: "pkg-config".to_string(),
                query: "--cflags".to_string(),
                name: "zlib".to_string(),
                output: String::new(),
            }
            .is_absence()
        );
        assert!(
            !ProbeError::Config {
                message: "bad".to_string()
            }
            .is_absence()
        );
    }
}
