//! Dependency resolution orchestration and identity keys.
//!
//! [`find_external`] is the single entry point for lookups. Its strategy chain
//! is deliberate:
//!
//! 1. A name registered in the specialized-detector registry dispatches there,
//!    propagating that detector's own fatal/non-fatal policy.
//! 2. Everything else goes through the pkg-config probe; success wins.
//! 3. On macOS the framework directory scan is the fallback; a required
//!    dependency still missing afterwards fails citing both the framework
//!    attempt and the original pkg-config diagnostic.
//! 4. Off macOS a fatal pkg-config error is re-raised untouched - unlike the
//!    Python detector, which swallows pkg-config errors before its own
//!    fallbacks. The asymmetry decides which diagnostic a user ultimately
//!    sees and is preserved on purpose.
//!
//! [`DependencyKey`] is the caching surface: a pure function of the lookup
//! inputs that affect identity. Callers memoize records in a map keyed by it;
//! pkgprobe itself performs no lookup caching.

use std::collections::BTreeSet;

use crate::config::Environment;
use crate::core::dependency::{Dependency, DependencyOptions, Detector, DetectionMethod};
use crate::core::error::{ProbeError, Result};
use crate::detectors::{DetectorKind, ExtraFramework};
use crate::pkgconfig::PkgConfig;
use crate::utils::platform;

/// Uniquely identifies a dependency lookup for caching purposes.
///
/// Two lookups with equal keys are the same logical dependency: equal name,
/// version-requirement set, cross selection, and the remaining
/// identity-relevant options. `required` is excluded because it only affects
/// failure behavior; `native` is folded into the resolved cross flag.
/// List-valued options are stored as sets, so input ordering never changes the
/// key.
///
/// # Examples
///
/// ```rust
/// use pkgprobe::config::Environment;
/// use pkgprobe::core::DependencyOptions;
/// use pkgprobe::resolver::DependencyKey;
///
/// let env = Environment::new();
/// let a = DependencyKey::new(
///     "boost",
///     &env,
///     &DependencyOptions::new().modules(["thread", "system"]),
/// );
/// let b = DependencyKey::new(
///     "boost",
///     &env,
///     &DependencyOptions::new().modules(["system", "thread"]).optional(),
/// );
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey {
    name: String,
    versions: BTreeSet<String>,
    want_cross: bool,
    static_link: bool,
    modules: BTreeSet<String>,
    method: DetectionMethod,
}

impl DependencyKey {
    /// Builds the identity key for a lookup. Pure: equal inputs always yield
    /// equal keys.
    #[must_use]
    pub fn new(name: &str, env: &Environment, options: &DependencyOptions) -> Self {
        Self {
            name: name.to_string(),
            versions: options.versions.iter().cloned().collect(),
            want_cross: env.want_cross(options.native),
            static_link: options.static_link,
            modules: options.modules.iter().cloned().collect(),
            method: options.method,
        }
    }
}

/// Locates an external dependency by name.
///
/// Returns the immutable record of the lookup. A required dependency that
/// cannot be found is an error; an optional one yields a well-formed
/// not-found record with empty flag lists.
///
/// # Errors
///
/// - [`ProbeError::DependencyNotFound`] / [`ProbeError::FallbackExhausted`] /
///   [`ProbeError::VersionMismatch`] when the lookup is required
/// - [`ProbeError::Config`] / [`ProbeError::UnsupportedMethod`] /
///   [`ProbeError::ModuleNotFound`] for invalid lookups, regardless of
///   required
/// - [`ProbeError::ToolMalfunction`] when a located tool misbehaves,
///   regardless of required
pub fn find_external(
    name: &str,
    env: &Environment,
    options: &DependencyOptions,
) -> Result<Dependency> {
    if let Some(kind) = DetectorKind::for_name(name) {
        let dep = kind.detect(env, options)?;
        if options.required && !dep.found() {
            return Err(ProbeError::DependencyNotFound {
                name: name.to_string(),
            });
        }
        return Ok(dep);
    }

    let mut pkg_error: Option<ProbeError> = None;
    let pkg_record = match PkgConfig::probe(name, env, options) {
        Ok(pkg) => {
            let record = Dependency::from_detector(&pkg);
            if record.found() {
                return Ok(record);
            }
            Some(record)
        }
        Err(err) => {
            pkg_error = Some(err);
            None
        }
    };

    if platform::is_macos() {
        let framework = ExtraFramework::detect(name, None, options)?;
        if options.required && !framework.found() {
            return Err(ProbeError::FallbackExhausted {
                name: name.to_string(),
                pkg_config_error: pkg_error
                    .map(|err| err.to_string())
                    .unwrap_or_default(),
            });
        }
        return Ok(Dependency::from_detector(&framework));
    }

    if let Some(err) = pkg_error {
        return Err(err);
    }
    tracing::debug!("Dependency '{name}' found: NO");
    Ok(pkg_record
        .unwrap_or_else(|| Dependency::not_found(name, DetectionMethod::PkgConfig)))
}
