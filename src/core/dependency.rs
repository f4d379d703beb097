//! Dependency records, lookup options, and the detector contract.
//!
//! Every discovery strategy in pkgprobe implements [`Detector`], the shared
//! capability set: report found/not-found, return compile flags, link flags,
//! extra sources, whether native threading support is implied, and which
//! detection method actually produced the result. The resolver converts any
//! detector into an immutable [`Dependency`] record via
//! [`Dependency::from_detector`], which enforces the core invariant: a
//! not-found record carries empty flag and source lists, and a found record
//! always reports a version (`"unknown"` permitted).
//!
//! [`DetectionMethod`] is a closed set. A dependency declares the subset it
//! supports; [`DetectionMethod::resolve`] validates an explicitly requested
//! method against that subset at construction time and expands
//! [`Auto`](DetectionMethod::Auto) to the full applicable subset in priority
//! order.

use std::fmt;
use std::path::PathBuf;

use crate::core::error::{ProbeError, Result};

/// The closed set of mechanisms a dependency can be detected with.
///
/// A dependency's applicable methods are a statically declared subset of this
/// set. [`Auto`](Self::Auto) means "use whatever applicable mechanism works, in
/// priority order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetectionMethod {
    /// Try every applicable method in priority order.
    Auto,
    /// Query an installed pkg-config metadata file.
    PkgConfig,
    /// Ask a build tool (e.g. qmake) for its own modules.
    BuildToolQuery,
    /// Emit the standard link arguments, assuming the operating system
    /// provides the library.
    SystemLink,
    /// Run the library's own `*-config` helper script.
    ConfigScript,
    /// Introspect an interpreter's build configuration.
    InterpreterConfig,
    /// Search the platform's framework bundle directories by name.
    Framework,
}

impl DetectionMethod {
    /// Stable textual name, as accepted in user-facing configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::PkgConfig => "pkg-config",
            Self::BuildToolQuery => "build-tool",
            Self::SystemLink => "system",
            Self::ConfigScript => "config-script",
            Self::InterpreterConfig => "interpreter-config",
            Self::Framework => "framework",
        }
    }

    /// Validates a requested method against a dependency's applicable subset.
    ///
    /// `allowed` lists the explicit methods the dependency supports, in
    /// priority order; [`Auto`](Self::Auto) is always acceptable and expands to
    /// that full subset. Requesting anything else fails with
    /// [`ProbeError::UnsupportedMethod`] naming the allowed methods.
    pub fn resolve(name: &str, requested: Self, allowed: &[Self]) -> Result<Vec<Self>> {
        if requested == Self::Auto {
            return Ok(allowed.to_vec());
        }
        if allowed.contains(&requested) {
            return Ok(vec![requested]);
        }
        let mut names = vec![Self::Auto.as_str()];
        names.extend(allowed.iter().map(|method| method.as_str()));
        Err(ProbeError::UnsupportedMethod {
            name: name.to_string(),
            requested: requested.as_str().to_string(),
            allowed: names.join(", "),
        })
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling a single dependency lookup.
///
/// `required` and `native` affect failure behavior and cross/native tool
/// selection but not dependency identity; the remaining options participate in
/// the identity key (see [`resolver::DependencyKey`](crate::resolver::DependencyKey)).
///
/// # Examples
///
/// ```rust
/// use pkgprobe::core::{DependencyOptions, DetectionMethod};
///
/// let opts = DependencyOptions::new()
///     .optional()
///     .version(">=2.50")
///     .version("<3.0")
///     .method(DetectionMethod::PkgConfig);
/// assert!(!opts.required);
/// assert_eq!(opts.versions.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyOptions {
    /// Whether absence of the dependency is fatal. Defaults to `true`.
    pub required: bool,
    /// Request static linking flags where the strategy supports it.
    pub static_link: bool,
    /// Version requirements, all of which must hold.
    pub versions: Vec<String>,
    /// Library modules to request from modular dependencies.
    pub modules: Vec<String>,
    /// Force native (`Some(true)`) or cross (`Some(false)`) tool selection on
    /// a cross build. `None` follows the environment.
    pub native: Option<bool>,
    /// Explicitly requested detection method.
    pub method: DetectionMethod,
}

impl Default for DependencyOptions {
    fn default() -> Self {
        Self {
            required: true,
            static_link: false,
            versions: Vec::new(),
            modules: Vec::new(),
            native: None,
            method: DetectionMethod::Auto,
        }
    }
}

impl DependencyOptions {
    /// Default options: required, dynamic linking, automatic method.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the lookup optional: absence yields a not-found record instead of
    /// an error.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Adds a version requirement (e.g. `">=2.50"`; a bare version means `=`).
    #[must_use]
    pub fn version(mut self, requirement: &str) -> Self {
        self.versions.push(requirement.to_string());
        self
    }

    /// Adds several version requirements at once.
    #[must_use]
    pub fn versions<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions.extend(requirements.into_iter().map(Into::into));
        self
    }

    /// Requests a library module from a modular dependency.
    #[must_use]
    pub fn module(mut self, name: &str) -> Self {
        self.modules.push(name.to_string());
        self
    }

    /// Requests several library modules at once.
    #[must_use]
    pub fn modules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.extend(names.into_iter().map(Into::into));
        self
    }

    /// Requests static linking flags.
    #[must_use]
    pub fn static_link(mut self) -> Self {
        self.static_link = true;
        self
    }

    /// Forces native or cross tool selection on a cross build.
    #[must_use]
    pub fn native(mut self, native: bool) -> Self {
        self.native = Some(native);
        self
    }

    /// Restricts the lookup to one explicit detection method.
    #[must_use]
    pub fn method(mut self, method: DetectionMethod) -> Self {
        self.method = method;
        self
    }
}

/// The capability set every discovery strategy implements.
///
/// Detectors are constructed (possibly fallibly, for configuration errors) and
/// then queried read-only. The resolver turns a detector into a [`Dependency`]
/// record; consumers never hold detectors directly.
pub trait Detector {
    /// Logical name of the dependency being detected.
    fn name(&self) -> &str;

    /// Whether the dependency was located.
    fn found(&self) -> bool;

    /// Resolved version string, if one was determined.
    fn version(&self) -> Option<String> {
        None
    }

    /// Compiler flags required to use the dependency.
    fn compile_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Linker flags required to use the dependency.
    fn link_args(&self) -> Vec<String> {
        Vec::new()
    }

    /// Source files that need to be compiled into the consumer.
    fn sources(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Whether using the dependency implies native threading flags downstream.
    fn need_threads(&self) -> bool {
        false
    }

    /// Toolchain language the dependency itself is written in, if foreign.
    fn language(&self) -> Option<&str> {
        None
    }

    /// The detection method that actually produced this result.
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Auto
    }
}

/// The immutable result of a dependency lookup.
///
/// Owned by the resolver that created it and shared read-only with whatever
/// build step consumes it. Construction goes through [`Self::from_detector`] or
/// [`Self::not_found`], both of which uphold the invariant that a not-found
/// record has empty flag and source lists and a found record always carries a
/// version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    name: String,
    found: bool,
    version: Option<String>,
    compile_args: Vec<String>,
    link_args: Vec<String>,
    sources: Vec<PathBuf>,
    method: DetectionMethod,
    language: Option<String>,
    need_threads: bool,
}

impl Dependency {
    /// Builds the record for a detector, enforcing the population invariant.
    #[must_use]
    pub fn from_detector(detector: &dyn Detector) -> Self {
        if !detector.found() {
            return Self::not_found(detector.name(), detector.method());
        }
        Self {
            name: detector.name().to_string(),
            found: true,
            version: Some(
                detector
                    .version()
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
            compile_args: detector.compile_args(),
            link_args: detector.link_args(),
            sources: detector.sources(),
            method: detector.method(),
            language: detector.language().map(ToString::to_string),
            need_threads: detector.need_threads(),
        }
    }

    /// A well-formed not-found record with empty flag and source lists.
    #[must_use]
    pub fn not_found(name: &str, method: DetectionMethod) -> Self {
        Self {
            name: name.to_string(),
            found: false,
            version: None,
            compile_args: Vec::new(),
            link_args: Vec::new(),
            sources: Vec::new(),
            method,
            language: None,
            need_threads: false,
        }
    }

    /// Logical name of the dependency.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the dependency was located.
    #[must_use]
    pub fn found(&self) -> bool {
        self.found
    }

    /// Resolved version string; always present on a found record.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Compiler flags, in the order the detecting strategy produced them.
    #[must_use]
    pub fn compile_args(&self) -> &[String] {
        &self.compile_args
    }

    /// Linker flags, in the order the detecting strategy produced them.
    #[must_use]
    pub fn link_args(&self) -> &[String] {
        &self.link_args
    }

    /// Extra source files to compile into the consumer.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// The detection method that produced this record.
    #[must_use]
    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    /// Toolchain language of the dependency, if foreign.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether consumers must enable native threading flags.
    #[must_use]
    pub fn need_threads(&self) -> bool {
        self.need_threads
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}: {}>",
            self.name,
            if self.found { "found" } else { "not found" }
        )
    }
}
