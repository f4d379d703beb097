//! pkgprobe - Native dependency detection
//!
//! A library that locates the third-party libraries and tools a project needs to
//! compile, abstracting over multiple discovery strategies (pkg-config, platform
//! frameworks, compiler built-ins, interpreter introspection) and producing a
//! uniform result: whether a dependency exists, and if so, the compiler/linker
//! flags and auxiliary sources required to use it.
//!
//! # Architecture Overview
//!
//! pkgprobe follows a probe/record model where:
//! - Each discovery strategy is a *detector* implementing the shared
//!   [`Detector`](core::Detector) contract
//! - Every lookup yields a single immutable [`Dependency`](core::Dependency)
//!   record, never a partially-populated one
//! - A closed registry maps well-known names (`boost`, `threads`, `python3`,
//!   `appleframeworks`) to specialized detectors; everything else goes through
//!   the pkg-config probe with a platform-framework fallback on macOS
//!
//! ## Key Features
//!
//! - **Multi-strategy probing**: pkg-config, framework bundles, interpreter
//!   introspection, and per-library filesystem heuristics tried in priority order
//! - **Deterministic results**: inconsistent external signals (tool output,
//!   filesystem layout, platform naming quirks) reconcile into one reproducible
//!   found/not-found decision with stable flags
//! - **Required vs optional**: a missing required dependency is fatal; an
//!   optional one degrades to a well-formed not-found record
//! - **Cross-platform**: shebang emulation and executable-extension heuristics
//!   make tool location behave identically on Windows and Unix-like systems
//! - **Cacheable**: lookups expose a pure identity key so callers can memoize
//!   repeated requests for the same logical dependency
//!
//! # Core Modules
//!
//! - [`core`] - Dependency record, detector contract, error taxonomy
//! - [`config`] - Cross-file parsing and the probing [`Environment`](config::Environment)
//! - [`program`] - External-executable locator with shebang emulation
//! - [`pkgconfig`] - pkg-config probe and libtool archive unwrapping
//! - [`version`] - Component-wise version constraint matching
//! - [`detectors`] - Specialized per-library detectors and their registry
//! - [`resolver`] - Strategy fallback chain and identity-key construction
//! - [`utils`] - Platform predicates and filesystem conventions
//!
//! # Example
//!
//! ```rust,no_run
//! use pkgprobe::config::Environment;
//! use pkgprobe::core::DependencyOptions;
//! use pkgprobe::resolver::find_external;
//!
//! # fn main() -> pkgprobe::core::Result<()> {
//! let env = Environment::new();
//!
//! // Required lookup: fails with an error if glib-2.0 is absent.
//! let glib = find_external("glib-2.0", &env, &DependencyOptions::new())?;
//! println!("compile args: {:?}", glib.compile_args());
//!
//! // Optional lookup with a version constraint: degrades to a not-found record.
//! let opts = DependencyOptions::new().optional().version(">=2.50");
//! let dep = find_external("glib-2.0", &env, &opts)?;
//! if !dep.found() {
//!     println!("glib-2.0 >= 2.50 is not installed");
//! }
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod config;
pub mod core;
pub mod resolver;

// Discovery strategies
pub mod detectors;
pub mod pkgconfig;
pub mod program;

// Supporting modules
pub mod utils;
pub mod version;
