//! Integration test suite for pkgprobe
//!
//! End-to-end tests that exercise the full probing pipeline against fake
//! external tools written into temporary directories. The fake pkg-config is
//! a small shell script, so the subprocess-driven tests are Unix-only; the
//! platform-independent pieces (records, keys, registry) are covered by unit
//! tests inside the crate.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pkgconfig_probe**: the pkg-config query protocol, version constraints,
//!   libtool unwrapping, error classification
//! - **resolver_chain**: the strategy fallback chain, required/optional
//!   policy, identity-key memoization

#[cfg(unix)]
mod common;
#[cfg(unix)]
mod pkgconfig_probe;
#[cfg(unix)]
mod resolver_chain;
