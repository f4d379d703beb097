//! Core types for pkgprobe
//!
//! This module forms the foundation of pkgprobe's type system:
//!
//! - [`error`] - the [`ProbeError`] taxonomy and the crate [`Result`] alias.
//!   The variant decides whether an optional lookup may degrade to a not-found
//!   record or must fail regardless.
//! - [`dependency`] - the immutable [`Dependency`] record every lookup
//!   produces, the [`Detector`] contract every strategy implements, the closed
//!   [`DetectionMethod`] set, and the [`DependencyOptions`] a caller supplies.
//! - [`compiler`] - the narrow [`Compiler`] trait through which detectors
//!   consult the consuming build system's compiler.
//!
//! # Design Principles
//!
//! Records are immutable once constructed: consumers read flags, they never
//! amend them. Detector construction performs all validation, so a successfully
//! constructed detector can be queried without further error handling. The
//! detector set is closed - dispatch happens over a fixed registry, not an
//! open subclass hierarchy.

pub mod compiler;
pub mod dependency;
pub mod error;

pub use compiler::Compiler;
pub use dependency::{Dependency, DependencyOptions, DetectionMethod, Detector};
pub use error::{ProbeError, Result};
