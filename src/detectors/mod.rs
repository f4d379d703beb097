//! Specialized per-library detectors and their registry.
//!
//! Libraries that ship no pkg-config metadata, or that need platform-specific
//! discovery, get a detector of their own. The set is closed: dispatch happens
//! over [`DetectorKind`], a fixed enumeration keyed by dependency name, not an
//! open subclass hierarchy. Each detector implements the shared
//! [`Detector`](crate::core::Detector) contract and is converted into an
//! immutable [`Dependency`] record at the registry boundary.

pub mod boost;
pub mod framework;
pub mod python;
pub mod threads;

pub use boost::Boost;
pub use framework::{AppleFrameworks, ExtraFramework};
pub use python::Python3;
pub use threads::Threads;

use crate::config::Environment;
use crate::core::dependency::{Dependency, DependencyOptions};
use crate::core::error::Result;

/// The closed registry of name-specific detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    /// The Boost library collection.
    Boost,
    /// Apple system frameworks, linked by name.
    AppleFrameworks,
    /// Native thread support.
    Threads,
    /// The Python 3 runtime.
    Python3,
}

impl DetectorKind {
    /// Looks up the registered detector for a dependency name,
    /// case-insensitively.
    #[must_use]
    pub fn for_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "boost" => Some(Self::Boost),
            "appleframeworks" => Some(Self::AppleFrameworks),
            "threads" => Some(Self::Threads),
            "python3" => Some(Self::Python3),
            _ => None,
        }
    }

    /// Runs the detector and converts the outcome into a dependency record.
    ///
    /// Construction errors (configuration problems, missing modules)
    /// propagate; absence is reported through the record and left to the
    /// caller's required/optional policy.
    pub fn detect(
        self,
        env: &Environment,
        options: &DependencyOptions,
    ) -> Result<Dependency> {
        match self {
            Self::Boost => {
                let detector = Boost::detect(env, options)?;
                Ok(Dependency::from_detector(&detector))
            }
            Self::AppleFrameworks => {
                let detector = AppleFrameworks::new(options)?;
                Ok(Dependency::from_detector(&detector))
            }
            Self::Threads => Ok(Dependency::from_detector(&Threads::new())),
            Self::Python3 => {
                let detector = Python3::detect(env, options)?;
                Ok(Dependency::from_detector(&detector))
            }
        }
    }
}
