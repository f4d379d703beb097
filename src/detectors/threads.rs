//! Native thread-support detection.

use crate::core::dependency::{DetectionMethod, Detector};

/// Thread support as a dependency.
///
/// Every supported platform provides native threading, so the detector is
/// trivially found at construction. Its only real contribution is signaling
/// that native threading flags are required downstream; it has no flags of its
/// own.
#[derive(Debug, Default)]
pub struct Threads;

impl Threads {
    /// Detects thread support (always succeeds).
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("Dependency 'threads' found: YES");
        Self
    }
}

impl Detector for Threads {
    fn name(&self) -> &str {
        "threads"
    }

    fn found(&self) -> bool {
        true
    }

    fn version(&self) -> Option<String> {
        Some("unknown".to_string())
    }

    fn need_threads(&self) -> bool {
        true
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::SystemLink
    }
}
