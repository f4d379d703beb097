//! Framework detection for the Apple platform family.
//!
//! Two strategies live here. [`AppleFrameworks`] covers system frameworks: on
//! macOS their existence is assumed from platform identity alone and the link
//! flags are emitted unconditionally; on any other platform the dependency
//! reports not-found. [`ExtraFramework`] covers third-party bundles installed
//! under a framework directory: it scans the directory's immediate entries for
//! a case-insensitive name match and derives compile and link flags from the
//! bundle's conventional layout.

use std::path::{Path, PathBuf};

use crate::core::dependency::{DependencyOptions, DetectionMethod, Detector};
use crate::core::error::{ProbeError, Result};
use crate::utils::platform;

/// One or more system frameworks, linked by name.
#[derive(Debug)]
pub struct AppleFrameworks {
    frameworks: Vec<String>,
}

impl AppleFrameworks {
    /// Builds the detector from the requested modules.
    ///
    /// # Errors
    ///
    /// [`ProbeError::Config`] when no modules were requested,
    /// [`ProbeError::UnsupportedMethod`] for an explicit method other than
    /// framework linking.
    pub fn new(options: &DependencyOptions) -> Result<Self> {
        DetectionMethod::resolve("appleframeworks", options.method, &[DetectionMethod::Framework])?;
        if options.modules.is_empty() {
            return Err(ProbeError::Config {
                message: "Apple frameworks dependency requires at least one module".to_string(),
            });
        }
        Ok(Self {
            frameworks: options.modules.clone(),
        })
    }
}

impl Detector for AppleFrameworks {
    fn name(&self) -> &str {
        "appleframeworks"
    }

    fn found(&self) -> bool {
        // No filesystem check: a system framework is present iff this is the
        // right platform.
        platform::is_macos()
    }

    fn version(&self) -> Option<String> {
        Some("unknown".to_string())
    }

    fn link_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.frameworks.len() * 2);
        for framework in &self.frameworks {
            args.push("-framework".to_string());
            args.push(framework.clone());
        }
        args
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::Framework
    }
}

/// A framework bundle located by scanning a framework directory.
#[derive(Debug)]
pub struct ExtraFramework {
    name: String,
    root: Option<PathBuf>,
    bundle: Option<String>,
}

impl ExtraFramework {
    /// Scans `path` (default: the platform framework root) for a bundle whose
    /// extension-stripped name matches `name` case-insensitively.
    ///
    /// # Errors
    ///
    /// [`ProbeError::UnsupportedMethod`] for an explicit method other than
    /// framework search.
    pub fn detect(name: &str, path: Option<&Path>, options: &DependencyOptions) -> Result<Self> {
        DetectionMethod::resolve(name, options.method, &[DetectionMethod::Framework])?;

        let mut detector = Self {
            name: name.to_string(),
            root: None,
            bundle: None,
        };
        let default_root = PathBuf::from(platform::DEFAULT_FRAMEWORK_DIR);
        let root = path.map_or(default_root, Path::to_path_buf);
        detector.scan(&root);
        match (&detector.root, &detector.bundle) {
            (Some(root), Some(bundle)) => {
                tracing::debug!(
                    "Dependency '{name}' found: YES {}",
                    root.join(bundle).display()
                );
            }
            _ => tracing::debug!("Dependency '{name}' found: NO"),
        }
        Ok(detector)
    }

    fn scan(&mut self, root: &Path) {
        let wanted = self.name.to_lowercase();
        let Ok(entries) = std::fs::read_dir(root) else {
            tracing::debug!(
                "Framework directory {} is not readable",
                root.display()
            );
            return;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let bundle = file_name.to_string_lossy();
            let stem = bundle.split('.').next().unwrap_or_default();
            if stem.to_lowercase() != wanted {
                continue;
            }
            if !entry.path().is_dir() {
                continue;
            }
            self.root = Some(root.to_path_buf());
            self.bundle = Some(bundle.into_owned());
            return;
        }
    }

    /// The matched bundle directory, for diagnostics.
    #[must_use]
    pub fn bundle_path(&self) -> Option<PathBuf> {
        match (&self.root, &self.bundle) {
            (Some(root), Some(bundle)) => Some(root.join(bundle)),
            _ => None,
        }
    }
}

impl Detector for ExtraFramework {
    fn name(&self) -> &str {
        &self.name
    }

    fn found(&self) -> bool {
        self.bundle.is_some()
    }

    fn compile_args(&self) -> Vec<String> {
        match self.bundle_path() {
            Some(path) => vec![format!("-I{}", path.join("Headers").display())],
            None => Vec::new(),
        }
    }

    fn link_args(&self) -> Vec<String> {
        match (&self.root, &self.bundle) {
            (Some(root), Some(bundle)) => {
                let bare = bundle.split('.').next().unwrap_or_default();
                vec![
                    format!("-F{}", root.display()),
                    "-framework".to_string(),
                    bare.to_string(),
                ]
            }
            _ => Vec::new(),
        }
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::Framework
    }
}
