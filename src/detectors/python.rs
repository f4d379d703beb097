//! Python 3 runtime detection.
//!
//! pkg-config is the primary strategy and its errors are suppressed entirely:
//! a broken `python3.pc` should not prevent the platform fallbacks from
//! running. The fallback depends on the platform family: Windows introspects
//! the interpreter's own build configuration (after checking that the
//! interpreter's architecture matches the build target), macOS searches for
//! the unversioned `python` framework bundle. Exactly one fallback is ever
//! applicable; the applicable-method set never contains both.

use std::process::Command;

use serde::Deserialize;

use crate::config::Environment;
use crate::core::dependency::{DependencyOptions, DetectionMethod, Detector};
use crate::core::error::Result;
use crate::detectors::framework::ExtraFramework;
use crate::pkgconfig::PkgConfig;
use crate::program::ExternalProgram;
use crate::utils::platform;

/// What the interpreter reports about its own build configuration.
#[derive(Debug, Deserialize)]
struct InterpreterInfo {
    platform: String,
    include: String,
    platinclude: String,
    base: String,
    version_nodot: String,
    version_short: String,
}

/// Script handed to the interpreter to dump its configuration as JSON.
const INTROSPECTION_SCRIPT: &str = "import sysconfig, json\n\
print(json.dumps({\
'platform': sysconfig.get_platform(), \
'include': sysconfig.get_path('include'), \
'platinclude': sysconfig.get_path('platinclude'), \
'base': str(sysconfig.get_config_var('base')), \
'version_nodot': str(sysconfig.get_config_var('py_version_nodot')), \
'version_short': str(sysconfig.get_config_var('py_version_short'))}))";

/// The Python 3 runtime as a dependency.
#[derive(Debug)]
pub struct Python3 {
    is_found: bool,
    version: String,
    compile_args: Vec<String>,
    link_args: Vec<String>,
    method_used: DetectionMethod,
}

impl Python3 {
    /// Detects the Python 3 runtime.
    ///
    /// # Errors
    ///
    /// [`crate::core::ProbeError::UnsupportedMethod`] for an explicit method
    /// outside the platform's applicable set. Probing failures themselves are
    /// non-fatal; absence is reported through the record.
    pub fn detect(env: &Environment, options: &DependencyOptions) -> Result<Self> {
        let allowed = Self::applicable_methods();
        let methods = DetectionMethod::resolve("python3", options.method, &allowed)?;

        let mut dep = Self {
            is_found: false,
            // All that is certain before probing is the major version.
            version: "3".to_string(),
            compile_args: Vec::new(),
            link_args: Vec::new(),
            method_used: DetectionMethod::PkgConfig,
        };

        if methods.contains(&DetectionMethod::PkgConfig) {
            // Suppress probe errors: the fallbacks below still apply.
            if let Ok(pkg) = PkgConfig::probe("python3", env, options)
                && pkg.found()
            {
                dep.compile_args = pkg.compile_args();
                dep.link_args = pkg.link_args();
                if let Some(version) = pkg.version() {
                    dep.version = version;
                }
                dep.is_found = true;
                dep.method_used = DetectionMethod::PkgConfig;
            }
        }

        if !dep.is_found {
            if platform::is_windows() && methods.contains(&DetectionMethod::InterpreterConfig) {
                dep.introspect_interpreter(env);
            } else if platform::is_macos() && methods.contains(&DetectionMethod::Framework) {
                // The macOS Python 3 framework carries no version in its name.
                let framework = ExtraFramework::detect("python", None, options)?;
                if framework.found() {
                    dep.compile_args = framework.compile_args();
                    dep.link_args = framework.link_args();
                    dep.is_found = true;
                    dep.method_used = DetectionMethod::Framework;
                }
            }
        }

        if dep.is_found {
            tracing::debug!("Dependency 'python3' found: YES ({})", dep.method_used);
        } else {
            tracing::debug!("Dependency 'python3' found: NO");
        }
        Ok(dep)
    }

    /// The methods applicable on the current platform family.
    #[must_use]
    pub fn applicable_methods() -> Vec<DetectionMethod> {
        if platform::is_windows() {
            vec![DetectionMethod::PkgConfig, DetectionMethod::InterpreterConfig]
        } else if platform::is_macos() {
            vec![DetectionMethod::PkgConfig, DetectionMethod::Framework]
        } else {
            vec![DetectionMethod::PkgConfig]
        }
    }

    /// Windows fallback: derive flags from the interpreter's build
    /// configuration, verifying the architecture agrees with the build target.
    fn introspect_interpreter(&mut self, env: &Environment) {
        let python = ExternalProgram::find("python3", None);
        let Some(command) = python.command() else {
            tracing::debug!("No python3 interpreter to introspect");
            return;
        };
        let Some(info) = run_introspection(command) else {
            tracing::warn!("python3 interpreter introspection failed");
            return;
        };

        let arch = match env.cpu_family() {
            "x86" => "32",
            "x86_64" => "64",
            other => {
                tracing::debug!("Unknown architecture '{other}' for python3");
                return;
            }
        };
        // The platform tag ends in '32' or '64'.
        if !info.platform.ends_with(arch) {
            tracing::debug!(
                "Need python3 for {arch}-bit, but found {}",
                info.platform
            );
            return;
        }

        self.compile_args = vec![format!("-I{}", info.include)];
        if info.platinclude != info.include {
            self.compile_args.push(format!("-I{}", info.platinclude));
        }
        self.link_args = vec![
            format!("-L{}/libs", info.base),
            format!("-lpython{}", info.version_nodot),
        ];
        self.version = info.version_short;
        self.is_found = true;
        self.method_used = DetectionMethod::InterpreterConfig;
    }
}

fn run_introspection(command: &[String]) -> Option<InterpreterInfo> {
    let output = Command::new(&command[0])
        .args(&command[1..])
        .arg("-c")
        .arg(INTROSPECTION_SCRIPT)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    serde_json::from_slice(&output.stdout).ok()
}

impl Detector for Python3 {
    fn name(&self) -> &str {
        "python3"
    }

    fn found(&self) -> bool {
        self.is_found
    }

    fn version(&self) -> Option<String> {
        Some(self.version.clone())
    }

    fn compile_args(&self) -> Vec<String> {
        self.compile_args.clone()
    }

    fn link_args(&self) -> Vec<String> {
        self.link_args.clone()
    }

    fn method(&self) -> DetectionMethod {
        self.method_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkgconfig::PkgConfigLocator;

    fn env_without_pkg_config() -> Environment {
        Environment::new().with_pkg_config(PkgConfigLocator::unavailable())
    }

    #[test]
    fn test_applicable_methods_never_contain_both_fallbacks() {
        let methods = Python3::applicable_methods();
        assert!(methods.contains(&DetectionMethod::PkgConfig));
        assert!(
            !(methods.contains(&DetectionMethod::InterpreterConfig)
                && methods.contains(&DetectionMethod::Framework))
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_only_exposes_pkg_config() {
        use crate::core::error::ProbeError;

        assert_eq!(
            Python3::applicable_methods(),
            vec![DetectionMethod::PkgConfig]
        );

        let opts = DependencyOptions::new().method(DetectionMethod::InterpreterConfig);
        let err = Python3::detect(&env_without_pkg_config(), &opts).unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_absence_is_not_fatal_even_when_required() {
        // A required python3 lookup degrades here; the resolver raises later.
        let dep = Python3::detect(&env_without_pkg_config(), &DependencyOptions::new());
        if platform::is_macos() || platform::is_windows() {
            // A platform fallback may legitimately succeed on those hosts.
            let _ = dep.unwrap();
        } else {
            let dep = dep.unwrap();
            assert!(!dep.found());
            assert!(dep.compile_args().is_empty());
            assert!(dep.link_args().is_empty());
        }
    }

    #[test]
    fn test_unprobed_version_is_major_only() {
        let dep = Python3 {
            is_found: false,
            version: "3".to_string(),
            compile_args: Vec::new(),
            link_args: Vec::new(),
            method_used: DetectionMethod::PkgConfig,
        };
        assert_eq!(dep.version(), Some("3".to_string()));
    }
}
