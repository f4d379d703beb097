//! Boost detection.
//!
//! Boost ships no pkg-config metadata, so detection is pure filesystem
//! heuristics: resolve a root directory from `BOOST_ROOT` (or a platform
//! convention), parse the version macro out of `boost/version.hpp`, enumerate
//! the header subdirectories as available source modules, and glob the
//! installed shared libraries per platform naming scheme. Windows libraries
//! carry decorated filenames that are recorded verbatim; Unix-like platforms
//! derive bare module names, tracking `-mt` (multithreaded) builds separately
//! since some distributions only ship those.
//!
//! Link-flag synthesis defers to the ambient compiler's own library search
//! first - it is the most reliable signal - and only falls back to manual
//! `-lboost_<module>` construction when that yields nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Environment;
use crate::core::compiler::Compiler;
use crate::core::dependency::{DependencyOptions, DetectionMethod, Detector};
use crate::core::error::{ProbeError, Result};
use crate::utils::platform;

/// Environment variable naming the Boost installation root.
const ROOT_ENV: &str = "BOOST_ROOT";
/// Environment variable overriding the include directory.
const INCLUDE_ENV: &str = "BOOST_INCLUDEDIR";
/// Environment variable overriding the library directory.
const LIBRARY_ENV: &str = "BOOST_LIBRARYDIR";

/// Some Boost modules publish their libraries under a different name than
/// their source directory.
fn module_to_lib(module: &str) -> &str {
    match module {
        "test" => "unit_test_framework",
        other => other,
    }
}

/// The Boost library collection as a dependency.
pub struct Boost<'env> {
    compiler: &'env dyn Compiler,
    root: Option<PathBuf>,
    include_dir: PathBuf,
    library_dir_override: Option<PathBuf>,
    version: Option<String>,
    src_modules: BTreeSet<String>,
    lib_modules: BTreeSet<String>,
    lib_modules_mt: BTreeSet<String>,
    win_lib_files: BTreeMap<String, String>,
    win_lib_dir: Option<PathBuf>,
    requested: Vec<String>,
}

impl std::fmt::Debug for Boost<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boost")
            .field("root", &self.root)
            .field("include_dir", &self.include_dir)
            .field("library_dir_override", &self.library_dir_override)
            .field("version", &self.version)
            .field("src_modules", &self.src_modules)
            .field("lib_modules", &self.lib_modules)
            .field("lib_modules_mt", &self.lib_modules_mt)
            .field("win_lib_files", &self.win_lib_files)
            .field("win_lib_dir", &self.win_lib_dir)
            .field("requested", &self.requested)
            .finish()
    }
}

impl<'env> Boost<'env> {
    /// Detects a Boost installation and validates the requested modules.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::Config`] when no C++ compiler collaborator is attached,
    ///   when `BOOST_ROOT` is not absolute, or when a cross build supplies
    ///   neither `BOOST_ROOT` nor `BOOST_INCLUDEDIR`
    /// - [`ProbeError::ModuleNotFound`] when a requested module is absent from
    ///   the discovered source modules
    pub fn detect(env: &'env Environment, options: &DependencyOptions) -> Result<Self> {
        DetectionMethod::resolve("boost", options.method, &[DetectionMethod::SystemLink])?;
        let compiler = env.compiler().ok_or_else(|| ProbeError::Config {
            message: "tried to use boost but no C++ compiler is attached to the environment"
                .to_string(),
        })?;
        let want_cross = env.want_cross(options.native);

        let root = match env::var(ROOT_ENV) {
            Ok(value) => {
                let root = PathBuf::from(value);
                if !root.is_absolute() {
                    return Err(ProbeError::Config {
                        message: format!("{ROOT_ENV} must be an absolute path"),
                    });
                }
                Some(root)
            }
            Err(_) => None,
        };
        let include_override = env::var(INCLUDE_ENV).ok().map(PathBuf::from);
        let library_dir_override = env::var(LIBRARY_ENV).ok().map(PathBuf::from);

        let (root, include_dir) = match root {
            Some(root) => {
                let include_dir = if platform::is_windows() {
                    root.clone()
                } else {
                    root.join("include")
                };
                (Some(root), include_dir)
            }
            None => {
                if want_cross && include_override.is_none() {
                    return Err(ProbeError::Config {
                        message: format!(
                            "{ROOT_ENV} or {INCLUDE_ENV} is needed while cross-compiling"
                        ),
                    });
                }
                if platform::is_windows() {
                    let root = detect_windows_root();
                    let include_dir = root.clone();
                    (Some(root), include_dir)
                } else {
                    let include_dir =
                        include_override.unwrap_or_else(|| PathBuf::from("/usr/include"));
                    (None, include_dir)
                }
            }
        };

        tracing::debug!(
            "Boost library root dir is {:?}, include dir {}",
            root,
            include_dir.display()
        );

        let mut boost = Self {
            compiler,
            root,
            include_dir,
            library_dir_override,
            version: None,
            src_modules: BTreeSet::new(),
            lib_modules: BTreeSet::new(),
            lib_modules_mt: BTreeSet::new(),
            win_lib_files: BTreeMap::new(),
            win_lib_dir: None,
            requested: options.modules.clone(),
        };
        boost.version = boost.detect_version();
        if boost.version.is_some() {
            boost.detect_src_modules();
            boost.detect_lib_modules(env.cpu_family());
            boost.validate_requested()?;
            tracing::debug!(
                "Dependency boost ({}) found: YES {}",
                boost.requested.join(", "),
                boost.version.as_deref().unwrap_or_default()
            );
        } else {
            tracing::debug!(
                "Dependency boost ({}) found: NO",
                boost.requested.join(", ")
            );
        }
        Ok(boost)
    }

    /// Subdirectory holding the Boost headers.
    fn include_subdir(&self) -> PathBuf {
        self.include_dir.join("boost")
    }

    /// Parses the `BOOST_LIB_VERSION` macro out of `boost/version.hpp`.
    fn detect_version(&self) -> Option<String> {
        let content = fs::read_to_string(self.include_subdir().join("version.hpp")).ok()?;
        for line in content.lines() {
            if line.starts_with("#define") && line.contains("BOOST_LIB_VERSION") {
                let raw = line.split_whitespace().last()?;
                let raw = raw.trim_matches('"');
                return Some(raw.replace('_', "."));
            }
        }
        None
    }

    /// Every subdirectory of the header namespace is an available source
    /// module.
    fn detect_src_modules(&mut self) {
        let Ok(entries) = fs::read_dir(self.include_subdir()) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                self.src_modules
                    .insert(entry.file_name().to_string_lossy().into_owned());
            }
        }
    }

    fn detect_lib_modules(&mut self, cpu_family: &str) {
        if platform::is_windows() {
            self.detect_lib_modules_windows(cpu_family);
        } else {
            self.detect_lib_modules_unix();
        }
    }

    /// Windows installs decorated `.lib` filenames under an arch-specific
    /// library directory; record the module-to-filename map.
    fn detect_lib_modules_windows(&mut self, cpu_family: &str) {
        let arch_glob = match cpu_family {
            "x86" => "lib32*",
            "x86_64" => "lib64*",
            _ => return,
        };
        let Some(root) = &self.root else {
            return;
        };
        let pattern = root.join(arch_glob);
        let Some(lib_dir) = first_glob_match(&pattern) else {
            return;
        };
        self.win_lib_dir = Some(lib_dir.clone());
        for entry in glob_matches(&lib_dir.join("boost_*-gd-*.lib")) {
            let Some(file_name) = entry.file_name().map(|name| name.to_string_lossy()) else {
                continue;
            };
            let Some((_, base)) = file_name.split_once('_') else {
                continue;
            };
            let module = base.split('-').next().unwrap_or_default();
            self.win_lib_files
                .insert(module.to_string(), file_name.clone().into_owned());
        }
    }

    /// Unix-like platforms derive module names from `libboost_*` shared
    /// libraries, keeping `-mt` builds in their own set.
    fn detect_lib_modules_unix(&mut self) {
        let suffix = platform::shared_library_suffix();
        let pattern = format!("libboost_*.{suffix}");
        let mt_suffix = format!("-mt.{suffix}");

        let lib_dirs: Vec<PathBuf> = if let Some(dir) = &self.library_dir_override {
            vec![dir.clone()]
        } else if let Some(root) = &self.root {
            vec![root.join("lib")]
        } else {
            platform::library_dirs()
        };

        for dir in lib_dirs {
            for entry in glob_matches(&dir.join(&pattern)) {
                let Some(file_name) = entry.file_name().map(|name| name.to_string_lossy()) else {
                    continue;
                };
                let stem = file_name.split('.').next().unwrap_or_default();
                let Some((_, module)) = stem.split_once('_') else {
                    continue;
                };
                if file_name.ends_with(&mt_suffix) {
                    self.lib_modules_mt.insert(module.to_string());
                } else {
                    self.lib_modules.insert(module.to_string());
                }
            }
        }
    }

    /// Every explicitly requested module must exist among the source modules;
    /// compiled-library availability does not substitute.
    fn validate_requested(&self) -> Result<()> {
        for module in &self.requested {
            if !self.src_modules.contains(module) {
                return Err(ProbeError::ModuleNotFound {
                    library: "boost".to_string(),
                    module: module.clone(),
                });
            }
        }
        Ok(())
    }

    fn windows_link_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.root.is_some()
            && let Some(lib_dir) = &self.win_lib_dir
        {
            args.push(format!("-L{}", lib_dir.display()));
        }
        for module in &self.requested {
            let module = module_to_lib(module);
            if let Some(file_name) = self.win_lib_files.get(module) {
                args.push(file_name.clone());
            }
        }
        args
    }

    fn unix_link_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(root) = &self.root {
            args.push(format!("-L{}", root.join("lib").display()));
        } else if let Some(dir) = &self.library_dir_override {
            args.push(format!("-L{}", dir.display()));
        }
        for module in &self.requested {
            let module = module_to_lib(module);
            let lib_name = format!("boost_{module}");
            // The compiler's own library search is the most reliable signal.
            if let Some(found) = self.compiler.find_library(&lib_name) {
                args.extend(found);
                if module == "unit_test_framework"
                    && let Some(monitor) = self.compiler.find_library("boost_test_exec_monitor")
                {
                    args.extend(monitor);
                }
            } else if self.lib_modules.contains(module) || self.lib_modules_mt.contains(module) {
                args.push(format!("-l{lib_name}"));
                // The testing framework needs its companion monitor library.
                if module == "unit_test_framework" {
                    args.push("-lboost_test_exec_monitor".to_string());
                }
            } else if self.lib_modules_mt.contains(&format!("{module}-mt")) {
                args.push(format!("-l{lib_name}-mt"));
                if module == "unit_test_framework" {
                    args.push("-lboost_test_exec_monitor-mt".to_string());
                }
            }
        }
        args
    }

    /// Source modules discovered under the header namespace.
    #[must_use]
    pub fn src_modules(&self) -> &BTreeSet<String> {
        &self.src_modules
    }
}

impl Detector for Boost<'_> {
    fn name(&self) -> &str {
        "boost"
    }

    fn found(&self) -> bool {
        self.version.is_some()
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn compile_args(&self) -> Vec<String> {
        let include_dir = match &self.root {
            Some(root) if platform::is_windows() => root.clone(),
            Some(root) => root.join("include"),
            None => self.include_dir.clone(),
        };
        // System-header treatment on the compiler's default include dirs
        // breaks libstdc++ headers, so leave those off the command line.
        if include_dir == Path::new("/usr/include") || include_dir == Path::new("/usr/local/include")
        {
            return Vec::new();
        }
        self.compiler.include_args(&include_dir, true)
    }

    fn link_args(&self) -> Vec<String> {
        if platform::is_windows() {
            self.windows_link_args()
        } else {
            self.unix_link_args()
        }
    }

    fn need_threads(&self) -> bool {
        self.requested.iter().any(|module| module == "thread")
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::SystemLink
    }
}

/// Conventional Windows install root, e.g. `c:\local\boost_1_64_0`.
fn detect_windows_root() -> PathBuf {
    first_glob_match(Path::new("c:\\local\\boost_*")).unwrap_or_else(|| PathBuf::from("C:\\"))
}

fn glob_matches(pattern: &Path) -> Vec<PathBuf> {
    let Some(pattern) = pattern.to_str() else {
        return Vec::new();
    };
    match glob::glob(pattern) {
        Ok(paths) => paths.flatten().collect(),
        Err(_) => Vec::new(),
    }
}

fn first_glob_match(pattern: &Path) -> Option<PathBuf> {
    glob_matches(pattern).into_iter().next()
}
