//! pkg-config probing and libtool archive unwrapping.
//!
//! The pkg-config probe is the default strategy for every dependency without a
//! specialized detector. It shells out to the pkg-config binary once per
//! query, in a fixed order: `--modversion` to establish existence, the version
//! constraint check, then `--cflags` and `--libs`. The ordering matters for
//! error classification: a failing `--modversion` means absence (fatal only
//! when required), while a failing flags query after existence was confirmed
//! means a broken installation and is always fatal.
//!
//! # Tool resolution
//!
//! [`PkgConfigLocator`] resolves the native binary once and memoizes the
//! result for its whole lifetime (first successful resolution wins; the
//! environment keeps a single locator for the build). A `PKG_CONFIG`
//! environment variable overrides the binary, tilde-expanded. Cross builds
//! resolve the binary named in the cross file's `[binaries]` table
//! independently on every lookup and never touch the native cache.
//!
//! # Libtool archives
//!
//! `--libs` output can reference `.la` archive descriptors left behind by
//! libtool. Linking against the descriptor is useless, so every such token is
//! unwrapped: the descriptor's recorded shared-library name is resolved
//! relative to the descriptor's directory (with a `.libs/` retry), and the
//! resolved path substitutes the token. macOS prefers reconstructing an
//! absolute path from the recorded `libdir`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use crate::config::{Environment, PKG_CONFIG_ROLE};
use crate::core::dependency::{DependencyOptions, DetectionMethod, Detector};
use crate::core::error::{ProbeError, Result};
use crate::program::ExternalProgram;
use crate::utils::platform;
use crate::version;

/// Name of the metadata tool, as searched on the system.
const PKG_CONFIG_BIN: &str = "pkg-config";

/// Environment variable overriding the metadata tool binary.
const PKG_CONFIG_ENV: &str = "PKG_CONFIG";

/// Output of one tool invocation.
struct ToolOutput {
    code: i32,
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    /// Text worth showing in an error message: stderr when present, stdout
    /// otherwise.
    fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// A resolved pkg-config binary, invocable as a subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgConfigTool {
    command: Vec<String>,
}

impl PkgConfigTool {
    /// Wraps an explicit command vector.
    #[must_use]
    pub fn from_command(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Wraps a located program, if it was found.
    #[must_use]
    pub fn from_program(program: &ExternalProgram) -> Option<Self> {
        program.command().map(|cmd| Self {
            command: cmd.to_vec(),
        })
    }

    /// The argument vector this tool is invoked with.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Runs the tool with extra arguments, capturing exit code and output.
    fn run(&self, args: &[&str]) -> Result<ToolOutput> {
        let output = Command::new(&self.command[0])
            .args(&self.command[1..])
            .args(args)
            .output()
            .map_err(|source| ProbeError::FileSystem {
                operation: format!("invoke '{}'", self.command[0]),
                path: PathBuf::from(&self.command[0]),
                source,
            })?;
        Ok(ToolOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Resolves and memoizes the native pkg-config binary.
///
/// The cache is written at most once, by whichever lookup resolves the tool
/// first; every later native lookup reuses that result. The locator is an
/// ordinary value owned by the [`Environment`], so tests inject a preseeded
/// one instead of touching process globals.
#[derive(Debug, Default)]
pub struct PkgConfigLocator {
    native: OnceLock<Option<PkgConfigTool>>,
}

impl PkgConfigLocator {
    /// An empty locator; the first native lookup resolves the tool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            native: OnceLock::new(),
        }
    }

    /// A locator preseeded with an explicit command, skipping resolution.
    #[must_use]
    pub fn with_command(command: Vec<String>) -> Self {
        let native = OnceLock::new();
        let _ = native.set(Some(PkgConfigTool::from_command(command)));
        Self { native }
    }

    /// A locator preseeded as "searched and not found".
    #[must_use]
    pub fn unavailable() -> Self {
        let native = OnceLock::new();
        let _ = native.set(None);
        Self { native }
    }

    /// The native tool, resolving and caching it on first use.
    #[must_use]
    pub fn native(&self) -> Option<&PkgConfigTool> {
        self.native.get_or_init(resolve_native).as_ref()
    }
}

/// One-time native resolution: honor `PKG_CONFIG`, verify with `--version`,
/// and resolve relative names to absolute paths.
fn resolve_native() -> Option<PkgConfigTool> {
    let name = match std::env::var(PKG_CONFIG_ENV) {
        Ok(value) if !value.trim().is_empty() => {
            shellexpand::tilde(value.trim()).into_owned()
        }
        _ => PKG_CONFIG_BIN.to_string(),
    };

    let output = Command::new(&name).arg("--version").output();
    let version = match output {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        }
        _ => {
            tracing::debug!("Found pkg-config: NO");
            return None;
        }
    };

    // Sometimes spawning succeeds where a search-path lookup fails; only
    // upgrade to an absolute path when the lookup agrees.
    let resolved = if Path::new(&name).is_absolute() {
        name
    } else if let Ok(abs) = which::which(&name) {
        abs.to_string_lossy().into_owned()
    } else {
        name
    };
    tracing::debug!("Found pkg-config: {resolved} ({version})");
    Some(PkgConfigTool::from_command(vec![resolved]))
}

/// A pkg-config lookup in progress or completed.
///
/// Construction runs the full probe; the resulting value is queried read-only
/// through the [`Detector`] contract. On a version mismatch the unmet and met
/// requirement subsets stay available via
/// [`unmet_requirements`](Self::unmet_requirements) and
/// [`met_requirements`](Self::met_requirements) even when the lookup degraded
/// to not-found.
#[derive(Debug)]
pub struct PkgConfig {
    name: String,
    is_found: bool,
    version: Option<String>,
    compile_args: Vec<String>,
    link_args: Vec<String>,
    is_libtool: bool,
    unmet: Vec<String>,
    met: Vec<String>,
    tool: Option<PkgConfigTool>,
}

impl PkgConfig {
    /// Probes `name` through pkg-config.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::UnsupportedMethod`] for an explicit method other than
    ///   pkg-config
    /// - [`ProbeError::CrossBinaryMissing`] / [`ProbeError::ToolNotFound`] /
    ///   [`ProbeError::DependencyNotFound`] /
    ///   [`ProbeError::VersionMismatch`] when the lookup is required
    /// - [`ProbeError::ToolMalfunction`] when a flags query fails after
    ///   existence was confirmed, regardless of required
    pub fn probe(name: &str, env: &Environment, options: &DependencyOptions) -> Result<Self> {
        DetectionMethod::resolve(name, options.method, &[DetectionMethod::PkgConfig])?;

        let mut probe = Self {
            name: name.to_string(),
            is_found: false,
            version: None,
            compile_args: Vec::new(),
            link_args: Vec::new(),
            is_libtool: false,
            unmet: Vec::new(),
            met: Vec::new(),
            tool: None,
        };

        let want_cross = env.want_cross(options.native);
        let tool = if want_cross {
            cross_tool(env, options.required)?
        } else {
            env.pkg_config().native().cloned()
        };
        let Some(tool) = tool else {
            if options.required {
                return Err(ProbeError::ToolNotFound {
                    tool: PKG_CONFIG_BIN.to_string(),
                });
            }
            return Ok(probe);
        };

        let scope = if want_cross { "Cross" } else { "Native" };
        tracing::debug!(
            "Determining dependency '{name}' with pkg-config executable '{}'",
            tool.command()[0]
        );

        let out = tool.run(&["--modversion", name])?;
        if out.code != 0 {
            tracing::debug!("{scope} dependency '{name}' found: NO");
            if options.required {
                return Err(ProbeError::DependencyNotFound {
                    name: name.to_string(),
                });
            }
            probe.tool = Some(tool);
            return Ok(probe);
        }
        let modversion = out.stdout;

        if !options.versions.is_empty() {
            let outcome = version::matches_all(&modversion, &options.versions);
            if !outcome.satisfied {
                tracing::debug!(
                    "{scope} dependency '{name}' found '{modversion}' but need {:?}; matched {:?}",
                    outcome.unmet,
                    outcome.met
                );
                probe.unmet = outcome.unmet.clone();
                probe.met = outcome.met.clone();
                if options.required {
                    return Err(ProbeError::VersionMismatch {
                        name: name.to_string(),
                        found: modversion,
                        unmet: outcome.unmet,
                        met: outcome.met,
                    });
                }
                probe.tool = Some(tool);
                return Ok(probe);
            }
        }

        probe.compile_args = query_flags(&tool, name, &["--cflags", name])?;
        probe.link_args = query_link_args(&tool, name, options.static_link, &mut probe.is_libtool)?;
        probe.version = Some(modversion.clone());
        probe.is_found = true;
        probe.tool = Some(tool);
        tracing::debug!("{scope} dependency '{name}' found: YES {modversion}");
        Ok(probe)
    }

    /// Queries a pkg-config variable (`--variable=<var> <name>`).
    ///
    /// # Errors
    ///
    /// [`ProbeError::ToolMalfunction`] on a non-zero exit: the variable query
    /// only runs against packages whose existence was already confirmed.
    pub fn variable(&self, var: &str) -> Result<String> {
        let tool = self.tool.as_ref().ok_or_else(|| ProbeError::ToolNotFound {
            tool: PKG_CONFIG_BIN.to_string(),
        })?;
        let query = format!("--variable={var}");
        let out = tool.run(&[&query, &self.name])?;
        if out.code != 0 {
            return Err(ProbeError::ToolMalfunction {
                tool: PKG_CONFIG_BIN.to_string(),
                query,
                name: self.name.clone(),
                output: out.diagnostic().to_string(),
            });
        }
        tracing::debug!(
            "Got pkg-config variable {var} : {}",
            out.stdout
        );
        Ok(out.stdout)
    }

    /// Requirements that failed on a version mismatch.
    #[must_use]
    pub fn unmet_requirements(&self) -> &[String] {
        &self.unmet
    }

    /// Requirements that held despite an overall version mismatch.
    #[must_use]
    pub fn met_requirements(&self) -> &[String] {
        &self.met
    }

    /// Whether any link token was unwrapped from a libtool archive.
    #[must_use]
    pub fn is_libtool(&self) -> bool {
        self.is_libtool
    }
}

impl Detector for PkgConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn found(&self) -> bool {
        self.is_found
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }

    fn compile_args(&self) -> Vec<String> {
        self.compile_args.clone()
    }

    fn link_args(&self) -> Vec<String> {
        self.link_args.clone()
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::PkgConfig
    }
}

/// Resolves the cross pkg-config named by the cross file, never consulting or
/// populating the native cache.
fn cross_tool(env: &Environment, required: bool) -> Result<Option<PkgConfigTool>> {
    let Some(binary) = env.cross().and_then(|cross| cross.binary(PKG_CONFIG_ROLE)) else {
        if required {
            return Err(ProbeError::CrossBinaryMissing {
                role: PKG_CONFIG_ROLE.to_string(),
            });
        }
        return Ok(None);
    };
    let program = ExternalProgram::find(binary, None);
    if !program.found() {
        tracing::debug!("Cross pkg-config '{binary}' not found");
        return Ok(None);
    }
    Ok(PkgConfigTool::from_program(&program))
}

/// Runs a flags query whose failure indicates a broken installation.
fn query_flags(tool: &PkgConfigTool, name: &str, args: &[&str]) -> Result<Vec<String>> {
    let out = tool.run(args)?;
    if out.code != 0 {
        return Err(ProbeError::ToolMalfunction {
            tool: PKG_CONFIG_BIN.to_string(),
            query: args[0].to_string(),
            name: name.to_string(),
            output: out.diagnostic().to_string(),
        });
    }
    Ok(out.stdout.split_whitespace().map(ToString::to_string).collect())
}

/// Runs the `--libs` query and unwraps any libtool archive tokens.
fn query_link_args(
    tool: &PkgConfigTool,
    name: &str,
    static_link: bool,
    is_libtool: &mut bool,
) -> Result<Vec<String>> {
    let mut args = vec!["--libs"];
    if static_link {
        args.push("--static");
    }
    args.push(name);
    let tokens = query_flags(tool, name, &args)?;

    let mut link_args = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.ends_with(".la") {
            let resolved = resolve_libtool_shlib(Path::new(&token))?;
            link_args.push(resolved.to_string_lossy().into_owned());
            *is_libtool = true;
        } else {
            link_args.push(token);
        }
    }
    Ok(link_args)
}

/// Extracts one `key=value` field from a libtool archive descriptor,
/// stripping the surrounding quotes.
fn archive_field(descriptor: &Path, field: &str) -> Result<Option<String>> {
    let content = fs::read_to_string(descriptor).map_err(|source| ProbeError::FileSystem {
        operation: "read libtool archive".to_string(),
        path: descriptor.to_path_buf(),
        source,
    })?;
    for line in content.lines() {
        if let Some((key, value)) = line.trim().split_once('=') {
            if key == field {
                let value = value.trim().trim_matches('\'').trim_matches('"');
                return Ok(Some(value.to_string()));
            }
        }
    }
    Ok(None)
}

/// Resolves the shared library a libtool archive descriptor points at.
///
/// The recorded `dlname` resolves relative to the descriptor's directory,
/// retrying the conventional `.libs/` staging subdirectory. macOS prefers an
/// absolute path rebuilt from the recorded `libdir`, since descriptors never
/// record absolute `dlname`s themselves.
fn resolve_libtool_shlib(descriptor: &Path) -> Result<PathBuf> {
    let Some(dlname) = archive_field(descriptor, "dlname")? else {
        return Err(ProbeError::LibtoolArchive {
            path: descriptor.to_path_buf(),
        });
    };
    let basename = Path::new(&dlname)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| ProbeError::LibtoolArchive {
            path: descriptor.to_path_buf(),
        })?;

    let shared_name = if platform::is_macos() {
        match archive_field(descriptor, "libdir")? {
            Some(libdir) => Path::new(&libdir).join(&basename),
            None => basename,
        }
    } else {
        basename
    };

    let dir = descriptor.parent().unwrap_or_else(|| Path::new(""));
    let direct = dir.join(&shared_name);
    if direct.exists() {
        return Ok(direct);
    }
    let staged = dir.join(".libs").join(&shared_name);
    if staged.exists() {
        return Ok(staged);
    }
    Err(ProbeError::LibtoolArchive {
        path: descriptor.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_archive_field_strips_quotes() {
        let temp = tempfile::TempDir::new().unwrap();
        let la = temp.path().join("libfoo.la");
        fs::write(
            &la,
            "# libfoo.la - a libtool library file\ndlname='libfoo.so.1'\nlibdir='/usr/lib'\n",
        )
        .unwrap();

        assert_eq!(
            archive_field(&la, "dlname").unwrap(),
            Some("libfoo.so.1".to_string())
        );
        assert_eq!(
            archive_field(&la, "libdir").unwrap(),
            Some("/usr/lib".to_string())
        );
        assert_eq!(archive_field(&la, "old_library").unwrap(), None);
    }

    #[test]
    fn test_libtool_resolution_prefers_direct_sibling() {
        let temp = tempfile::TempDir::new().unwrap();
        let la = temp.path().join("libfoo.la");
        fs::write(&la, "dlname='libfoo.so.1'\n").unwrap();
        fs::write(temp.path().join("libfoo.so.1"), "").unwrap();

        let resolved = resolve_libtool_shlib(&la).unwrap();
        assert_eq!(resolved, temp.path().join("libfoo.so.1"));
    }

    #[test]
    fn test_libtool_resolution_falls_back_to_staging_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let la = temp.path().join("libfoo.la");
        fs::write(&la, "dlname='libfoo.so.1'\n").unwrap();
        fs::create_dir(temp.path().join(".libs")).unwrap();
        fs::write(temp.path().join(".libs").join("libfoo.so.1"), "").unwrap();

        let resolved = resolve_libtool_shlib(&la).unwrap();
        assert_eq!(resolved, temp.path().join(".libs").join("libfoo.so.1"));
    }

    #[test]
    fn test_libtool_resolution_fails_when_library_is_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        let la = temp.path().join("libfoo.la");
        fs::write(&la, "dlname='libfoo.so.1'\n").unwrap();

        let err = resolve_libtool_shlib(&la).unwrap_err();
        assert!(matches!(err, ProbeError::LibtoolArchive { .. }));
    }

    #[test]
    fn test_libtool_resolution_fails_without_dlname() {
        let temp = tempfile::TempDir::new().unwrap();
        let la = temp.path().join("libfoo.la");
        fs::write(&la, "old_library='libfoo.a'\n").unwrap();

        let err = resolve_libtool_shlib(&la).unwrap_err();
        assert!(matches!(err, ProbeError::LibtoolArchive { .. }));
    }

    #[test]
    fn test_preseeded_locator_skips_resolution() {
        let locator = PkgConfigLocator::with_command(vec!["/fake/pkg-config".to_string()]);
        let tool = locator.native().unwrap();
        assert_eq!(tool.command(), ["/fake/pkg-config"]);

        let unavailable = PkgConfigLocator::unavailable();
        assert!(unavailable.native().is_none());
    }

    #[test]
    fn test_probe_without_tool_is_fatal_only_when_required() {
        let env = Environment::new().with_pkg_config(PkgConfigLocator::unavailable());

        let optional = DependencyOptions::new().optional();
        let probe = PkgConfig::probe("zlib", &env, &optional).unwrap();
        assert!(!probe.found());
        assert!(probe.compile_args().is_empty());

        let err = PkgConfig::probe("zlib", &env, &DependencyOptions::new()).unwrap_err();
        assert!(matches!(err, ProbeError::ToolNotFound { .. }));
    }

    #[test]
    fn test_probe_rejects_foreign_method() {
        let env = Environment::new().with_pkg_config(PkgConfigLocator::unavailable());
        let opts = DependencyOptions::new().method(DetectionMethod::Framework);
        let err = PkgConfig::probe("zlib", &env, &opts).unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedMethod { .. }));
    }
}
