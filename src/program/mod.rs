//! External-executable location with shebang emulation.
//!
//! Tools referenced during probing are not always native executables: they can
//! be scripts without an execute bit, scripts on Windows (which cannot execute
//! shebangs at all), or extensionless files a plain `PATH` lookup will never
//! surface there. [`ExternalProgram`] reconciles those cases into one ordered
//! argument vector: `[interpreter, script]` when the target needs shebang
//! emulation, or the direct executable path otherwise.
//!
//! The search order is: explicit override verbatim, then the optional search
//! directory, then the process search path. Windows additionally tries each
//! recognized executable extension and, as a last resort, walks the search
//! path by hand looking for shebang scripts.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pkgprobe::program::ExternalProgram;
//!
//! let prog = ExternalProgram::find("pkg-config", None);
//! if prog.found() {
//!     println!("invoke as: {:?}", prog.command().unwrap());
//! }
//! ```

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::utils::platform;

/// A resolved external executable, or the record of a failed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProgram {
    name: String,
    command: Option<Vec<String>>,
}

impl ExternalProgram {
    /// Searches for `name`, looking in `search_dir` first and the process
    /// search path second.
    #[must_use]
    pub fn find(name: &str, search_dir: Option<&Path>) -> Self {
        let command = search(name, search_dir);
        match &command {
            Some(cmd) => {
                tracing::debug!("Program '{name}' found: YES ({})", cmd.join(" "));
            }
            None => tracing::debug!("Program '{name}' found: NO"),
        }
        Self {
            name: name.to_string(),
            command,
        }
    }

    /// Uses an explicit command override verbatim.
    ///
    /// The program counts as found iff the first token is non-empty; no
    /// filesystem checks are performed.
    #[must_use]
    pub fn from_command(name: &str, command: Vec<String>) -> Self {
        let command = match command.first() {
            Some(first) if !first.is_empty() => Some(command),
            _ => None,
        };
        Self {
            name: name.to_string(),
            command,
        }
    }

    /// Whether the search produced a runnable command.
    #[must_use]
    pub fn found(&self) -> bool {
        self.command.is_some()
    }

    /// The ordered argument vector to execute, if found.
    #[must_use]
    pub fn command(&self) -> Option<&[String]> {
        self.command.as_deref()
    }

    /// The path of the script or binary actually run.
    ///
    /// For shebang scripts this is the script, not the interpreter.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.command
            .as_ref()
            .and_then(|cmd| cmd.last())
            .map(String::as_str)
    }

    /// The logical name that was searched for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Derives an interpreter command line from a script's first line.
///
/// The line must begin with `#!`; anything after a secondary `#` is ignored.
/// An `env <interp>` spelling rewrites to the bare interpreter, and on Windows
/// a Unix-style absolute interpreter path is reduced to its final component
/// (Windows has no `/usr/bin`).
fn shebang_to_cmd(script: &Path) -> Option<Vec<String>> {
    let file = File::open(script).ok()?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line).ok()?;
    let rest = first_line.trim().strip_prefix("#!")?;
    let rest = rest.split('#').next().unwrap_or("").trim();
    let mut parts: Vec<String> = rest.split_whitespace().map(ToString::to_string).collect();
    if parts.is_empty() {
        return None;
    }
    if platform::is_windows() && parts[0].starts_with('/') {
        parts[0] = parts[0]
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
    }
    if Path::new(&parts[0]).file_name() == Some(OsStr::new("env")) {
        parts.remove(0);
    }
    if parts.is_empty() {
        return None;
    }
    parts.push(script.to_string_lossy().into_owned());
    Some(parts)
}

/// Looks for the program inside one directory.
///
/// An existing candidate that is not directly executable still counts if an
/// interpreter can be derived from its shebang line. Windows also tries each
/// recognized executable extension as a suffix.
fn search_in_dir(name: &str, dir: &Path) -> Option<Vec<String>> {
    let trial = dir.join(name);
    if trial.exists() {
        if platform::is_executable(&trial) {
            return Some(vec![trial.to_string_lossy().into_owned()]);
        }
        // Not directly runnable: maybe a script missing its execute bit, or
        // any script at all on Windows.
        return shebang_to_cmd(&trial);
    }
    if platform::is_windows() {
        for ext in platform::WINDOWS_EXECUTABLE_EXTENSIONS {
            let trial_ext = dir.join(format!("{name}.{ext}"));
            if trial_ext.exists() {
                return Some(vec![trial_ext.to_string_lossy().into_owned()]);
            }
        }
    }
    None
}

fn search(name: &str, search_dir: Option<&Path>) -> Option<Vec<String>> {
    if let Some(dir) = search_dir
        && let Some(command) = search_in_dir(name, dir)
    {
        return Some(command);
    }

    let hit = which::which(name).ok();
    if !platform::is_windows() {
        // A plain search-path lookup finds everything on Unix-like platforms,
        // whether the name was bare or an absolute path.
        return hit.map(|path| vec![path.to_string_lossy().into_owned()]);
    }

    if let Some(command) = hit {
        if platform::has_executable_extension(&command) {
            return Some(vec![command.to_string_lossy().into_owned()]);
        }
        // The hit is not a native executable; interpreted scripts need an
        // explicit interpreter even when file associations exist.
        return shebang_to_cmd(&command);
    }

    let as_path = Path::new(name);
    if as_path.is_absolute() && as_path.extension().is_none() {
        for ext in platform::WINDOWS_EXECUTABLE_EXTENSIONS {
            let candidate = format!("{name}.{ext}");
            if Path::new(&candidate).exists() {
                return Some(vec![candidate]);
            }
        }
    }

    // Extensionless scripts cannot be found by a standard search-path lookup
    // on Windows, so walk each entry applying the shebang logic.
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        if let Some(command) = search_in_dir(name, &dir) {
            return Some(command);
        }
    }
    None
}
