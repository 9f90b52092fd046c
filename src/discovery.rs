use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

pub(crate) const ENGINE_ENV: &str = "OAK_ENGINE";
pub(crate) const ENGINE_BINARY: &str = "redwood";
const LOCAL_BUILD: &str = "zig-out/bin/redwood";

/// Where the engine may come from, in lookup order.
struct SearchInputs<'a> {
    explicit: Option<&'a Path>,
    env_engine: Option<OsString>,
    path_var: Option<OsString>,
    cwd: &'a Path,
}

/// Resolves the engine binary: explicit argument, then `OAK_ENGINE`, then `redwood` on `PATH`,
/// then `./zig-out/bin/redwood`.
pub(crate) fn discover_engine(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    locate(SearchInputs {
        explicit,
        env_engine: std::env::var_os(ENGINE_ENV),
        path_var: std::env::var_os("PATH"),
        cwd: &cwd,
    })
}

fn locate(inputs: SearchInputs<'_>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = inputs.explicit {
        return checked(path.to_path_buf());
    }
    if let Some(raw) = inputs.env_engine.filter(|v| !v.is_empty()) {
        return checked(PathBuf::from(raw));
    }

    let mut searched = Vec::new();
    if let Some(found) = inputs
        .path_var
        .as_deref()
        .and_then(|p| command_on_path(ENGINE_BINARY, p))
    {
        tracing::debug!(engine = %found.display(), "engine found on PATH");
        return Ok(found);
    }
    searched.push(format!("{ENGINE_BINARY} on PATH"));

    let local = inputs.cwd.join(LOCAL_BUILD);
    if is_executable(&local) {
        return Ok(local);
    }
    searched.push(local.display().to_string());

    Err(ConfigError::EngineNotFound { searched })
}

fn checked(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if is_executable(&path) {
        Ok(path)
    } else {
        Err(ConfigError::EngineNotExecutable(path))
    }
}

fn command_on_path(bin: &str, path_var: &std::ffi::OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(bin))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
