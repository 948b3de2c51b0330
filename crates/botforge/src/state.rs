//! Cache-path and project-root resolution.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const APP_DIR: &str = "botforge";

/// Resolve the flat cache directory, in order: `BOTFORGE_CACHE_DIR`,
/// `XDG_CACHE_HOME/botforge`, `~/.cache/botforge`.
pub fn cache_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("BOTFORGE_CACHE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = env::var_os("XDG_CACHE_HOME") {
        let xdg = PathBuf::from(xdg);
        if xdg.is_absolute() {
            return Ok(xdg.join(APP_DIR));
        }
    }
    let home = home::home_dir().context("unable to resolve the user home directory")?;
    Ok(home.join(".cache").join(APP_DIR))
}

/// Walk upwards from `start` until a directory containing `marker`
/// appears; robot projects are recognized by their `vendordeps/` dir.
pub fn find_project_root(start: &Path, marker: &str) -> Result<PathBuf> {
    let mut current = start
        .canonicalize()
        .with_context(|| format!("unable to resolve '{}'", start.display()))?;
    loop {
        if current.join(marker).exists() {
            return Ok(current);
        }
        if !current.pop() {
            bail!("'{marker}' not found in '{}' or any parent", start.display());
        }
    }
}
