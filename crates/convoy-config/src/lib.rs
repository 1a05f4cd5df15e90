//! Infrastructure file discovery

pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the infrastructure file directly.
pub const CONFIG_PATH_ENV: &str = "CONVOY_CONFIG_PATH";

/// File names tried in each searched directory, in priority order.
pub const CANDIDATES: [&str; 4] = [
    "convoy.local.yml",
    "convoy.yml",
    "convoy.yaml",
    "infrastructure.yml",
];

fn first_candidate(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Locates the infrastructure file.
///
/// Search order:
/// 1. `explicit` (must exist)
/// 2. `CONVOY_CONFIG_PATH`, when it points at an existing file
/// 3. the working directory: [`CANDIDATES`]
/// 4. `./.convoy/`: same names
/// 5. `<user config dir>/convoy/convoy.yml`
pub fn find_infrastructure_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(DiscoveryError::ExplicitPathMissing(path.to_path_buf()));
    }

    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            debug!(path = %path.display(), "Using {}", CONFIG_PATH_ENV);
            return Ok(path);
        }
        debug!(path = %path.display(), "{} points at nothing, searching", CONFIG_PATH_ENV);
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = first_candidate(&current_dir) {
        return Ok(path);
    }

    let convoy_dir = current_dir.join(".convoy");
    if convoy_dir.is_dir()
        && let Some(path) = first_candidate(&convoy_dir)
    {
        return Ok(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("convoy").join("convoy.yml");
        if global.is_file() {
            return Ok(global);
        }
    }

    Err(DiscoveryError::NotFound)
}
