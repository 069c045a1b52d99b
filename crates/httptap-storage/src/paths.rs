//! Path utilities for httptap directory resolution.

use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Base directory relative to the user's home.
const HTTPTAP_DIR: &str = ".config/httptap";

/// Subdirectory holding one JSON file per record.
pub const LOGS_DIR: &str = "logs";

/// Environment variable to override the base directory.
pub const HTTPTAP_DIR_ENV: &str = "HTTPTAP_DIR";

/// Resolve the httptap base directory.
/// Priority: explicit path > HTTPTAP_DIR env var > ~/.config/httptap/
pub fn resolve_base_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_base_dir_from(
        explicit,
        std::env::var(HTTPTAP_DIR_ENV).ok(),
        dirs::home_dir(),
    )
}

pub(crate) fn resolve_base_dir_from(
    explicit: Option<&Path>,
    env_dir: Option<String>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_dir
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(HTTPTAP_DIR))
        .ok_or_else(|| StoreError::StorageUnavailable {
            path: PathBuf::from(HTTPTAP_DIR),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "failed to determine home directory",
            ),
        })
}
