//! Cross-Platform Path Utilities
//!
//! Resolves the per-user CareWise directory (~/.carewise/).

use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the CareWise directory (~/.carewise/)
pub fn carewise_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".carewise"))
}

/// Get the default config file path (~/.carewise/config.toml)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(carewise_dir()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_under_carewise_dir() {
        if let (Ok(dir), Ok(path)) = (carewise_dir(), config_path()) {
            assert!(dir.ends_with(".carewise"));
            assert_eq!(path.parent(), Some(dir.as_path()));
            assert!(path.ends_with("config.toml"));
        }
    }
}
