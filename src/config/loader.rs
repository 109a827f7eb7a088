//! Configuration loading functionality
//!
//! This module locates the platform configuration directory and loads the
//! optional user configuration from it.

use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{debug, warn};
use serde_yaml::from_str;

use crate::constants::{APPLICATION, ORGANIZATION, QUALIFIER};
use crate::errors::{file_operation_error, generic_error, Result};

use super::model::Config;

/// Returns the configuration directory, creating it if needed
///
/// # Errors
/// Returns an error if the home directory cannot be determined or the
/// directory cannot be created
pub fn find_config_dir() -> Result<PathBuf> {
    let folder = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| generic_error("Failed to determine project directories"))?;

    let config_dir = folder.config_dir().to_path_buf();
    if !config_dir.exists() {
        create_dir_all(&config_dir)
            .map_err(|e| file_operation_error(e, config_dir.clone(), "create directory"))?;
    }
    Ok(config_dir)
}

/// Loads the user configuration from `file`
///
/// The configuration is optional: a missing file gives the defaults, and so
/// does a file that cannot be read or parsed, after a warning.
pub fn load_config(file: &Path) -> Config {
    if !file.exists() {
        debug!("No configuration at {}, using defaults", file.display());
        return Config::default();
    }

    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                "Failed to read configuration file {}: {}. Using defaults.",
                file.display(),
                e
            );
            return Config::default();
        }
    };

    match from_str::<Option<Config>>(&content) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!(
                "Failed to parse configuration file {}: {}. Please check the YAML syntax; using defaults.",
                file.display(),
                e
            );
            Config::default()
        }
    }
}
