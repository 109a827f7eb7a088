//! Process-wide system information
//!
//! [`SystemInfo`] is built once at start-up and passed explicitly to every
//! operation. Besides the configuration it carries the knot working
//! directory, which is persisted in a scratch file in the temp directory so
//! that it survives between invocations independently of the shell's
//! working directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_FILE, PROJECTS_FILE, SCRATCH_FILE, SCRIPT_FILE, TEMPLATES_DIR};
use crate::errors::{config_parsing_error, file_operation_error, Result};

use super::loader::{find_config_dir, load_config};
use super::model::{Config, Tools};
use super::script::load_script;

/// Content of the scratch file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct KnotState {
    #[serde(rename = "KnotWD")]
    pub knot_wd: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub projects_file: PathBuf,
    pub template_dir: PathBuf,
    pub scratch_file: PathBuf,
    pub config: Config,
    pub tools: Tools,
    /// The tool's notion of the current directory
    pub knot_wd: PathBuf,
}

impl SystemInfo {
    /// Builds the system information from the platform directories
    pub fn load() -> Result<SystemInfo> {
        let config_dir = find_config_dir()?;
        SystemInfo::from_dirs(&config_dir, &env::temp_dir())
    }

    /// Builds the system information from explicit directories
    pub fn from_dirs(config_dir: &Path, scratch_dir: &Path) -> Result<SystemInfo> {
        let config_file = config_dir.join(CONFIG_FILE);
        let scratch_file = scratch_dir.join(SCRATCH_FILE);

        let mut config = load_config(&config_file);
        let bindings = load_script(&config_dir.join(SCRIPT_FILE), &mut config);
        let mut tools = Tools::from_config(&config);
        tools.bind(bindings);
        let knot_wd = read_knot_wd(&scratch_file)?;
        debug!("Knot working directory: {}", knot_wd.display());

        Ok(SystemInfo {
            config_dir: config_dir.to_path_buf(),
            config_file,
            projects_file: config_dir.join(PROJECTS_FILE),
            template_dir: config_dir.join(TEMPLATES_DIR),
            scratch_file,
            config,
            tools,
            knot_wd,
        })
    }

    /// Directory of the template set called `template_name`
    pub fn template_path(&self, template_name: &str) -> PathBuf {
        self.template_dir.join(template_name)
    }

    /// Persists a new knot working directory
    ///
    /// Relative paths are resolved against the process working directory.
    pub fn set_knot_wd(&mut self, dir: &Path) -> Result<()> {
        let absolute = std::path::absolute(dir)
            .map_err(|e| file_operation_error(e, dir.to_path_buf(), "resolve"))?;

        let state = KnotState {
            knot_wd: absolute.clone(),
        };
        let content = serde_json::to_string_pretty(&state)
            .map_err(|e| config_parsing_error(e, "Failed to serialise knot state"))?;
        fs::write(&self.scratch_file, content)
            .map_err(|e| file_operation_error(e, self.scratch_file.clone(), "write"))?;

        debug!("Knot working directory set to {}", absolute.display());
        self.knot_wd = absolute;
        Ok(())
    }
}

/// Reads the persisted knot working directory, falling back to the process
/// working directory when the scratch file is absent or unparsable
fn read_knot_wd(scratch_file: &Path) -> Result<PathBuf> {
    let persisted = fs::read_to_string(scratch_file)
        .ok()
        .and_then(|content| serde_json::from_str::<KnotState>(&content).ok());

    match persisted {
        Some(state) => Ok(state.knot_wd),
        None => env::current_dir()
            .map_err(|e| file_operation_error(e, PathBuf::from("."), "determine current directory")),
    }
}
