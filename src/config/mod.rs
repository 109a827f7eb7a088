//! Configuration module
//!
//! This module contains the user configuration, the platform directories
//! and the per-invocation system information built from them.

mod loader;
mod model;
mod script;
mod system;

pub use loader::{find_config_dir, load_config};
pub use model::{CommandSetting, Config, Tools, TOOL_NAMES};
pub use script::{load_script, ScriptBinding};
pub use system::{KnotState, SystemInfo};
