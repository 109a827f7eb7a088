//! Project resolution
//!
//! The current project is either built fresh from the command-line options
//! (when initialising) or found by walking up from the knot working
//! directory until a registered project directory is hit.

use std::path::Path;

use log::debug;

use crate::constants::{DEFAULT_EXPORT_DIR, DEFAULT_TEMPLATE};
use crate::errors::{not_in_project_error, Result};
use crate::registry::{missing_project_error, ProjectDescriptor, Registry};

/// Project related command-line options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Name of a project to initialise in the knot working directory
    pub init_name: Option<String>,
    /// Content subdirectory, empty for the project directory itself
    pub content_dir_name: String,
    /// Base name of batches, defaults to the project name
    pub content_name: Option<String>,
    pub export_dir_name: String,
    pub template_name: String,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        ProjectOptions {
            init_name: None,
            content_dir_name: String::new(),
            content_name: None,
            export_dir_name: DEFAULT_EXPORT_DIR.to_string(),
            template_name: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Resolves the project the invocation works on
///
/// # Errors
/// Returns `NotInProject` when no init name is given and no registered
/// project encloses `knot_wd`
pub fn resolve(
    options: &ProjectOptions,
    knot_wd: &Path,
    registry: &Registry,
) -> Result<ProjectDescriptor> {
    match &options.init_name {
        Some(name) => Ok(new_descriptor(name, options, knot_wd)),
        None => find_enclosing_project(knot_wd, registry),
    }
}

/// Builds the descriptor of a project about to be created in `knot_wd`
pub fn new_descriptor(name: &str, options: &ProjectOptions, knot_wd: &Path) -> ProjectDescriptor {
    let project_dir = knot_wd.join(name);
    let content_dir = if options.content_dir_name.is_empty() {
        project_dir.clone()
    } else {
        project_dir.join(&options.content_dir_name)
    };
    let content_name = options
        .content_name
        .clone()
        .filter(|content_name| !content_name.is_empty())
        .unwrap_or_else(|| name.to_string());

    ProjectDescriptor {
        project_dir,
        content_dir,
        content_name,
        export_dir_name: options.export_dir_name.clone(),
        template_name: options.template_name.clone(),
    }
}

/// Finds the nearest registered project containing `dir`
///
/// `dir` itself is checked first, then each parent in turn, so a project
/// nested inside another one wins over its parent.
pub fn find_enclosing_project(dir: &Path, registry: &Registry) -> Result<ProjectDescriptor> {
    let by_directory = registry.by_directory();

    for candidate in dir.ancestors() {
        if let Some(name) = by_directory.get(candidate) {
            debug!("{} is inside project <{}>", dir.display(), name);
            return registry
                .get(name)
                .cloned()
                .ok_or_else(|| missing_project_error(name));
        }
    }

    Err(not_in_project_error(dir.to_path_buf()))
}
