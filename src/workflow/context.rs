//! Workflow context
//!
//! This module defines the requested actions and the state shared by the
//! workflow steps of one invocation.

use std::path::PathBuf;

use log::debug;

use crate::config::SystemInfo;
use crate::errors::{not_in_project_error, Result};
use crate::project::{resolve, ProjectOptions};
use crate::registry::{ProjectDescriptor, Registry};

/// Actions requested on the command line
///
/// Several actions may be combined; they run in the order of the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions {
    /// Never open created or exported files
    pub silent: bool,
    /// Options describing the current or new project
    pub project: ProjectOptions,
    pub next_batch: bool,
    pub new_batch: Option<u32>,
    /// Add a page to the latest batch
    pub next_page: bool,
    /// Add a page to the given batch
    pub page_in: Option<u32>,
    pub export_latest: bool,
    pub export_batch: Option<u32>,
    /// Project name or path to remove from the registry
    pub deregister: Option<String>,
    /// Project name or path to open
    pub open_project: Option<String>,
    /// Batch of the current project to open, regardless of `silent`
    pub open_batch: Option<u32>,
    pub list: bool,
    pub print_wd: bool,
    pub set_wd: Option<PathBuf>,
}

impl Actions {
    /// Whether created and exported files are opened
    pub fn open(&self) -> bool {
        !self.silent
    }

    /// Whether any action needs the current project
    pub fn needs_project(&self) -> bool {
        self.project.init_name.is_some()
            || self.next_batch
            || self.new_batch.is_some()
            || self.next_page
            || self.page_in.is_some()
            || self.export_latest
            || self.export_batch.is_some()
            || self.open_batch.is_some()
    }
}

/// Statistics about one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowStats {
    pub batches_created: usize,
    pub pages_created: usize,
    pub batches_exported: usize,
}

/// State shared by the workflow steps
pub struct WorkflowContext<'a> {
    pub system: &'a mut SystemInfo,
    pub registry: Registry,
    pub stats: WorkflowStats,
    project: Option<ProjectDescriptor>,
    resolved_in: PathBuf,
}

impl<'a> WorkflowContext<'a> {
    /// Loads the registry and resolves the current project
    ///
    /// A project that cannot be resolved is not an error yet: it only
    /// becomes one when a step asks for it.
    pub fn new(actions: &Actions, system: &'a mut SystemInfo) -> Result<Self> {
        let registry = Registry::load(&system.projects_file)?;
        let resolved_in = system.knot_wd.clone();

        let project = match resolve(&actions.project, &resolved_in, &registry) {
            Ok(project) => Some(project),
            Err(e) => {
                debug!("No current project: {e}");
                None
            }
        };

        Ok(WorkflowContext {
            system,
            registry,
            stats: WorkflowStats::default(),
            project,
            resolved_in,
        })
    }

    /// The current project
    ///
    /// # Errors
    /// Returns `NotInProject` if the knot working directory was not inside
    /// a registered project
    pub fn project(&self) -> Result<&ProjectDescriptor> {
        self.project
            .as_ref()
            .ok_or_else(|| not_in_project_error(self.resolved_in.clone()))
    }

    /// Template set directory of the current project
    pub fn template_path(&self) -> Result<PathBuf> {
        let project = self.project()?;
        Ok(self.system.template_path(&project.template_name))
    }
}
