//! Project module
//!
//! This module resolves the current project and materialises projects,
//! batches and pages on disk.

pub mod materialize;
pub mod resolver;

pub use materialize::{create_project, make_batch, make_page, CreateOutcome};
pub use resolver::{find_enclosing_project, new_descriptor, resolve, ProjectOptions};
