//! Workflow module
//!
//! This module contains components for orchestrating the workflow steps.

mod context;
mod engine;

pub use context::{Actions, WorkflowContext, WorkflowStats};
pub use engine::{run, run_with_output};
