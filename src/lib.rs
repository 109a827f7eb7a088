//! Organises drawing projects into numbered batches of pages
//!
//! A project is a directory registered under its name. Inside it, batches
//! (`<content>-0`, `<content>-1`, ...) are created from a template set, pages
//! (`page-0.kra`, `page-1.kra`, ...) are added to batches, and a batch can be
//! exported into a single PDF.

pub mod cli;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod export;
pub mod logging;
pub mod naming;
pub mod project;
pub mod registry;
pub mod runner;
pub mod utils;
pub mod workflow;
