//! Creating projects, batches and pages from templates
//!
//! A template set is a directory holding a `batch` subdirectory. Every new
//! batch is a copy of it whose seed `page.kra` is renamed to `page-0.kra`;
//! every new page is a copy of that seed page.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::SystemInfo;
use crate::constants::{NATIVE_EXTENSION, TEMPLATE_BATCH_DIR, TEMPLATE_PAGE};
use crate::dispatch::open_best_effort;
use crate::errors::{not_found_error, Result};
use crate::naming::{batch_dir, next_page_number, page_name};
use crate::registry::ProjectDescriptor;
use crate::utils::{copy_dir, copy_file, ensure_dir_exists, move_file};

/// What `create_project` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Directories and the first batch were created
    Created,
    /// The directory existed already and is only going to be registered
    Registered,
}

/// Creates batch `batch_number` from the template and returns its seed page
///
/// # Errors
/// * Returns an error if the template batch directory is missing
/// * Returns an error if the batch directory already exists
/// * Returns an error if copying fails; a partial copy is left on disk
pub fn make_batch(
    template_path: &Path,
    descriptor: &ProjectDescriptor,
    batch_number: u32,
    open: bool,
    system: &SystemInfo,
) -> Result<PathBuf> {
    let template_batch_dir = template_path.join(TEMPLATE_BATCH_DIR);
    let new_batch_dir = batch_dir(descriptor, batch_number);

    copy_dir(&template_batch_dir, &new_batch_dir)?;

    let seed_page = new_batch_dir.join(page_name(0, NATIVE_EXTENSION));
    move_file(&new_batch_dir.join(TEMPLATE_PAGE), &seed_page)?;
    info!("Created batch {}", new_batch_dir.display());

    open_best_effort(system, &seed_page, open);
    Ok(seed_page)
}

/// Adds the next page to batch `batch_number` and returns its path
///
/// The page number is the count of existing pages, so after a page was
/// deleted from the middle of a batch the new page takes the number of the
/// last one and replaces it.
pub fn make_page(
    template_path: &Path,
    descriptor: &ProjectDescriptor,
    batch_number: u32,
    open: bool,
    system: &SystemInfo,
) -> Result<PathBuf> {
    let batch_path = batch_dir(descriptor, batch_number);
    let page_number = next_page_number(&batch_path, NATIVE_EXTENSION)?;
    let new_page = batch_path.join(page_name(page_number, NATIVE_EXTENSION));

    let template_page = template_path.join(TEMPLATE_BATCH_DIR).join(TEMPLATE_PAGE);
    if !template_page.is_file() {
        return Err(not_found_error(
            "template page",
            &format!("<{}> does not exist", template_page.display()),
        ));
    }

    if new_page.exists() {
        warn!(
            "{} already exists and is replaced by a blank page",
            new_page.display()
        );
    }
    copy_file(&template_page, &new_page)?;
    info!("Created page {}", new_page.display());

    open_best_effort(system, &new_page, open);
    Ok(new_page)
}

/// Creates the project directories and its first batch
///
/// An existing project directory is left untouched so that it can be
/// adopted into the registry.
pub fn create_project(
    template_path: &Path,
    descriptor: &ProjectDescriptor,
    open: bool,
    system: &SystemInfo,
) -> Result<CreateOutcome> {
    if descriptor.project_dir.exists() {
        info!(
            "Directory <{}> already exists. Assuming you simply want to register it instead of creating a new project",
            descriptor.project_dir.display()
        );
        return Ok(CreateOutcome::Registered);
    }

    ensure_dir_exists(&descriptor.project_dir)?;
    ensure_dir_exists(&descriptor.content_dir)?;

    make_batch(template_path, descriptor, 0, open, system)?;
    Ok(CreateOutcome::Created)
}
