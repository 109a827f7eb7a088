//! Export module
//!
//! Turns a batch into a single PDF: native pages are rasterized into the
//! batch's export directory, the `page-N.png` images are assembled in page
//! order, and the result is optionally compressed.

mod compress;
mod pdf;
mod rasterize;

use std::fs::read_dir;
use std::path::{Path, PathBuf};

use log::{info, warn};

pub use compress::{compress_pdf, CompressionLevel};
pub use pdf::{assemble_pdf, fit_to_page};
pub use rasterize::{extract_merged_image, merged_image_rasterizer, rasterize_batch, rasterize_page};

use crate::config::SystemInfo;
use crate::constants::{DOCUMENT_EXTENSION, RASTER_EXTENSION};
use crate::errors::{file_operation_error, not_found_error, Result};
use crate::naming::{batch_dir, page_index};
use crate::registry::ProjectDescriptor;
use crate::utils::{ensure_dir_exists, file_name_str};

/// Exports batch `batch_number` and returns the path of the PDF
///
/// # Errors
/// * Returns an error if the batch directory does not exist
/// * Returns an error if the export directory cannot be created
/// * Returns an error if no page could be rasterized or the PDF cannot be
///   written
pub fn export_batch(
    batch_number: u32,
    descriptor: &ProjectDescriptor,
    system: &SystemInfo,
) -> Result<PathBuf> {
    let batch_path = batch_dir(descriptor, batch_number);
    if !batch_path.is_dir() {
        return Err(not_found_error(
            "batch",
            &format!("<{}> does not exist", batch_path.display()),
        ));
    }

    let export_path = batch_path.join(&descriptor.export_dir_name);
    ensure_dir_exists(&export_path)?;

    let rasterized = rasterize_batch(&system.tools.rasterizer, &batch_path, &export_path)?;
    info!("Rasterized {rasterized} pages of {}", batch_path.display());

    let images = collect_page_images(&export_path)?;
    let output = batch_path.join(format!(
        "{}.{}",
        file_name_str(&batch_path)?,
        DOCUMENT_EXTENSION
    ));
    assemble_pdf(&images, &output)?;
    info!("Exported {} pages to {}", images.len(), output.display());

    if let Some(level) = system.config.compression_level() {
        if let Err(e) = compress_pdf(&system.tools.compressor, &output, level) {
            warn!("Keeping uncompressed {}: {}", output.display(), e);
        }
    }

    Ok(output)
}

/// Rasterized pages of an export directory, ordered by page number
fn collect_page_images(export_path: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = read_dir(export_path)
        .map_err(|e| file_operation_error(e, export_path.to_path_buf(), "read directory"))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let index = page_index(entry.file_name().to_str()?, RASTER_EXTENSION)?;
            Some((index, entry.path()))
        })
        .collect();
    pages.sort_by_key(|(index, _)| *index);

    Ok(pages.into_iter().map(|(_, path)| path).collect())
}
