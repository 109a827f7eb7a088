//! Rasterizing native pages
//!
//! Every native page of a batch is turned into a PNG in the export directory
//! by the configured rasterizer. A PNG newer than its page is reused.
//!
//! Unless configured otherwise, the rasterizer copies the flattened image
//! that the native archive format carries next to its layers.

use std::fs::{read_dir, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use zip::ZipArchive;

use crate::constants::{MERGED_IMAGE, NATIVE_EXTENSION, RASTER_EXTENSION};
use crate::errors::{file_operation_error, generic_error, Result};
use crate::runner::CommandRunner;
use crate::utils::is_up_to_date;

/// Writes the flattened image of the page archive `source` to `target`
///
/// # Errors
/// Returns an error if `source` is not an archive holding a flattened
/// image or `target` cannot be written
pub fn extract_merged_image(source: &Path, target: &Path) -> Result<()> {
    let file =
        File::open(source).map_err(|e| file_operation_error(e, source.to_path_buf(), "open"))?;
    let not_a_page = |e: zip::result::ZipError| {
        generic_error(&format!(
            "<{}> has no {}: {}",
            source.display(),
            MERGED_IMAGE,
            e
        ))
    };

    let mut archive = ZipArchive::new(file).map_err(not_a_page)?;
    let mut merged = archive.by_name(MERGED_IMAGE).map_err(not_a_page)?;
    let mut output =
        File::create(target).map_err(|e| file_operation_error(e, target.to_path_buf(), "create"))?;
    io::copy(&mut merged, &mut output)
        .map_err(|e| file_operation_error(e, target.to_path_buf(), "write"))?;
    Ok(())
}

/// Rasterizer reading the flattened image out of the page archive
pub fn merged_image_rasterizer() -> CommandRunner {
    CommandRunner::callback(MERGED_IMAGE, |inputs| match inputs {
        [source, target] => {
            extract_merged_image(Path::new(source), Path::new(target))?;
            Ok(String::new())
        }
        _ => Err(generic_error(&format!(
            "expected a page and a target, got {inputs:?}"
        ))),
    })
}

/// Rasterizes one page unless its PNG is up to date
///
/// Returns whether the rasterizer actually ran.
pub fn rasterize_page(rasterizer: &CommandRunner, source: &Path, target: &Path) -> Result<bool> {
    if is_up_to_date(source, target) {
        debug!("{} is up to date", target.display());
        return Ok(false);
    }

    rasterizer.run(&[
        source.to_string_lossy().into_owned(),
        target.to_string_lossy().into_owned(),
    ])?;
    Ok(true)
}

/// Rasterizes every native file of `batch_path` into `export_path`
///
/// Pages that fail to rasterize are logged and skipped. Returns the number
/// of pages the rasterizer ran for.
///
/// # Errors
/// Returns an error only if the batch directory cannot be read
pub fn rasterize_batch(
    rasterizer: &CommandRunner,
    batch_path: &Path,
    export_path: &Path,
) -> Result<usize> {
    let sources: Vec<PathBuf> = read_dir(batch_path)
        .map_err(|e| file_operation_error(e, batch_path.to_path_buf(), "read directory"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(NATIVE_EXTENSION))
        .collect();

    let mut rasterized = 0;
    for source in sources {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let target = export_path.join(file_name).with_extension(RASTER_EXTENSION);

        match rasterize_page(rasterizer, &source, &target) {
            Ok(true) => rasterized += 1,
            Ok(false) => {}
            Err(e) => warn!("Skipping {}: {}", source.display(), e),
        }
    }

    Ok(rasterized)
}
