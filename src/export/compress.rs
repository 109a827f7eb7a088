//! PDF compression through ghostscript

use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::errors::{file_operation_error, path_operation_error, Result};
use crate::runner::CommandRunner;

/// Quality preset handed to the compressor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Ghostscript's general purpose preset
    #[default]
    Default = 0,
    Prepress = 1,
    Ebook = 2,
}

impl CompressionLevel {
    /// Maps the configured integer, anything unknown is `Default`
    pub fn from_int(level: i64) -> Self {
        match level {
            1 => CompressionLevel::Prepress,
            2 => CompressionLevel::Ebook,
            _ => CompressionLevel::Default,
        }
    }

    /// Value of ghostscript's `-dPDFSETTINGS`
    pub fn gs_setting(&self) -> &'static str {
        match self {
            CompressionLevel::Default => "/default",
            CompressionLevel::Prepress => "/prepress",
            CompressionLevel::Ebook => "/ebook",
        }
    }
}

/// Compresses `file` in place
///
/// The compressor writes into a temporary file in the same directory, which
/// replaces `file` once the compressor succeeded. On failure `file` is left
/// as it was.
///
/// The compressor receives three inputs: the quality setting, the output
/// path and the input path.
pub fn compress_pdf(compressor: &CommandRunner, file: &Path, level: CompressionLevel) -> Result<()> {
    let dir = file
        .parent()
        .ok_or_else(|| path_operation_error(file.to_path_buf(), "get parent directory"))?;
    let temp = NamedTempFile::new_in(dir)
        .map_err(|e| file_operation_error(e, dir.to_path_buf(), "create temporary file"))?;

    debug!(
        "Compressing {} with {} into {}",
        file.display(),
        level.gs_setting(),
        temp.path().display()
    );
    compressor.run(&[
        level.gs_setting().to_string(),
        temp.path().to_string_lossy().into_owned(),
        file.to_string_lossy().into_owned(),
    ])?;

    temp.persist(file)
        .map_err(|e| file_operation_error(e.error, file.to_path_buf(), "replace"))?;
    info!("Compressed {}", file.display());
    Ok(())
}
