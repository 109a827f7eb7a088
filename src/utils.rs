use std::fs::{self, create_dir_all};
use std::io;
use std::path::Path;

use fs_extra::dir::CopyOptions as DirCopyOptions;
use fs_extra::file::CopyOptions as FileCopyOptions;

use crate::errors::{
    already_exists_error, file_operation_error, invalid_filename_error, not_found_error,
    path_operation_error, Result,
};

/// Creates `dir` and its parents unless it already exists
pub fn ensure_dir_exists(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        create_dir_all(dir)
            .map_err(|e| file_operation_error(e, dir.to_path_buf(), "create directory"))?;
    }
    Ok(())
}

/// Recursively copies the contents of `src` into the new directory `dst`
///
/// # Errors
/// * Returns an error if `src` is missing or `dst` already exists
/// * Returns an error if any file fails to copy; files copied before the
///   failure are left in place
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(not_found_error(
            "template",
            &format!("directory <{}> does not exist", src.display()),
        ));
    }
    if dst.exists() {
        return Err(already_exists_error(dst.to_path_buf()));
    }

    ensure_dir_exists(dst)?;

    let mut options = DirCopyOptions::new();
    options.content_only = true;
    fs_extra::dir::copy(src, dst, &options)
        .map_err(|e| file_operation_error(io::Error::other(e), src.to_path_buf(), "copy"))?;
    Ok(())
}

/// Copies the regular file `src` to `dst`, replacing `dst` if it exists
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    if !src.is_file() {
        return Err(not_found_error(
            "file",
            &format!("<{}> is not a regular file", src.display()),
        ));
    }

    let options = FileCopyOptions::new().overwrite(true);
    fs_extra::file::copy(src, dst, &options)
        .map_err(|e| file_operation_error(io::Error::other(e), src.to_path_buf(), "copy"))
}

/// Renames `src` to `dst`
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    fs::rename(src, dst).map_err(|e| file_operation_error(e, src.to_path_buf(), "move"))
}

/// Gets the file name of `path` as a string
pub fn file_name_str(path: &Path) -> Result<&str> {
    path.file_name()
        .ok_or_else(|| path_operation_error(path.to_path_buf(), "get filename"))
        .and_then(|os_str| {
            os_str
                .to_str()
                .ok_or_else(|| invalid_filename_error(path.to_path_buf()))
        })
}

/// Whether `derived` exists and was modified after `source`
pub fn is_up_to_date(source: &Path, derived: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();

    match (modified(source), modified(derived)) {
        (Some(source_time), Some(derived_time)) => source_time < derived_time,
        _ => false,
    }
}
