//! Batch and page naming
//!
//! Batches live in `<content_dir>/<content_name>-<N>`, pages inside them are
//! called `page-<N>.<ext>`. Numbers are never stored anywhere: the next
//! batch or page number is the count of matching entries on disk.

use std::fs::read_dir;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{file_operation_error, not_found_error, Result};
use crate::registry::ProjectDescriptor;

static PAGE_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^page-([0-9]+)\.([^.]+)$")
        .expect("Failed to compile regex pattern for PAGE_INDEX")
});

pub fn batch_name(content_name: &str, batch_number: u32) -> String {
    format!("{content_name}-{batch_number}")
}

pub fn batch_dir(descriptor: &ProjectDescriptor, batch_number: u32) -> PathBuf {
    descriptor
        .content_dir
        .join(batch_name(&descriptor.content_name, batch_number))
}

pub fn page_name(page_number: u32, extension: &str) -> String {
    format!("page-{page_number}.{extension}")
}

/// Pattern matching the batch directories of a content name
///
/// Only the prefix is anchored, so `comic-3-old` counts as a batch too.
pub fn content_regex(content_name: &str) -> Regex {
    Regex::new(&format!("^{}-[0-9]+", regex::escape(content_name)))
        .expect("an escaped literal followed by a fixed suffix is a valid pattern")
}

/// Pattern matching pages with the given extension
pub fn page_regex(extension: &str) -> Regex {
    Regex::new(&format!("^page-[0-9]+\\.{}$", regex::escape(extension)))
        .expect("an escaped literal inside a fixed pattern is a valid pattern")
}

/// Extract N from `page-N.<extension>`
pub fn page_index(file_name: &str, extension: &str) -> Option<u32> {
    let captures = PAGE_INDEX.captures(file_name)?;
    if &captures[2] != extension {
        return None;
    }
    captures[1].parse().ok()
}

/// Count the entries of `dir` whose file name matches `pattern`
pub fn count_matches(dir: &Path, pattern: &Regex) -> Result<u32> {
    let entries = read_dir(dir)
        .map_err(|e| file_operation_error(e, dir.to_path_buf(), "read directory"))?;

    let count = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| pattern.is_match(name))
        })
        .count();

    Ok(count as u32)
}

/// Number the next batch would get
pub fn next_batch_number(descriptor: &ProjectDescriptor) -> Result<u32> {
    count_matches(
        &descriptor.content_dir,
        &content_regex(&descriptor.content_name),
    )
}

/// Number of the most recent batch, i.e. the batch count minus one
pub fn latest_batch_number(descriptor: &ProjectDescriptor) -> Result<u32> {
    let count = next_batch_number(descriptor)?;
    count.checked_sub(1).ok_or_else(|| {
        not_found_error(
            "batch",
            &format!(
                "project <{}> has no batches in <{}>",
                descriptor.name(),
                descriptor.content_dir.display()
            ),
        )
    })
}

/// Number the next page in a batch directory would get
pub fn next_page_number(batch_dir: &Path, extension: &str) -> Result<u32> {
    count_matches(batch_dir, &page_regex(extension))
}
