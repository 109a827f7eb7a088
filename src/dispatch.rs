//! Opening files for the user
//!
//! The action is picked by extension: native pages go to the image editor,
//! exported documents to the PDF viewer, and paths without an extension are
//! treated as directories for the file browser. Programs are started and
//! left running.

use std::fs::read_dir;
use std::path::Path;

use log::{debug, info, warn};

use crate::config::SystemInfo;
use crate::constants::{DOCUMENT_EXTENSION, NATIVE_EXTENSION};
use crate::errors::{file_operation_error, not_found_error, unsupported_file_type_error, Result};
use crate::naming::{batch_dir, page_index};
use crate::registry::ProjectDescriptor;
use crate::runner::CommandRunner;

/// Selects the runner opening `path`
pub fn runner_for<'a>(system: &'a SystemInfo, path: &Path) -> Result<&'a CommandRunner> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(NATIVE_EXTENSION) => Ok(&system.tools.image_editor),
        Some(DOCUMENT_EXTENSION) => Ok(&system.tools.pdf_viewer),
        None => Ok(&system.tools.file_browser),
        Some(other) => Err(unsupported_file_type_error(&format!(".{other}"))),
    }
}

/// Opens `path` with the matching program; does nothing unless `open`
pub fn open_file(system: &SystemInfo, path: &Path, open: bool) -> Result<()> {
    if !open {
        return Ok(());
    }

    let runner = runner_for(system, path)?;
    debug!("Opening {} with {}", path.display(), runner.name());
    runner.start(&[path.to_string_lossy().into_owned()])
}

/// Opens `path` like [`open_file`], only logging a failure
pub fn open_best_effort(system: &SystemInfo, path: &Path, open: bool) {
    if let Err(e) = open_file(system, path, open) {
        warn!("Could not open {}: {}", path.display(), e);
    }
}

/// Opens every native page of a batch in one image editor instance
pub fn open_pages_in_batch(
    system: &SystemInfo,
    descriptor: &ProjectDescriptor,
    batch_number: u32,
    open: bool,
) -> Result<()> {
    if !open {
        return Ok(());
    }

    let batch_path = batch_dir(descriptor, batch_number);
    if !batch_path.is_dir() {
        return Err(not_found_error(
            "batch",
            &format!("<{}> does not exist", batch_path.display()),
        ));
    }

    let mut pages: Vec<(u32, String)> = read_dir(&batch_path)
        .map_err(|e| file_operation_error(e, batch_path.clone(), "read directory"))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let index = page_index(entry.file_name().to_str()?, NATIVE_EXTENSION)?;
            Some((index, entry.path().to_string_lossy().into_owned()))
        })
        .collect();
    pages.sort_by_key(|(index, _)| *index);
    let pages: Vec<String> = pages.into_iter().map(|(_, page)| page).collect();

    info!(
        "Opening {} pages of {}",
        pages.len(),
        batch_path.display()
    );
    system.tools.image_editor.start(&pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    use crate::errors::generic_error;

    struct Fixture {
        _config: TempDir,
        _scratch: TempDir,
        system: SystemInfo,
        opened: Rc<RefCell<Vec<(String, Vec<String>)>>>,
    }

    fn recorder(name: &str, log: &Rc<RefCell<Vec<(String, Vec<String>)>>>) -> CommandRunner {
        let log = Rc::clone(log);
        let label = name.to_string();
        CommandRunner::callback(name, move |inputs| {
            log.borrow_mut().push((label.clone(), inputs.to_vec()));
            Ok(String::new())
        })
    }

    fn fixture() -> Fixture {
        let config = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let mut system = SystemInfo::from_dirs(config.path(), scratch.path()).unwrap();
        let opened = Rc::new(RefCell::new(Vec::new()));
        system.tools.image_editor = recorder("editor", &opened);
        system.tools.pdf_viewer = recorder("viewer", &opened);
        system.tools.file_browser = recorder("browser", &opened);
        Fixture {
            _config: config,
            _scratch: scratch,
            system,
            opened,
        }
    }

    #[test]
    fn test_open_dispatches_by_extension() {
        let f = fixture();
        open_file(&f.system, Path::new("/p/comic-0/page-0.kra"), true).unwrap();
        open_file(&f.system, Path::new("/p/comic-0/comic-0.pdf"), true).unwrap();
        open_file(&f.system, Path::new("/p"), true).unwrap();

        let names: Vec<String> = f.opened.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["editor", "viewer", "browser"]);
        assert_eq!(f.opened.borrow()[1].1, vec!["/p/comic-0/comic-0.pdf".to_string()]);
    }

    #[test]
    fn test_unsupported_extension() {
        let f = fixture();
        let result = open_file(&f.system, Path::new("/p/notes.txt"), true);
        assert!(matches!(
            result,
            Err(crate::errors::Error::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn test_silent_open_is_a_no_op() {
        let f = fixture();
        open_file(&f.system, Path::new("/p/notes.txt"), false).unwrap();
        open_file(&f.system, Path::new("/p/page-0.kra"), false).unwrap();
        assert!(f.opened.borrow().is_empty());
    }

    #[test]
    fn test_best_effort_open_only_logs() {
        let mut f = fixture();
        f.system.tools.pdf_viewer =
            CommandRunner::callback("viewer", |_| Err(generic_error("evince not installed")));

        open_best_effort(&f.system, Path::new("/p/comic-0/comic-0.pdf"), true);
        open_best_effort(&f.system, Path::new("/p/notes.txt"), true);
        assert!(f.opened.borrow().is_empty());
    }

    #[test]
    fn test_open_pages_in_batch() {
        let f = fixture();
        let content = tempdir().unwrap();
        let batch = content.path().join("comic-1");
        fs::create_dir(&batch).unwrap();
        for name in ["page-10.kra", "page-2.kra", "page-0.kra", "page-0.png", "notes.txt"] {
            fs::write(batch.join(name), b"").unwrap();
        }

        let descriptor = ProjectDescriptor {
            project_dir: content.path().to_path_buf(),
            content_dir: content.path().to_path_buf(),
            content_name: "comic".to_string(),
            export_dir_name: "export".to_string(),
            template_name: "default".to_string(),
        };
        open_pages_in_batch(&f.system, &descriptor, 1, true).unwrap();

        let opened = f.opened.borrow();
        assert_eq!(opened.len(), 1);
        let files: Vec<PathBuf> = opened[0].1.iter().map(PathBuf::from).collect();
        assert_eq!(
            files,
            vec![
                batch.join("page-0.kra"),
                batch.join("page-2.kra"),
                batch.join("page-10.kra"),
            ]
        );

        assert!(open_pages_in_batch(&f.system, &descriptor, 7, true).is_err());
    }
}
