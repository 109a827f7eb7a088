//! Project registry
//!
//! The registry maps a project name (the basename of its directory) to the
//! project's descriptor and is stored as indented JSON in the configuration
//! directory. It is rewritten in full on every save without any locking, so
//! two concurrent invocations race and the last writer wins.

use std::collections::btree_map::{BTreeMap, Iter};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{config_parsing_error, file_operation_error, not_found_error, Result};

/// Identifies one project on disk
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectDescriptor {
    /// Absolute path of the project; its basename is the registry key
    pub project_dir: PathBuf,
    /// Directory holding the batches, possibly equal to `project_dir`
    pub content_dir: PathBuf,
    /// Base name of batch directories
    pub content_name: String,
    /// Subdirectory of a batch receiving rasterized pages
    pub export_dir_name: String,
    /// Template set used for new batches and pages
    pub template_name: String,
}

impl ProjectDescriptor {
    /// Registry key of the project
    pub fn name(&self) -> String {
        self.project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Persisted mapping from project name to descriptor
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Registry {
    projects: BTreeMap<String, ProjectDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry from `file`
    ///
    /// A missing file yields an empty registry, so the first run of the
    /// tool works without any setup.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(file: &Path) -> Result<Registry> {
        if !file.exists() {
            debug!("No registry at {}, starting empty", file.display());
            return Ok(Registry::new());
        }

        let content = fs::read_to_string(file)
            .map_err(|e| file_operation_error(e, file.to_path_buf(), "read"))?;

        serde_json::from_str(&content).map_err(|e| {
            config_parsing_error(
                e,
                &format!("Failed to parse project registry {}", file.display()),
            )
        })
    }

    /// Rewrites `file` with the whole registry
    pub fn save(&self, file: &Path) -> Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| file_operation_error(e, parent.to_path_buf(), "create directory"))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| config_parsing_error(e, "Failed to serialise project registry"))?;

        fs::write(file, content).map_err(|e| file_operation_error(e, file.to_path_buf(), "write"))?;
        debug!("Saved {} projects to {}", self.len(), file.display());
        Ok(())
    }

    /// Loads the registry in `file` and returns the project called `name`
    pub fn lookup_existing(file: &Path, name: &str) -> Result<ProjectDescriptor> {
        Registry::load(file)?.lookup(name).cloned()
    }

    /// Returns the project called `name`, `NotFound` if it is not registered
    pub fn lookup(&self, name: &str) -> Result<&ProjectDescriptor> {
        self.get(name).ok_or_else(|| missing_project_error(name))
    }

    pub fn get(&self, name: &str) -> Option<&ProjectDescriptor> {
        self.projects.get(name)
    }

    /// Registers `descriptor` under its name, replacing an older entry
    pub fn insert(&mut self, descriptor: ProjectDescriptor) -> Option<ProjectDescriptor> {
        self.projects.insert(descriptor.name(), descriptor)
    }

    pub fn remove(&mut self, name: &str) -> Option<ProjectDescriptor> {
        self.projects.remove(name)
    }

    pub fn iter(&self) -> Iter<'_, String, ProjectDescriptor> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Reverse index from project directory to project name
    pub fn by_directory(&self) -> HashMap<&Path, &str> {
        self.projects
            .iter()
            .map(|(name, descriptor)| (descriptor.project_dir.as_path(), name.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a String, &'a ProjectDescriptor);
    type IntoIter = Iter<'a, String, ProjectDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub(crate) fn missing_project_error(name: &str) -> crate::errors::Error {
    not_found_error(
        "project",
        &format!("no project called <{name}> in project list"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project(dir: &str) -> ProjectDescriptor {
        let project_dir = PathBuf::from(dir);
        ProjectDescriptor {
            content_dir: project_dir.join("content"),
            content_name: project_dir.file_name().unwrap().to_string_lossy().into_owned(),
            project_dir,
            export_dir_name: "export".to_string(),
            template_name: "default".to_string(),
        }
    }

    #[test]
    fn test_name_is_basename() {
        assert_eq!(project("/home/me/comic").name(), "comic");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("knot").join("projects.json");

        let mut registry = Registry::new();
        registry.insert(project("/home/me/comic"));
        registry.insert(project("/home/me/sketchbook"));
        registry.save(&file).unwrap();

        let loaded = Registry::load(&file).unwrap();
        assert_eq!(loaded, registry);
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_empty_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("projects.json");

        Registry::new().save(&file).unwrap();
        assert!(Registry::load(&file).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let registry = Registry::load(&dir.path().join("projects.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("projects.json");
        fs::write(&file, "{ not json").unwrap();

        assert!(Registry::load(&file).is_err());
    }

    #[test]
    fn test_file_uses_pascal_case_field_names() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("projects.json");
        fs::write(
            &file,
            r#"{
    "comic": {
        "ProjectDir": "/home/me/comic",
        "ContentDir": "/home/me/comic",
        "ContentName": "comic",
        "ExportDirName": "export",
        "TemplateName": "default"
    }
}"#,
        )
        .unwrap();

        let descriptor = Registry::lookup_existing(&file, "comic").unwrap();
        assert_eq!(descriptor.content_dir, PathBuf::from("/home/me/comic"));
        assert!(Registry::lookup_existing(&file, "other").is_err());
    }

    #[test]
    fn test_insert_remove_and_reverse_index() {
        let mut registry = Registry::new();
        registry.insert(project("/a"));
        registry.insert(project("/a/b"));

        let index = registry.by_directory();
        assert_eq!(index.get(Path::new("/a/b")), Some(&"b"));
        assert_eq!(index.get(Path::new("/a")), Some(&"a"));

        assert!(registry.remove("b").is_some());
        assert!(registry.get("b").is_none());
        assert!(registry.remove("b").is_none());
    }
}
