use std::path::{Path, PathBuf};

use crate::core::error::{AppResult, ApplicationError, FileOperation};

use super::settings::Settings;

const APP_DIR_NAME: &str = "Orbital";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    data_dir: PathBuf,
    resource_root: PathBuf,
    projects_dir: PathBuf,
}

impl RuntimePaths {
    pub fn new(data_dir: PathBuf, resource_root: PathBuf, projects_dir: PathBuf) -> Self {
        Self {
            data_dir,
            resource_root,
            projects_dir,
        }
    }

    /// Combine the data directory and bundled resources with any overrides
    /// from `settings`.
    pub fn resolve(data_dir: PathBuf, bundled_resources: PathBuf, settings: &Settings) -> Self {
        let resource_root = settings
            .resource_root
            .clone()
            .unwrap_or(bundled_resources);
        let projects_dir = settings
            .projects_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("projects"));

        Self::new(data_dir, resource_root, projects_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn resource_root(&self) -> &Path {
        &self.resource_root
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Create the writable directories. The resource root is read-only and
    /// left alone.
    pub fn ensure_dirs(&self) -> AppResult<()> {
        for dir in [&self.data_dir, &self.projects_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|_| ApplicationError::file_operation(FileOperation::Write, dir))?;
        }
        Ok(())
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// `resources/` next to the manifest, used outside the desktop bundle.
pub fn manifest_resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}
