use chrono::{DateTime, Utc};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::asset::AssetVersionId;

pub const PROJECT_FILE: &str = "project.json";

/// A saved workspace, persisted as `<projects_dir>/<id>/project.json`.
///
/// The id is derived from the display name, so two projects whose names only
/// differ in case or punctuation collide on purpose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub asset_version: AssetVersionId,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, asset_version: AssetVersionId) -> Self {
        let name = name.into();
        Self {
            id: project_id(&name),
            name,
            asset_version,
            created_at: Utc::now(),
        }
    }

    pub fn dir(&self, projects_dir: &Path) -> PathBuf {
        projects_dir.join(&self.id)
    }

    pub fn config_path(&self, projects_dir: &Path) -> PathBuf {
        self.dir(projects_dir).join(PROJECT_FILE)
    }
}

/// `"Main Bus Layout"` -> `"main_bus_layout"`.
pub fn project_id(name: &str) -> String {
    name.trim().to_case(Case::Snake)
}
