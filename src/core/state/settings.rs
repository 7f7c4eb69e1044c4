use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::asset::{AssetVersionId, AssetVersionKind};
use crate::core::error::{AppResult, ApplicationError, FileOperation};

pub const SETTINGS_FILE: &str = "orbital_settings.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Committed at startup when its directory exists.
    pub default_asset_version: AssetVersionId,
    /// Overrides the bundled `resources/` directory.
    pub resource_root: Option<PathBuf>,
    /// Overrides `<data_dir>/projects`.
    pub projects_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_asset_version: AssetVersionId::new("1.0", AssetVersionKind::Stable),
            resource_root: None,
            projects_dir: None,
        }
    }
}

impl Settings {
    /// Read `orbital_settings.json`, falling back to defaults.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No settings at {:?} ({}), using defaults", path, e);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Corrupt settings at {:?}: {}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> AppResult<()> {
        let path = data_dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|_| ApplicationError::json_encode(format!("{self:?}")))?;

        std::fs::create_dir_all(data_dir)
            .map_err(|_| ApplicationError::file_operation(FileOperation::Write, data_dir))?;
        std::fs::write(&path, json)
            .map_err(|_| ApplicationError::file_operation(FileOperation::Write, &path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_asset_version.to_string(), "1.0-stable");
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{{{").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"default_asset_version": "2.0-legacy"}"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path());
        assert_eq!(settings.default_asset_version.to_string(), "2.0-legacy");
        assert_eq!(settings.projects_dir, None);
    }

    #[test]
    fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            default_asset_version: AssetVersionId::new("1.1", AssetVersionKind::Experimental),
            resource_root: Some(PathBuf::from("/opt/orbital/resources")),
            projects_dir: None,
        };
        settings.save(dir.path()).unwrap();
        assert_eq!(Settings::load(dir.path()), settings);
    }
}
