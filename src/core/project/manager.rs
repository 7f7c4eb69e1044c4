use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::model::{Project, PROJECT_FILE};
use crate::core::asset::AssetVersionId;
use crate::core::error::{AppResult, ApplicationError, FileOperation};

/// Manages the lifecycle of projects on disk.
pub struct ProjectManager {
    /// Root directory where all projects live.
    projects_dir: PathBuf,
    active: RwLock<Option<String>>,
}

impl ProjectManager {
    pub fn new(projects_dir: PathBuf) -> Self {
        Self {
            projects_dir,
            active: RwLock::new(None),
        }
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Create `<projects_dir>/<id>/project.json`. The caller has already
    /// checked that `asset_version` exists.
    pub async fn create(&self, name: &str, asset_version: AssetVersionId) -> AppResult<Project> {
        let project = Project::new(name, asset_version);
        if project.id.is_empty() {
            return Err(ApplicationError::unexpected(format!(
                "project name '{name}' has no usable characters"
            )));
        }

        let dir = project.dir(&self.projects_dir);
        if tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(ApplicationError::file_operation(FileOperation::Write, &dir));
        }

        self.save(&project).await?;
        self.set_active(&project.id).await;

        info!("Created project '{}' ({})", project.name, project.id);
        Ok(project)
    }

    /// Save project metadata to disk.
    pub async fn save(&self, project: &Project) -> AppResult<()> {
        let config_path = project.config_path(&self.projects_dir);
        let json = serde_json::to_string_pretty(project)
            .map_err(|_| ApplicationError::json_encode(format!("{project:?}")))?;

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|_| ApplicationError::file_operation(FileOperation::Write, parent))?;
        }

        tokio::fs::write(&config_path, json)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Write, &config_path))
    }

    /// Load a single project by id without changing the active project.
    pub async fn load(&self, id: &str) -> AppResult<Project> {
        let config_path = self.project_dir(id, FileOperation::Open)?.join(PROJECT_FILE);
        let json = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Open, &config_path))?;

        serde_json::from_str(&json).map_err(|e| {
            warn!("Corrupt project.json at {:?}: {}", config_path, e);
            ApplicationError::json_decode(json.clone())
        })
    }

    /// Load a project and mark it active.
    pub async fn open(&self, id: &str) -> AppResult<Project> {
        let project = self.load(id).await?;
        self.set_active(&project.id).await;
        info!("Opened project '{}'", project.id);
        Ok(project)
    }

    /// List all projects, sorted by id.
    pub async fn list(&self) -> AppResult<Vec<Project>> {
        let mut projects = Vec::new();

        if !tokio::fs::try_exists(&self.projects_dir).await.unwrap_or(false) {
            return Ok(projects);
        }

        let mut entries = tokio::fs::read_dir(&self.projects_dir)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Open, &self.projects_dir))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Read, &self.projects_dir))?
        {
            let config_path = entry.path().join(PROJECT_FILE);
            match tokio::fs::read_to_string(&config_path).await {
                Ok(json) => match serde_json::from_str::<Project>(&json) {
                    Ok(project) => projects.push(project),
                    Err(e) => warn!("Corrupt project.json at {:?}: {}", config_path, e),
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Cannot read {:?}: {}", config_path, e),
            }
        }

        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    /// Delete a project from disk.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let project_dir = self.project_dir(id, FileOperation::Other)?;
        if !tokio::fs::try_exists(&project_dir).await.unwrap_or(false) {
            return Err(ApplicationError::file_operation(FileOperation::Other, &project_dir));
        }

        tokio::fs::remove_dir_all(&project_dir)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Other, &project_dir))?;

        let mut active = self.active.write().await;
        if active.as_deref() == Some(id) {
            *active = None;
        }

        info!("Deleted project {}", id);
        Ok(())
    }

    /// Id of the most recently opened or created project.
    pub async fn active(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    /// Ids are a single path component; anything else never names a project.
    fn project_dir(&self, id: &str, operation: FileOperation) -> AppResult<PathBuf> {
        let dir = self.projects_dir.join(id);
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(_)), None) => Ok(dir),
            _ => Err(ApplicationError::file_operation(operation, dir)),
        }
    }

    async fn set_active(&self, id: &str) {
        *self.active.write().await = Some(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetVersionKind;

    fn stable() -> AssetVersionId {
        AssetVersionId::new("1.0", AssetVersionKind::Stable)
    }

    #[tokio::test]
    async fn create_open_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().to_path_buf());

        let created = manager.create("Main Bus", stable()).await.unwrap();
        assert_eq!(created.id, "main_bus");
        assert!(dir.path().join("main_bus/project.json").exists());
        assert_eq!(manager.active().await.as_deref(), Some("main_bus"));

        manager.create("Oil Setup", stable()).await.unwrap();
        assert_eq!(manager.active().await.as_deref(), Some("oil_setup"));

        let opened = manager.open("main_bus").await.unwrap();
        assert_eq!(opened, created);
        assert_eq!(manager.active().await.as_deref(), Some("main_bus"));

        let ids: Vec<String> = manager.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["main_bus", "oil_setup"]);
    }

    #[tokio::test]
    async fn refuses_existing_project() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().to_path_buf());
        manager.create("Main Bus", stable()).await.unwrap();

        let err = manager.create("main bus", stable()).await.unwrap_err();
        assert_eq!(
            err,
            ApplicationError::file_operation(FileOperation::Write, dir.path().join("main_bus"))
        );
    }

    #[tokio::test]
    async fn open_reports_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().to_path_buf());

        assert_eq!(
            manager.open("ghost").await.unwrap_err(),
            ApplicationError::file_operation(
                FileOperation::Open,
                dir.path().join("ghost").join(PROJECT_FILE)
            )
        );

        std::fs::create_dir_all(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken").join(PROJECT_FILE), "{ nope").unwrap();
        assert_eq!(
            manager.open("broken").await.unwrap_err(),
            ApplicationError::json_decode("{ nope")
        );
        assert_eq!(manager.active().await, None);
    }

    #[tokio::test]
    async fn rejects_ids_outside_projects_dir() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().join("projects"));
        std::fs::create_dir_all(dir.path().join("projects")).unwrap();

        assert!(manager.delete("..").await.is_err());
        assert!(manager.delete("").await.is_err());
        assert!(manager.open("../projects").await.is_err());
        assert!(dir.path().join("projects").exists());
    }

    #[tokio::test]
    async fn list_skips_corrupt_entries() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().to_path_buf());
        manager.create("Good", stable()).await.unwrap();

        std::fs::create_dir_all(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken").join(PROJECT_FILE), "[]").unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let projects = manager.list().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "good");
    }

    #[tokio::test]
    async fn list_without_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().join("not-yet"));
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_clears_active() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ProjectManager::new(dir.path().to_path_buf());
        manager.create("Main Bus", stable()).await.unwrap();

        manager.delete("main_bus").await.unwrap();
        assert!(!dir.path().join("main_bus").exists());
        assert_eq!(manager.active().await, None);

        assert_eq!(
            manager.delete("main_bus").await.unwrap_err(),
            ApplicationError::file_operation(FileOperation::Other, dir.path().join("main_bus"))
        );
    }
}
