use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::paths::RuntimePaths;
use super::settings::Settings;
use crate::core::asset::{AssetResolver, AssetVersionId, AssetVersionState};
use crate::core::error::{AppResult, ApplicationError};
use crate::core::fs::{LocalResourceFs, ResourceFs};
use crate::core::project::{Project, ProjectManager};

/// Everything the shell and the commands share, built once at startup.
pub struct AppContext {
    paths: RuntimePaths,
    settings: Settings,
    fs: Arc<dyn ResourceFs>,
    versions: Arc<AssetVersionState>,
    resolver: AssetResolver,
    projects: ProjectManager,
}

impl AppContext {
    /// Build a context over the on-disk resource root.
    pub async fn start(paths: RuntimePaths, settings: Settings) -> AppResult<Arc<Self>> {
        paths.ensure_dirs()?;
        let fs: Arc<dyn ResourceFs> = Arc::new(LocalResourceFs::new(paths.resource_root()));
        Ok(Self::with_fs(paths, settings, fs).await)
    }

    /// Build a context over any filesystem collaborator. A default version
    /// that is not on disk leaves the selection unset.
    pub async fn with_fs(
        paths: RuntimePaths,
        settings: Settings,
        fs: Arc<dyn ResourceFs>,
    ) -> Arc<Self> {
        let versions = Arc::new(AssetVersionState::new(Arc::clone(&fs)));
        let resolver = AssetResolver::new(Arc::clone(&fs), Arc::clone(&versions));
        let projects = ProjectManager::new(paths.projects_dir().to_path_buf());

        if let Err(e) = versions
            .set_version(Some(settings.default_asset_version.clone()))
            .await
        {
            warn!(
                "Default asset version {} unavailable: {}",
                settings.default_asset_version, e
            );
        }

        info!(
            "Context ready (resources: {:?}, projects: {:?})",
            paths.resource_root(),
            paths.projects_dir()
        );

        Arc::new(Self {
            paths,
            settings,
            fs,
            versions,
            resolver,
            projects,
        })
    }

    pub fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fs(&self) -> &Arc<dyn ResourceFs> {
        &self.fs
    }

    pub fn versions(&self) -> &Arc<AssetVersionState> {
        &self.versions
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    pub fn projects(&self) -> &ProjectManager {
        &self.projects
    }

    /// Create a project pinned to an extracted asset version.
    pub async fn create_project(&self, name: &str, version: &str) -> AppResult<Project> {
        let version: AssetVersionId = version.parse()?;
        if !self.versions.list_available().await?.contains(&version) {
            return Err(ApplicationError::unknown_version(version.to_string()));
        }
        self.projects.create(name, version).await
    }

    /// Open a project and switch to its asset version.
    pub async fn open_project(&self, id: &str) -> AppResult<Project> {
        let project = self.projects.open(id).await?;
        self.versions
            .set_version(Some(project.asset_version.clone()))
            .await?;
        Ok(project)
    }

    pub fn shutdown(&self) {
        self.versions.clear();
        info!("Context shut down");
    }
}

/// Holds the context between startup and teardown.
#[derive(Default)]
pub struct ContextSlot {
    inner: RwLock<Option<Arc<AppContext>>>,
}

impl ContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> AppResult<Arc<AppContext>> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or_else(|| ApplicationError::uninitialized_context("AppContext"))
    }

    pub async fn install(&self, ctx: Arc<AppContext>) {
        *self.inner.write().await = Some(ctx);
    }

    pub async fn teardown(&self) {
        if let Some(ctx) = self.inner.write().await.take() {
            ctx.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemoryResourceFs;
    use crate::core::loading::ResultState;

    async fn context(dirs: &[&str], projects: &std::path::Path) -> Arc<AppContext> {
        let fs = Arc::new(MemoryResourceFs::new("/res"));
        for dir in dirs {
            fs.add_dir(dir);
        }
        fs.add_file("assets/2.0-legacy/motd.txt", "legacy");
        let paths = RuntimePaths::new("/data".into(), "/res".into(), projects.to_path_buf());
        AppContext::with_fs(paths, Settings::default(), fs).await
    }

    #[tokio::test]
    async fn start_commits_default_version_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&["assets/1.0-stable"], dir.path()).await;
        assert_eq!(
            ctx.versions().current().map(|v| v.to_string()).as_deref(),
            Some("1.0-stable")
        );
    }

    #[tokio::test]
    async fn start_leaves_version_unset_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&[], dir.path()).await;
        assert_eq!(ctx.versions().current(), None);
    }

    #[tokio::test]
    async fn create_project_requires_known_version() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&["assets/1.0-stable"], dir.path()).await;

        assert_eq!(
            ctx.create_project("Main Bus", "3.0-stable").await.unwrap_err(),
            ApplicationError::unknown_version("3.0-stable")
        );
        assert!(ctx.create_project("Main Bus", "nonsense").await.is_err());

        let project = ctx.create_project("Main Bus", "2.0-legacy").await.unwrap();
        assert_eq!(project.asset_version.to_string(), "2.0-legacy");
    }

    #[tokio::test]
    async fn open_project_switches_version() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&["assets/1.0-stable"], dir.path()).await;
        ctx.create_project("Legacy Run", "2.0-legacy").await.unwrap();

        ctx.open_project("legacy_run").await.unwrap();
        assert_eq!(
            ctx.versions().current().map(|v| v.to_string()).as_deref(),
            Some("2.0-legacy")
        );
        assert_eq!(
            ctx.resolver().read_text("motd.txt").await,
            ResultState::ready("legacy".to_string())
        );
        assert_eq!(ctx.projects().active().await.as_deref(), Some("legacy_run"));
    }

    #[tokio::test]
    async fn empty_slot_is_uninitialized() {
        let slot = ContextSlot::new();
        assert_eq!(
            slot.get().await.err(),
            Some(ApplicationError::uninitialized_context("AppContext"))
        );
    }

    #[tokio::test]
    async fn teardown_clears_version_and_slot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&["assets/1.0-stable"], dir.path()).await;
        let mut watched = ctx.resolver().watch_asset_path("icons/a.png");

        let slot = ContextSlot::new();
        slot.install(Arc::clone(&ctx)).await;
        assert!(slot.get().await.is_ok());

        slot.teardown().await;
        assert!(slot.get().await.is_err());
        assert_eq!(ctx.versions().current(), None);
        watched
            .wait_for(|state| *state == ResultState::failed(ApplicationError::unset_version()))
            .await
            .unwrap();
    }
}
