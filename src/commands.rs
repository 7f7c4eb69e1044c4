use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::core::asset::{AssetVersionId, ResolvedAsset};
use crate::core::error::ApplicationError;
use crate::core::loading::ResultState;
use crate::core::project::Project;
use crate::core::state::ContextSlot;

type Slot<'a> = tauri::State<'a, Arc<ContextSlot>>;

#[derive(Debug, Clone, Serialize)]
pub struct AssetVersionInfo {
    pub id: AssetVersionId,
    pub number: String,
    pub kind: String,
}

impl From<AssetVersionId> for AssetVersionInfo {
    fn from(id: AssetVersionId) -> Self {
        Self {
            number: id.number().to_string(),
            kind: id.kind().to_string(),
            id,
        }
    }
}

#[tauri::command]
pub fn app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[tauri::command]
pub async fn list_asset_versions(
    state: Slot<'_>,
) -> Result<Vec<AssetVersionInfo>, ApplicationError> {
    let ctx = state.get().await?;
    let versions = ctx.versions().list_available().await?;
    Ok(versions.into_iter().map(AssetVersionInfo::from).collect())
}

#[tauri::command]
pub async fn current_asset_version(
    state: Slot<'_>,
) -> Result<Option<AssetVersionInfo>, ApplicationError> {
    let ctx = state.get().await?;
    Ok(ctx.versions().current().map(AssetVersionInfo::from))
}

#[tauri::command]
pub async fn set_asset_version(
    state: Slot<'_>,
    version: Option<String>,
) -> Result<Option<AssetVersionInfo>, ApplicationError> {
    let ctx = state.get().await?;
    let committed = ctx.versions().set_version_str(version.as_deref()).await?;
    Ok(committed.map(AssetVersionInfo::from))
}

#[tauri::command]
pub async fn resolve_asset_path(
    state: Slot<'_>,
    path: String,
) -> Result<ResultState<ResolvedAsset>, ApplicationError> {
    let ctx = state.get().await?;
    Ok(ctx.resolver().resolve_asset_path(&path).await)
}

#[tauri::command]
pub async fn read_asset_text(
    state: Slot<'_>,
    path: String,
) -> Result<ResultState<String>, ApplicationError> {
    let ctx = state.get().await?;
    Ok(ctx.resolver().read_text(&path).await)
}

#[tauri::command]
pub async fn read_asset_json(
    state: Slot<'_>,
    path: String,
) -> Result<ResultState<Value>, ApplicationError> {
    let ctx = state.get().await?;
    Ok(ctx.resolver().read_json::<Value>(&path).await)
}

#[tauri::command]
pub async fn create_project(
    state: Slot<'_>,
    name: String,
    asset_version: String,
) -> Result<Project, ApplicationError> {
    let ctx = state.get().await?;
    ctx.create_project(&name, &asset_version).await
}

#[tauri::command]
pub async fn open_project(state: Slot<'_>, id: String) -> Result<Project, ApplicationError> {
    let ctx = state.get().await?;
    let project = ctx.open_project(&id).await?;
    info!("Frontend opened project {}", project.id);
    Ok(project)
}

#[tauri::command]
pub async fn list_projects(state: Slot<'_>) -> Result<Vec<Project>, ApplicationError> {
    let ctx = state.get().await?;
    ctx.projects().list().await
}

#[tauri::command]
pub async fn delete_project(state: Slot<'_>, id: String) -> Result<(), ApplicationError> {
    let ctx = state.get().await?;
    ctx.projects().delete(&id).await
}

#[tauri::command]
pub async fn active_project(state: Slot<'_>) -> Result<Option<Project>, ApplicationError> {
    let ctx = state.get().await?;
    match ctx.projects().active().await {
        Some(id) => ctx.projects().load(&id).await.map(Some),
        None => Ok(None),
    }
}
