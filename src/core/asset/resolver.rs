// ─── Resource Path Resolver ───
// Maps a logical asset path plus the committed version to a physical file,
// and layers text / JSON reads on top.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use super::version::{AssetVersionId, AssetVersionState};
use crate::core::error::{AppResult, ApplicationError, FileOperation};
use crate::core::fs::ResourceFs;
use crate::core::loading::{producer, IntoResultState, PromiseAdapter, ResultState};

/// Where an asset lives: on disk, and as a URL the webview can load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    pub url: String,
}

pub struct AssetResolver {
    fs: Arc<dyn ResourceFs>,
    versions: Arc<AssetVersionState>,
}

impl AssetResolver {
    pub fn new(fs: Arc<dyn ResourceFs>, versions: Arc<AssetVersionState>) -> Self {
        Self { fs, versions }
    }

    pub fn versions(&self) -> &Arc<AssetVersionState> {
        &self.versions
    }

    /// Resolve `relative` inside the currently committed version.
    pub async fn resolve_asset_path(&self, relative: &str) -> ResultState<ResolvedAsset> {
        asset_path_for(self.fs.as_ref(), self.versions.current().as_ref(), relative)
            .into_result_state()
    }

    pub async fn read_text(&self, relative: &str) -> ResultState<String> {
        let asset = self.resolve_asset_path(relative).await;
        read_resolved_text(self.fs.as_ref(), asset).await
    }

    pub async fn read_json<T: DeserializeOwned>(&self, relative: &str) -> ResultState<T> {
        self.read_text(relative).await.and_then(|text| parse_json(&text))
    }

    /// Path resolution that re-runs whenever the committed version changes.
    pub fn watch_asset_path(&self, relative: &str) -> watch::Receiver<ResultState<ResolvedAsset>> {
        let fs = Arc::clone(&self.fs);
        let adapter = PromiseAdapter::new(producer(
            move |(version, relative): (Option<AssetVersionId>, String)| {
                let fs = Arc::clone(&fs);
                async move { asset_path_for(fs.as_ref(), version.as_ref(), &relative) }
            },
        ));

        let relative = relative.to_string();
        adapter.drive(self.versions.subscribe(), move |version| {
            (version.clone(), relative.clone())
        })
    }

    /// File contents that follow [`Self::watch_asset_path`].
    pub fn watch_text(&self, relative: &str) -> watch::Receiver<ResultState<String>> {
        let fs = Arc::clone(&self.fs);
        let adapter = PromiseAdapter::new(producer(move |asset: ResultState<ResolvedAsset>| {
            let fs = Arc::clone(&fs);
            async move { read_resolved_text(fs.as_ref(), asset).await }
        }));

        adapter.drive(self.watch_asset_path(relative), Clone::clone)
    }

    /// Parsed JSON that follows [`Self::watch_text`].
    pub fn watch_json<T>(&self, relative: &str) -> watch::Receiver<ResultState<T>>
    where
        T: DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
    {
        let adapter = PromiseAdapter::new(producer(|text: ResultState<String>| async move {
            text.and_then(|text| parse_json::<T>(&text))
        }));

        adapter.drive(self.watch_text(relative), Clone::clone)
    }
}

/// Join `assets/<version>/<relative>` under the resource root.
pub fn asset_path_for(
    fs: &dyn ResourceFs,
    version: Option<&AssetVersionId>,
    relative: &str,
) -> AppResult<ResolvedAsset> {
    let version = version.ok_or_else(ApplicationError::unset_version)?;
    if !version.is_well_formed() {
        return Err(ApplicationError::unknown_version(version.to_string()));
    }
    validate_relative(version, relative)?;

    let path = fs.resolve(&version.namespace().join(relative));
    let url = fs.servable_location(&path);
    Ok(ResolvedAsset { path, url })
}

fn validate_relative(version: &AssetVersionId, relative: &str) -> AppResult<()> {
    let invalid = |reason: &str| {
        Err(ApplicationError::invalid_asset_path(
            version.to_string(),
            relative,
            reason,
        ))
    };

    if relative.trim().is_empty() {
        return invalid("path is empty");
    }

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return invalid("path escapes the version directory"),
            Component::RootDir | Component::Prefix(_) => return invalid("path must be relative"),
        }
    }

    Ok(())
}

async fn read_resolved_text(
    fs: &dyn ResourceFs,
    asset: ResultState<ResolvedAsset>,
) -> ResultState<String> {
    match asset {
        ResultState::Ready { value } => read_text_at(fs, &value.path).await.into_result_state(),
        ResultState::Loading => ResultState::Loading,
        ResultState::Failed { error } => ResultState::failed(error),
    }
}

async fn read_text_at(fs: &dyn ResourceFs, path: &Path) -> AppResult<String> {
    let bytes = fs.read_text_file(path).await.map_err(|e| {
        tracing::debug!("Cannot open {:?}: {}", path, e);
        ApplicationError::file_operation(FileOperation::Open, path)
    })?;

    String::from_utf8(bytes).map_err(|_| ApplicationError::file_operation(FileOperation::Read, path))
}

/// Parse JSON, keeping the raw text in the error for diagnostics.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> AppResult<T> {
    serde_json::from_str(text).map_err(|e| {
        tracing::debug!("JSON decode failed: {}", e);
        ApplicationError::json_decode(text)
    })
}
