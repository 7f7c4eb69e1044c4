// ─── Asset Versions ───
// Version ids (`<number>-<kind>`), and the validated "current version" cell.

use std::cmp::Ordering as CmpOrdering;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::error::{AppResult, ApplicationError, FileOperation};
use crate::core::fs::ResourceFs;
use crate::core::loading::publish_if_changed;

/// Directory under the resource root that holds one folder per version.
pub const ASSETS_DIR: &str = "assets";

/// Release channel of an extracted asset version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetVersionKind {
    Stable,
    Experimental,
    Legacy,
}

impl std::fmt::Display for AssetVersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetVersionKind::Stable => write!(f, "stable"),
            AssetVersionKind::Experimental => write!(f, "experimental"),
            AssetVersionKind::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for AssetVersionKind {
    type Err = ApplicationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "stable" => Ok(Self::Stable),
            "experimental" => Ok(Self::Experimental),
            "legacy" => Ok(Self::Legacy),
            other => Err(ApplicationError::unexpected(format!(
                "unknown asset version kind '{other}'"
            ))),
        }
    }
}

/// Composite version key, written `<number>-<kind>` (e.g. `1.0-stable`).
///
/// The joined id is always a single directory name directly under `assets/`.
/// Ids order by their dot-separated number segments (numerically where both
/// segments are numbers), then by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetVersionId {
    number: String,
    kind: AssetVersionKind,
}

impl AssetVersionId {
    pub fn new(number: impl Into<String>, kind: AssetVersionKind) -> Self {
        Self {
            number: number.into(),
            kind,
        }
    }

    /// Checked constructor: `number` must be a plain directory-name fragment.
    pub fn try_new(number: impl Into<String>, kind: AssetVersionKind) -> AppResult<Self> {
        let id = Self::new(number, kind);
        if id.is_well_formed() {
            Ok(id)
        } else {
            Err(ApplicationError::unknown_version(id.to_string()))
        }
    }

    /// `true` when the joined id names exactly one entry under `assets/`.
    pub fn is_well_formed(&self) -> bool {
        let number = self.number.as_str();
        if number.is_empty()
            || number.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\')
            || number.contains("..")
        {
            return false;
        }

        let joined = self.to_string();
        let mut components = Path::new(&joined).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> AssetVersionKind {
        self.kind
    }

    /// Logical path of this version's namespace: `assets/<id>`.
    pub fn namespace(&self) -> PathBuf {
        PathBuf::from(ASSETS_DIR).join(self.to_string())
    }
}

impl std::fmt::Display for AssetVersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.number, self.kind)
    }
}

impl FromStr for AssetVersionId {
    type Err = ApplicationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (number, kind) = raw
            .split_once('-')
            .ok_or_else(|| ApplicationError::unknown_version(raw))?;
        let kind = kind
            .parse::<AssetVersionKind>()
            .map_err(|_| ApplicationError::unknown_version(raw))?;
        Self::try_new(number, kind).map_err(|_| ApplicationError::unknown_version(raw))
    }
}

impl Ord for AssetVersionId {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        compare_numbers(&self.number, &other.number)
            .then(self.kind.cmp(&other.kind))
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl PartialOrd for AssetVersionId {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

fn compare_numbers(a: &str, b: &str) -> CmpOrdering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return CmpOrdering::Equal,
            (None, Some(_)) => return CmpOrdering::Less,
            (Some(_), None) => return CmpOrdering::Greater,
            (Some(l), Some(r)) => {
                let order = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if order != CmpOrdering::Equal {
                    return order;
                }
            }
        }
    }
}

impl TryFrom<String> for AssetVersionId {
    type Error = ApplicationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<AssetVersionId> for String {
    fn from(id: AssetVersionId) -> Self {
        id.to_string()
    }
}

impl<S: Into<String>> From<(S, AssetVersionKind)> for AssetVersionId {
    fn from((number, kind): (S, AssetVersionKind)) -> Self {
        Self::new(number, kind)
    }
}

/// The single "current asset version" cell.
///
/// States are `Unset` (`None`) and `Committed(id)`. A candidate is committed
/// only after its namespace directory is confirmed to exist; a rejected
/// candidate leaves the previous value untouched.
pub struct AssetVersionState {
    fs: Arc<dyn ResourceFs>,
    current: watch::Sender<Option<AssetVersionId>>,
    requests: AtomicU64,
}

impl AssetVersionState {
    pub fn new(fs: Arc<dyn ResourceFs>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            fs,
            current,
            requests: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Option<AssetVersionId> {
        self.current.borrow().clone()
    }

    pub fn version_number(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|id| id.number().to_string())
    }

    pub fn version_type(&self) -> Option<AssetVersionKind> {
        self.current.borrow().as_ref().map(AssetVersionId::kind)
    }

    /// Receives the committed version every time it changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AssetVersionId>> {
        self.current.subscribe()
    }

    /// Validated setter. `None` clears the selection.
    ///
    /// When two requests race, only the most recently issued one may commit;
    /// an older candidate that finishes its existence check afterwards is
    /// rejected instead of overwriting the newer choice.
    pub async fn set_version(
        &self,
        candidate: Option<AssetVersionId>,
    ) -> AppResult<Option<AssetVersionId>> {
        let ticket = self.requests.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(candidate) = candidate else {
            if publish_if_changed(&self.current, None) {
                info!("Cleared asset version");
            }
            return Ok(None);
        };

        if !candidate.is_well_formed() {
            warn!("Rejected malformed asset version {:?}", candidate.to_string());
            return Err(ApplicationError::unknown_version(candidate.to_string()));
        }

        let folder = self.fs.resolve(&candidate.namespace());
        if !self.fs.exists(&folder).await {
            warn!("Rejected asset version {}: {:?} does not exist", candidate, folder);
            return Err(ApplicationError::unknown_version(candidate.to_string()));
        }

        if self.requests.load(Ordering::SeqCst) != ticket {
            debug!("Dropping asset version {} superseded by a newer request", candidate);
            return Err(ApplicationError::unexpected(
                "superseded by a newer version request",
            ));
        }

        if publish_if_changed(&self.current, Some(candidate.clone())) {
            info!("Committed asset version {}", candidate);
        }
        Ok(Some(candidate))
    }

    /// Parse `raw` as `<number>-<kind>` and hand it to [`Self::set_version`].
    pub async fn set_version_str(&self, raw: Option<&str>) -> AppResult<Option<AssetVersionId>> {
        let candidate = raw.map(str::parse::<AssetVersionId>).transpose()?;
        self.set_version(candidate).await
    }

    /// Every version directory present under `assets/`, sorted.
    pub async fn list_available(&self) -> AppResult<Vec<AssetVersionId>> {
        let assets_dir = self.fs.resolve(&PathBuf::from(ASSETS_DIR));
        if !self.fs.exists(&assets_dir).await {
            return Ok(Vec::new());
        }

        let names = self.fs.list_dirs(&assets_dir).await.map_err(|e| {
            warn!("Cannot list {:?}: {}", assets_dir, e);
            ApplicationError::file_operation(FileOperation::Read, &assets_dir)
        })?;

        let mut versions: Vec<AssetVersionId> = names
            .into_iter()
            .filter_map(|name| match name.parse::<AssetVersionId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!("Ignoring non-version directory {:?}", name);
                    None
                }
            })
            .collect();
        versions.sort();
        Ok(versions)
    }

    /// Clear the selection without validation, e.g. on shutdown. Any
    /// in-flight `set_version` is superseded.
    pub fn clear(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        publish_if_changed(&self.current, None);
    }
}
