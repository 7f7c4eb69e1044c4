// ─── Game Docs ───
// Builds the extractor's request list from the game's `Docs/<locale>.json`.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::request::{AssetRequest, RequestList};
use crate::core::error::{AppResult, ApplicationError, FileOperation};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Object type the docs use for icon textures.
const SOURCE_TEXTURE_TYPE: &str = "Texture2D";

/// Mount point the extractor expects in front of `/Game/...` package paths.
const CONTENT_ROOT: &str = "/FactoryGame/Content";

/// Icon fields on a docs class, big icon first.
const ICON_FIELDS: [&str; 2] = ["mPersistentBigIcon", "mSmallIcon"];

/// World map tiles are not referenced by any docs class.
const MAP_SLICES: [(u8, u8); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

const MAP_SLICE_DIR: &str = "FactoryGame/Interface/UI/Assets/MapTest/SlicedMap";

pub fn docs_file(docs_dir: &Path, locale: &str) -> PathBuf {
    docs_dir.join(format!("{locale}.json"))
}

/// Read and parse `<docs_dir>/<locale>.json`.
pub async fn read_docs(docs_dir: &Path, locale: &str) -> AppResult<Value> {
    let path = docs_file(docs_dir, locale);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApplicationError::file_operation(FileOperation::Open, &path))?;

    let text = decode_utf16le(&bytes, &path)?;
    let docs = serde_json::from_str(&text).map_err(|e| {
        debug!("Docs JSON at {:?} is invalid: {}", path, e);
        ApplicationError::json_decode(text.clone())
    })?;

    info!("Loaded docs {:?}", path);
    Ok(docs)
}

/// The docs ship as UTF-16LE, usually with a byte-order mark.
pub fn decode_utf16le(bytes: &[u8], path: &Path) -> AppResult<String> {
    if bytes.len() % 2 != 0 {
        debug!("Docs file {:?} has an odd byte count", path);
        return Err(ApplicationError::file_operation(FileOperation::Read, path));
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    let text: String = char::decode_utf16(units)
        .collect::<Result<_, _>>()
        .map_err(|_| ApplicationError::file_operation(FileOperation::Read, path))?;

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// An icon reference such as
/// `Texture2D /Game/FactoryGame/Resource/Parts/IronPlate/UI/IconDesc_IronPlates_256.IconDesc_IronPlates_256`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconReference {
    pub asset_type: String,
    pub asset_path: String,
}

impl IconReference {
    pub fn parse(raw: &str) -> Option<Self> {
        let (asset_type, asset_path) = raw.trim().split_once(' ')?;
        Some(Self {
            asset_type: asset_type.to_string(),
            asset_path: asset_path.trim().to_string(),
        })
    }

    /// Object name after the last `.`.
    pub fn asset_id(&self) -> Option<&str> {
        let (_, id) = self.asset_path.rsplit_once('.')?;
        let id = id.trim_end_matches(['\'', '"']);
        (!id.is_empty()).then_some(id)
    }

    /// `/Game/<rest>` becomes `/FactoryGame/Content/<rest>`.
    pub fn package_path(&self) -> Option<String> {
        let (_, rest) = self.asset_path.trim_start_matches('/').split_once('/')?;
        Some(format!("{CONTENT_ROOT}/{rest}"))
    }

    pub fn to_request(&self) -> Option<AssetRequest> {
        if self.asset_type != SOURCE_TEXTURE_TYPE {
            return None;
        }
        Some(AssetRequest::texture(self.asset_id()?, self.package_path()?))
    }
}

/// Every texture icon in the docs plus the world map tiles. The first
/// request for an id wins.
pub fn requests_from_docs(docs: &Value) -> RequestList {
    let mut requests = RequestList::new();

    let classes = docs
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("Classes").and_then(Value::as_array))
        .flatten();

    for class in classes {
        for field in ICON_FIELDS {
            let Some(reference) = class
                .get(field)
                .and_then(Value::as_str)
                .and_then(IconReference::parse)
            else {
                continue;
            };
            if let Some(request) = reference.to_request() {
                requests.push(request);
            }
        }
    }

    for request in map_slice_requests() {
        requests.push(request);
    }

    debug!("Generated {} asset requests from docs", requests.len());
    requests
}

pub fn map_slice_requests() -> Vec<AssetRequest> {
    MAP_SLICES
        .iter()
        .map(|(x, y)| {
            AssetRequest::texture(
                format!("MapSlice{x}_{y}"),
                format!("{CONTENT_ROOT}/{MAP_SLICE_DIR}/Map_{x}-{y}.Map_{x}-{y}"),
            )
        })
        .collect()
}
