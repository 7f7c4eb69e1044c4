pub mod resolver;
pub mod version;

pub use resolver::{asset_path_for, parse_json, AssetResolver, ResolvedAsset};
pub use version::{AssetVersionId, AssetVersionKind, AssetVersionState, ASSETS_DIR};
