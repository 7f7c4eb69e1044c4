pub mod app_state;
pub mod paths;
pub mod settings;

pub use app_state::{AppContext, ContextSlot};
pub use paths::{default_data_dir, manifest_resources, RuntimePaths};
pub use settings::{Settings, SETTINGS_FILE};
