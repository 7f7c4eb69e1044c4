pub mod manager;
pub mod model;

pub use manager::ProjectManager;
pub use model::{project_id, Project, PROJECT_FILE};
