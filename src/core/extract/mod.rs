pub mod docs;
pub mod request;
pub mod sidecar;

pub use docs::{read_docs, requests_from_docs, DEFAULT_LOCALE};
pub use request::{AssetRequest, RequestList, REQUEST_FILE};
pub use sidecar::{ExtractionReport, SidecarJob};
