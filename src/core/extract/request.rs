// ─── Asset Requests ───
// Newline-delimited `id::type::package-path` list consumed by the extractor.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{AppResult, ApplicationError, FileOperation};

/// File name the extractor expects inside its working directory.
pub const REQUEST_FILE: &str = "asset_req.txt";

const SEPARATOR: &str = "::";

/// Object type the extractor decodes into an image.
pub const TEXTURE_TYPE: &str = "TEXTURE";

/// One line of the request list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub id: String,
    pub asset_type: String,
    pub package_path: String,
}

impl AssetRequest {
    pub fn new(
        id: impl Into<String>,
        asset_type: impl Into<String>,
        package_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            asset_type: asset_type.into(),
            package_path: package_path.into(),
        }
    }

    pub fn texture(id: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self::new(id, TEXTURE_TYPE, package_path)
    }

    pub fn is_texture(&self) -> bool {
        self.asset_type.eq_ignore_ascii_case(TEXTURE_TYPE)
            || self.asset_type.eq_ignore_ascii_case("Texture2D")
    }

    /// Parse `id::type::package-path`. The package path may itself contain `::`.
    pub fn parse(line: &str) -> AppResult<Self> {
        let mut parts = line.trim().splitn(3, SEPARATOR);
        let (Some(id), Some(asset_type), Some(package_path)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ApplicationError::unexpected(format!(
                "malformed asset request '{line}'"
            )));
        };

        if id.is_empty() || asset_type.is_empty() || package_path.is_empty() {
            return Err(ApplicationError::unexpected(format!(
                "asset request has an empty field: '{line}'"
            )));
        }

        Ok(Self::new(id, asset_type, package_path))
    }

    /// Where the extractor writes this request's image.
    pub fn output_file(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.png", self.id))
    }
}

impl std::fmt::Display for AssetRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.id, self.asset_type, self.package_path
        )
    }
}

/// Ordered request list with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestList {
    requests: Vec<AssetRequest>,
}

impl RequestList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request. Returns `false` if the id is already present.
    pub fn push(&mut self, request: AssetRequest) -> bool {
        if self.requests.iter().any(|r| r.id == request.id) {
            debug!("Skipping duplicate asset request {}", request.id);
            return false;
        }
        self.requests.push(request);
        true
    }

    pub fn parse(text: &str) -> AppResult<Self> {
        let mut list = Self::new();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            list.push(AssetRequest::parse(line)?);
        }
        Ok(list)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetRequest> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.requests.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn to_text(&self) -> String {
        self.requests
            .iter()
            .map(|request| format!("{request}\n"))
            .collect()
    }

    /// Write the list as `asset_req.txt` inside `workdir`.
    pub async fn write_to(&self, workdir: &Path) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(workdir)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Write, workdir))?;

        let path = workdir.join(REQUEST_FILE);
        tokio::fs::write(&path, self.to_text())
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Write, &path))?;

        debug!("Wrote {} asset requests to {:?}", self.len(), path);
        Ok(path)
    }

    /// Read a request list from disk.
    pub async fn read_from(path: &Path) -> AppResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| ApplicationError::file_operation(FileOperation::Open, path))?;
        Self::parse(&text)
    }
}

impl FromIterator<AssetRequest> for RequestList {
    fn from_iter<I: IntoIterator<Item = AssetRequest>>(iter: I) -> Self {
        let mut list = Self::new();
        for request in iter {
            list.push(request);
        }
        list
    }
}
