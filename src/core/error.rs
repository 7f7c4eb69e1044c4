use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which filesystem operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Open,
    Read,
    Write,
    Other,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Open => write!(f, "open"),
            FileOperation::Read => write!(f, "read"),
            FileOperation::Write => write!(f, "write"),
            FileOperation::Other => write!(f, "other"),
        }
    }
}

/// Direction of a failed JSON conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonOperation {
    Decode,
    Encode,
}

impl std::fmt::Display for JsonOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonOperation::Decode => write!(f, "decode"),
            JsonOperation::Encode => write!(f, "encode"),
        }
    }
}

/// Closed error taxonomy shared by the backend and the webview.
///
/// Serialized as `{"kind": "<snake_case>", ...}` so the frontend can match on
/// `kind` without knowing anything about Rust.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplicationError {
    // ── Asset versions ──────────────────────────────────
    #[error("Unknown asset version: {version}")]
    UnknownVersion { version: String },

    #[error("No asset version is selected")]
    UnsetVersion {},

    // ── Wiring ──────────────────────────────────────────
    #[error("Context used before initialization: {context}")]
    UninitializedContext { context: String },

    // ── Assets ──────────────────────────────────────────
    #[error("Invalid asset path {path:?} for version {version}{}", reason_suffix(.reason))]
    InvalidAssetPath {
        version: String,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ── IO ──────────────────────────────────────────────
    #[error("File operation '{operation}' failed at {path}")]
    FileOperation {
        operation: FileOperation,
        path: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON {operation} failed")]
    Json {
        operation: JsonOperation,
        data: String,
    },

    // ── Generic ─────────────────────────────────────────
    #[error("Unexpected error{}", reason_suffix(.reason))]
    Unexpected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

/// Convenience alias used throughout the crate.
pub type AppResult<T> = Result<T, ApplicationError>;

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {reason}"),
        None => String::new(),
    }
}

impl ApplicationError {
    pub fn unknown_version(version: impl AsRef<str>) -> Self {
        Self::UnknownVersion {
            version: version.as_ref().to_string(),
        }
    }

    pub fn unset_version() -> Self {
        Self::UnsetVersion {}
    }

    pub fn uninitialized_context(context: impl AsRef<str>) -> Self {
        Self::UninitializedContext {
            context: context.as_ref().to_string(),
        }
    }

    pub fn unexpected(reason: impl AsRef<str>) -> Self {
        Self::Unexpected {
            reason: Some(reason.as_ref().to_string()),
        }
    }

    pub fn invalid_asset_path(
        version: impl AsRef<str>,
        path: impl AsRef<str>,
        reason: impl AsRef<str>,
    ) -> Self {
        Self::InvalidAssetPath {
            version: version.as_ref().to_string(),
            path: path.as_ref().to_string(),
            reason: Some(reason.as_ref().to_string()),
        }
    }

    pub fn file_operation(operation: FileOperation, path: impl AsRef<Path>) -> Self {
        Self::FileOperation {
            operation,
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Decode failure; keeps the raw input so it can be inspected later.
    pub fn json_decode(data: impl Into<String>) -> Self {
        Self::Json {
            operation: JsonOperation::Decode,
            data: data.into(),
        }
    }

    pub fn json_encode(data: impl Into<String>) -> Self {
        Self::Json {
            operation: JsonOperation::Encode,
            data: data.into(),
        }
    }

    /// Wiring defects that no amount of retrying fixes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UninitializedContext { .. })
    }

    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}
