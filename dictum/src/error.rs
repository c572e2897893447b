use std::io;
use std::path::PathBuf;

use dictum_core::Scope;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The fragment file does not exist.
    NotFound,
    /// The file exists but could not be read.
    Unreadable,
    /// Invalid JSON, or a leaf that is not a string.
    Parse,
    /// The namespace is not configured for the requested scope.
    UnsupportedNamespace,
}

/// Failure to load one dictionary fragment.
#[derive(Debug, Clone, Error)]
#[error("failed to load dictionary `{namespace}` for {scope} from {}: {message}", .path.display())]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub scope: Scope,
    pub namespace: String,
    pub path: PathBuf,
    pub message: String,
}

impl LoadError {
    pub(crate) fn new(
        kind: LoadErrorKind,
        scope: &Scope,
        namespace: &str,
        path: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            scope: scope.clone(),
            namespace: namespace.to_string(),
            path,
            message: message.into(),
        }
    }

    pub(crate) fn io(scope: &Scope, namespace: &str, path: PathBuf, err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => LoadErrorKind::NotFound,
            _ => LoadErrorKind::Unreadable,
        };
        Self::new(kind, scope, namespace, path, err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == LoadErrorKind::NotFound
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("compression stream failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decompressed payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("dictionary payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a key could not be resolved. The resolver turns every variant into
/// the `"{locale}.{key}"` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("translation not found at `{path}`")]
    NotFound { path: String },
    #[error("no dictionary provided for `{path}`")]
    NoDictionary { path: String },
    #[error("malformed dictionary at `{path}`: {reason}")]
    Malformed { path: String, reason: String },
}

impl ResolveError {
    pub fn path(&self) -> &str {
        match self {
            ResolveError::NotFound { path }
            | ResolveError::NoDictionary { path }
            | ResolveError::Malformed { path, .. } => path,
        }
    }

    pub fn into_path(self) -> String {
        match self {
            ResolveError::NotFound { path }
            | ResolveError::NoDictionary { path }
            | ResolveError::Malformed { path, .. } => path,
        }
    }

    /// Missing keys are warnings; a missing or broken dictionary is an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    pub(crate) fn log(&self) {
        if self.is_warning() {
            warn!(path = self.path(), "{}", self);
        } else {
            error!(path = self.path(), "{}", self);
        }
    }
}
