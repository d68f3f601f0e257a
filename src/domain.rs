use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FailureKind, GitmarksError};

pub const DEFAULT_FILE_PATH: &str = "bookmarks.json";

/// The bookmark payload. Only "valid JSON" is guaranteed, never a schema.
pub type BookmarkDocument = Value;

/// Connection settings persisted in `config.json`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub username: String,
    pub repo: String,
    pub file_path: String,
    pub token: String,
    pub use_mirror: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            repo: String::new(),
            file_path: DEFAULT_FILE_PATH.to_string(),
            token: String::new(),
            use_mirror: false,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("username", &self.username)
            .field("repo", &self.repo)
            .field("file_path", &self.file_path)
            .field("token", &mask_token(&self.token))
            .field("use_mirror", &self.use_mirror)
            .finish()
    }
}

impl ConnectionConfig {
    /// Builds a complete record from a partial one. Absent fields take their
    /// defaults, strings are trimmed, and a blank file path becomes
    /// [`DEFAULT_FILE_PATH`].
    pub fn from_patch(patch: ConfigPatch) -> Self {
        let defaults = Self::default();
        let file_path = patch
            .file_path
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.file_path);
        Self {
            username: trimmed_or(patch.username, defaults.username),
            repo: trimmed_or(patch.repo, defaults.repo),
            file_path,
            token: trimmed_or(patch.token, defaults.token),
            use_mirror: patch.use_mirror.unwrap_or(defaults.use_mirror),
        }
    }

    /// Applies `patch` on top of this record; fields absent from the patch
    /// keep their current value.
    pub fn merged(&self, patch: ConfigPatch) -> Self {
        Self::from_patch(ConfigPatch {
            username: patch.username.or_else(|| Some(self.username.clone())),
            repo: patch.repo.or_else(|| Some(self.repo.clone())),
            file_path: patch.file_path.or_else(|| Some(self.file_path.clone())),
            token: patch.token.or_else(|| Some(self.token.clone())),
            use_mirror: patch.use_mirror.or(Some(self.use_mirror)),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.username.trim().is_empty() && !self.repo.trim().is_empty()
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Copy safe to print: the token is replaced by a mask.
    pub fn redacted(&self) -> Self {
        Self {
            token: mask_token(&self.token),
            ..self.clone()
        }
    }
}

/// Partial settings as submitted by a settings form or read from a
/// hand-edited file. `None` means "not provided", which is distinct from
/// `Some(String::new())`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub use_mirror: Option<bool>,
}

impl From<ConnectionConfig> for ConfigPatch {
    fn from(config: ConnectionConfig) -> Self {
        Self {
            username: Some(config.username),
            repo: Some(config.repo),
            file_path: Some(config.file_path),
            token: Some(config.token),
            use_mirror: Some(config.use_mirror),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Success {
        data: BookmarkDocument,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadOutcome::Success { .. })
    }
}

impl From<Result<BookmarkDocument, GitmarksError>> for LoadOutcome {
    fn from(result: Result<BookmarkDocument, GitmarksError>) -> Self {
        match result {
            Ok(data) => LoadOutcome::Success { data },
            Err(err) => LoadOutcome::Failure {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

/// Uniform `{ success, data?, error? }` shape handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    pub fn failed(err: &GitmarksError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }
}

impl Response<()> {
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            kind: None,
        }
    }
}

impl From<LoadOutcome> for Response<BookmarkDocument> {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Success { data } => Response::ok(data),
            LoadOutcome::Failure { kind, message } => Self {
                success: false,
                data: None,
                error: Some(message),
                kind: Some(kind),
            },
        }
    }
}

fn trimmed_or(value: Option<String>, default: String) -> String {
    value.map(|value| value.trim().to_string()).unwrap_or(default)
}

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
