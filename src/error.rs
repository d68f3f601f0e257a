use camino::Utf8PathBuf;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GitmarksError {
    #[error("network request failed: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("remote returned status {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("bookmark file is empty")]
    EmptyContent,

    #[error(
        "remote returned an HTML page ({content_type}) instead of JSON; check that the URL points at the raw file"
    )]
    WrongTarget { content_type: String },

    #[error("bookmark file is not valid JSON: {0}")]
    MalformedContent(String),

    #[error("local bookmark file not found at {0}")]
    NotFound(Utf8PathBuf),

    #[error("filesystem error: {0}")]
    Io(String),

    #[error("GitHub username and repository must be configured first")]
    NotConfigured,

    #[error("invalid source URL: {0}")]
    InvalidUrl(String),
}

/// Serializable tag for a [`GitmarksError`], used in caller-facing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Timeout,
    HttpStatus,
    EmptyContent,
    WrongTarget,
    MalformedContent,
    NotFound,
    Io,
    NotConfigured,
    InvalidUrl,
}

/// Where a failing load read its document from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    Remote,
    Local,
}

impl GitmarksError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GitmarksError::Network(_) => FailureKind::Network,
            GitmarksError::Timeout(_) => FailureKind::Timeout,
            GitmarksError::HttpStatus { .. } => FailureKind::HttpStatus,
            GitmarksError::EmptyContent => FailureKind::EmptyContent,
            GitmarksError::WrongTarget { .. } => FailureKind::WrongTarget,
            GitmarksError::MalformedContent(_) => FailureKind::MalformedContent,
            GitmarksError::NotFound(_) => FailureKind::NotFound,
            GitmarksError::Io(_) => FailureKind::Io,
            GitmarksError::NotConfigured => FailureKind::NotConfigured,
            GitmarksError::InvalidUrl(_) => FailureKind::InvalidUrl,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Network
                | FailureKind::Timeout
                | FailureKind::HttpStatus
                | FailureKind::WrongTarget
        )
    }

    /// Process exit code: 2 for config and local-file problems, 3 for remote
    /// problems (transport or payload), 1 for filesystem errors.
    pub fn exit_code(&self, origin: ErrorOrigin) -> u8 {
        if self.is_remote() {
            return 3;
        }
        match self {
            GitmarksError::Io(_) => 1,
            GitmarksError::EmptyContent | GitmarksError::MalformedContent(_)
                if origin == ErrorOrigin::Remote =>
            {
                3
            }
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_carries_code_and_reason() {
        let err = GitmarksError::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "remote returned status 404: Not Found");
        assert_eq!(err.kind(), FailureKind::HttpStatus);
        assert!(err.is_remote());
    }

    #[test]
    fn content_errors_are_not_remote() {
        assert!(!GitmarksError::EmptyContent.is_remote());
        assert!(!GitmarksError::MalformedContent("eof".to_string()).is_remote());
    }

    #[test]
    fn bad_local_file_exits_like_a_config_problem() {
        let malformed = GitmarksError::MalformedContent("eof".to_string());
        assert_eq!(malformed.exit_code(ErrorOrigin::Local), 2);
        assert_eq!(GitmarksError::EmptyContent.exit_code(ErrorOrigin::Local), 2);
        assert_eq!(
            GitmarksError::NotFound("bookmarks.json".into()).exit_code(ErrorOrigin::Local),
            2
        );
    }

    #[test]
    fn bad_remote_payload_exits_like_a_network_problem() {
        let malformed = GitmarksError::MalformedContent("eof".to_string());
        assert_eq!(malformed.exit_code(ErrorOrigin::Remote), 3);
        assert_eq!(GitmarksError::EmptyContent.exit_code(ErrorOrigin::Remote), 3);
        assert_eq!(
            GitmarksError::Timeout("slow".to_string()).exit_code(ErrorOrigin::Remote),
            3
        );
        let wrong = GitmarksError::WrongTarget {
            content_type: "text/html".to_string(),
        };
        assert_eq!(wrong.exit_code(ErrorOrigin::Remote), 3);
    }

    #[test]
    fn config_and_filesystem_exit_codes() {
        assert_eq!(GitmarksError::NotConfigured.exit_code(ErrorOrigin::Remote), 2);
        assert_eq!(
            GitmarksError::InvalidUrl("ftp://x".to_string()).exit_code(ErrorOrigin::Remote),
            2
        );
        assert_eq!(
            GitmarksError::Io("disk full".to_string()).exit_code(ErrorOrigin::Local),
            1
        );
    }
}
