use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::BookmarkDocument;
use crate::error::GitmarksError;
use crate::normalize;

/// File name of the bookmark copy shipped next to the executable.
pub const LOCAL_BOOKMARKS_FILE: &str = "bookmarks.json";

#[derive(Debug, Clone)]
pub struct LocalReader {
    path: Utf8PathBuf,
}

impl LocalReader {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reader for [`LOCAL_BOOKMARKS_FILE`] in the executable's directory.
    pub fn bundled() -> Result<Self, GitmarksError> {
        let exe = std::env::current_exe().map_err(|err| GitmarksError::Io(err.to_string()))?;
        Self::beside(&exe)
    }

    /// Like [`LocalReader::bundled`], but falls back to [`LOCAL_BOOKMARKS_FILE`]
    /// relative to the working directory when the executable path is unusable.
    pub fn bundled_or_relative() -> Self {
        Self::resolve_bundled(std::env::current_exe())
    }

    fn resolve_bundled(exe: io::Result<PathBuf>) -> Self {
        let resolved = exe
            .map_err(|err| GitmarksError::Io(err.to_string()))
            .and_then(|exe| Self::beside(&exe));
        match resolved {
            Ok(reader) => reader,
            Err(err) => {
                tracing::debug!(error = %err, "bundled bookmarks path unavailable");
                Self::new(LOCAL_BOOKMARKS_FILE)
            }
        }
    }

    fn beside(exe: &Path) -> Result<Self, GitmarksError> {
        let dir = exe
            .parent()
            .ok_or_else(|| GitmarksError::Io("executable has no parent directory".to_string()))?;
        let dir = Utf8PathBuf::from_path_buf(dir.to_path_buf())
            .map_err(|_| GitmarksError::Io("non-utf8 executable path".to_string()))?;
        Ok(Self::new(dir.join(LOCAL_BOOKMARKS_FILE)))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn read_local(&self) -> Result<BookmarkDocument, GitmarksError> {
        let bytes = match fs::read(self.path.as_std_path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(GitmarksError::NotFound(self.path.clone()));
            }
            Err(err) => return Err(GitmarksError::Io(format!("read {}: {err}", self.path))),
        };
        tracing::debug!(path = %self.path, bytes = bytes.len(), "read local bookmarks");
        normalize::parse_json(&String::from_utf8_lossy(&bytes))
    }
}
