use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::{BaseDirs, UserDirs};

use crate::domain::BookmarkDocument;
use crate::error::GitmarksError;

pub const EXPORT_FILE_NAME: &str = "bookmarks.json";

/// The user's download directory, or the home directory when the platform
/// does not define one.
pub fn default_export_dir() -> Result<Utf8PathBuf, GitmarksError> {
    let dir = UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(|dir| dir.to_path_buf()))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
        .ok_or_else(|| GitmarksError::Io("unable to resolve download directory".to_string()))?;
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|_| GitmarksError::Io("non-utf8 download directory".to_string()))
}

/// Writes `document` pretty-printed to `<dir>/bookmarks.json`, replacing any
/// previous export.
pub fn export_document(
    document: &BookmarkDocument,
    dir: &Utf8Path,
) -> Result<Utf8PathBuf, GitmarksError> {
    fs::create_dir_all(dir.as_std_path())
        .map_err(|err| GitmarksError::Io(format!("create {dir}: {err}")))?;
    let path = dir.join(EXPORT_FILE_NAME);
    let tmp_path = path.with_extension("json.tmp");
    let content =
        serde_json::to_vec_pretty(document).map_err(|err| GitmarksError::Io(err.to_string()))?;
    fs::write(tmp_path.as_std_path(), &content)
        .map_err(|err| GitmarksError::Io(format!("write {tmp_path}: {err}")))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| GitmarksError::Io(format!("rename to {path}: {err}")))?;
    tracing::info!(%path, "bookmarks exported");
    Ok(path)
}
