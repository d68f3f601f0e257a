use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use tempfile::Builder;

use crate::domain::{ConfigPatch, ConnectionConfig};
use crate::error::GitmarksError;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Loads and saves [`ConnectionConfig`] as `config.json` inside one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: Utf8PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the per-user configuration directory.
    pub fn from_default_location() -> Result<Self, GitmarksError> {
        let dir = ProjectDirs::from("", "", "gitmarks")
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok())
            .ok_or_else(|| GitmarksError::Io("unable to resolve config directory".to_string()))?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn path(&self) -> Utf8PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Never fails: a missing, unreadable or corrupt file yields defaults, and
    /// fields absent from the file are backfilled.
    pub fn load(&self) -> ConnectionConfig {
        let path = self.path();
        let content = match fs::read_to_string(path.as_std_path()) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(%path, "no config file, using defaults");
                return ConnectionConfig::default();
            }
            Err(err) => {
                tracing::warn!(%path, error = %err, "failed to read config, using defaults");
                return ConnectionConfig::default();
            }
        };

        match serde_json::from_str::<ConfigPatch>(content.trim_start_matches('\u{feff}')) {
            Ok(patch) => ConnectionConfig::from_patch(patch),
            Err(err) => {
                tracing::warn!(%path, error = %err, "failed to parse config, using defaults");
                ConnectionConfig::default()
            }
        }
    }

    /// Completes `candidate` with defaults and overwrites the config file.
    /// Returns the record that was written.
    pub fn save(&self, candidate: ConfigPatch) -> Result<ConnectionConfig, GitmarksError> {
        let config = ConnectionConfig::from_patch(candidate);
        fs::create_dir_all(self.dir.as_std_path())
            .map_err(|err| GitmarksError::Io(format!("create {}: {err}", self.dir)))?;

        let mut content = serde_json::to_vec_pretty(&config)
            .map_err(|err| GitmarksError::Io(err.to_string()))?;
        content.push(b'\n');

        let path = self.path();
        let mut temp = Builder::new()
            .prefix(".config")
            .suffix(".json.tmp")
            .tempfile_in(self.dir.as_std_path())
            .map_err(|err| GitmarksError::Io(format!("create temp file in {}: {err}", self.dir)))?;
        temp.write_all(&content)
            .map_err(|err| GitmarksError::Io(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| GitmarksError::Io(format!("write {path}: {}", err.error)))?;

        tracing::debug!(%path, configured = config.is_configured(), "config saved");
        Ok(config)
    }
}
