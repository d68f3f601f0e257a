use std::time::Instant;

use camino::Utf8Path;
use url::Url;

use crate::config::ConfigStore;
use crate::domain::{BookmarkDocument, ConfigPatch, ConnectionConfig, LoadOutcome, Response};
use crate::error::GitmarksError;
use crate::export;
use crate::fetch::RemoteFetcher;
use crate::local::LocalReader;
use crate::normalize;
use crate::source::SourceUrl;

/// Caller-facing operations: config access plus the remote and local
/// bookmark loads. Every operation is independent; nothing is cached.
pub struct App<F: RemoteFetcher> {
    config_store: ConfigStore,
    fetcher: F,
    local: LocalReader,
}

impl<F: RemoteFetcher> App<F> {
    pub fn new(config_store: ConfigStore, fetcher: F, local: LocalReader) -> Self {
        Self {
            config_store,
            fetcher,
            local,
        }
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn local_reader(&self) -> &LocalReader {
        &self.local
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Build URL, fetch, check status, normalize. Failures of any step come
    /// back as [`LoadOutcome::Failure`]; no retries.
    pub fn load_from_remote(&self, config: &ConnectionConfig) -> LoadOutcome {
        self.try_load_from_remote(config).into()
    }

    pub fn try_load_from_remote(
        &self,
        config: &ConnectionConfig,
    ) -> Result<BookmarkDocument, GitmarksError> {
        if !config.is_configured() {
            return Err(GitmarksError::NotConfigured);
        }
        let url = SourceUrl::build(config)?;
        self.load_url(&url, config)
    }

    fn load_url(
        &self,
        url: &Url,
        config: &ConnectionConfig,
    ) -> Result<BookmarkDocument, GitmarksError> {
        let start = Instant::now();
        let result = self
            .fetcher
            .fetch(url, config)
            .inspect_err(|err| tracing::warn!(%url, error = %err, "bookmark fetch failed"))?;
        if !result.is_success() {
            tracing::warn!(
                %url,
                status = result.status_code,
                "bookmark source returned error status"
            );
            return Err(GitmarksError::HttpStatus {
                status: result.status_code,
                reason: result.reason,
            });
        }
        let document = normalize::normalize(&result.body_text, &result.content_type)
            .inspect_err(|err| tracing::warn!(%url, error = %err, "bookmark payload rejected"))?;
        tracing::debug!(
            %url,
            latency_ms = start.elapsed().as_millis() as u64,
            "bookmarks loaded"
        );
        Ok(document)
    }

    pub fn get_config(&self) -> ConnectionConfig {
        self.config_store.load()
    }

    pub fn save_config(&self, candidate: ConfigPatch) -> Response<()> {
        match self.config_store.save(candidate) {
            Ok(_) => Response::done(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to save config");
                Response::failed(&err)
            }
        }
    }

    /// Loads using the stored configuration.
    pub fn load_bookmarks(&self) -> Response<BookmarkDocument> {
        let config = self.config_store.load();
        self.load_from_remote(&config).into()
    }

    /// Loads from an explicit URL, authenticating with the stored token.
    pub fn load_bookmarks_from_remote(&self, url: &str) -> Response<BookmarkDocument> {
        LoadOutcome::from(self.try_load_from_url(url)).into()
    }

    pub fn try_load_from_url(&self, url: &str) -> Result<BookmarkDocument, GitmarksError> {
        let config = self.config_store.load();
        let url = SourceUrl::parse(url)?;
        self.load_url(&url, &config)
    }

    pub fn load_bookmarks_from_local(&self) -> Response<BookmarkDocument> {
        match self.local.read_local() {
            Ok(document) => Response::ok(document),
            Err(err) => {
                tracing::warn!(
                    path = %self.local.path(),
                    error = %err,
                    "local bookmarks unavailable"
                );
                Response::failed(&err)
            }
        }
    }

    /// Saves an already loaded document under `dir`; the written path is
    /// returned as data.
    pub fn export_bookmarks(
        &self,
        document: &BookmarkDocument,
        dir: &Utf8Path,
    ) -> Response<String> {
        match export::export_document(document, dir) {
            Ok(path) => Response::ok(path.into_string()),
            Err(err) => Response::failed(&err),
        }
    }
}
