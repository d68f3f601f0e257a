use std::error::Error as _;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::domain::ConnectionConfig;
use crate::error::GitmarksError;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw response of one fetch, before any content checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFetchResult {
    pub status_code: u16,
    pub reason: String,
    pub content_type: String,
    pub body_text: String,
}

impl RemoteFetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Issues the GET for a bookmark source. HTTP error statuses are returned as
/// results; only transport failures become errors.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &Url,
        config: &ConnectionConfig,
    ) -> Result<RemoteFetchResult, GitmarksError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, GitmarksError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, GitmarksError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gitmarks/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GitmarksError::Network(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| GitmarksError::Network(err.to_string()))?;
        Ok(Self { client })
    }

    fn auth_header(config: &ConnectionConfig) -> Result<Option<HeaderValue>, GitmarksError> {
        if !config.has_token() {
            return Ok(None);
        }
        let mut value = HeaderValue::from_str(&format!("token {}", config.token)).map_err(|_| {
            GitmarksError::Network("access token contains invalid characters".to_string())
        })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &Url,
        config: &ConnectionConfig,
    ) -> Result<RemoteFetchResult, GitmarksError> {
        let mut request = self.client.get(url.as_str());
        if let Some(auth) = Self::auth_header(config)? {
            request = request.header(AUTHORIZATION, auth);
        }

        tracing::debug!(%url, authenticated = config.has_token(), "fetching bookmarks");
        let response = request.send().map_err(classify)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.bytes().map_err(classify)?;
        tracing::debug!(
            %url,
            status = status.as_u16(),
            content_type = %content_type,
            bytes = bytes.len(),
            "bookmark response received"
        );

        Ok(RemoteFetchResult {
            status_code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body_text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn classify(err: reqwest::Error) -> GitmarksError {
    let message = describe(&err);
    if err.is_timeout() {
        GitmarksError::Timeout(message)
    } else {
        GitmarksError::Network(message)
    }
}

// reqwest's top-level message omits the cause (DNS, refused, reset).
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
