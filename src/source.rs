use url::Url;

use crate::domain::ConnectionConfig;
use crate::error::GitmarksError;

pub const BRANCH: &str = "main";

const RAW_BASE: &str = "https://raw.githubusercontent.com/";
// Serves the same /<user>/<repo>/<branch>/<path> layout as the raw host.
const MIRROR_BASE: &str = "https://raw.githack.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Raw,
    Mirror,
}

impl Host {
    pub fn for_config(config: &ConnectionConfig) -> Self {
        if config.use_mirror {
            Host::Mirror
        } else {
            Host::Raw
        }
    }

    pub fn base(self) -> &'static str {
        match self {
            Host::Raw => RAW_BASE,
            Host::Mirror => MIRROR_BASE,
        }
    }
}

pub struct SourceUrl;

impl SourceUrl {
    /// Raw-content URL for the configured bookmark file:
    /// `https://<host>/<username>/<repo>/main/<file_path>`.
    ///
    /// Each path segment is percent-encoded; `/` inside `file_path` separates
    /// segments and empty segments are dropped. `.` and `..` segments are
    /// rejected, since they would resolve to another repository or file.
    pub fn build(config: &ConnectionConfig) -> Result<Url, GitmarksError> {
        let file_segments: Vec<&str> = config
            .file_path
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        let fixed = [config.username.trim(), config.repo.trim()];
        if let Some(dot) = fixed
            .iter()
            .chain(file_segments.iter())
            .find(|segment| matches!(**segment, "." | ".."))
        {
            return Err(GitmarksError::InvalidUrl(format!(
                "path segment `{dot}` is not allowed"
            )));
        }

        let host = Host::for_config(config);
        let mut url =
            Url::parse(host.base()).map_err(|err| GitmarksError::InvalidUrl(err.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GitmarksError::InvalidUrl(host.base().to_string()))?;
            segments.pop_if_empty();
            segments.extend(fixed);
            segments.push(BRANCH);
            segments.extend(file_segments);
        }
        Ok(url)
    }

    /// Parses a caller-supplied URL. Only http and https are accepted.
    pub fn parse(raw: &str) -> Result<Url, GitmarksError> {
        let url = Url::parse(raw.trim())
            .map_err(|err| GitmarksError::InvalidUrl(format!("{raw}: {err}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(GitmarksError::InvalidUrl(format!(
                "{raw}: unsupported scheme {scheme}"
            ))),
        }
    }
}
