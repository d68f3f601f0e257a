use crate::domain::BookmarkDocument;
use crate::error::GitmarksError;

const BOM: char = '\u{feff}';

/// Turns a response body into a [`BookmarkDocument`].
///
/// The content type is only consulted once JSON parsing has failed, so JSON
/// served as `text/plain` (GitHub's raw host does this) still loads.
pub fn normalize(body_text: &str, content_type: &str) -> Result<BookmarkDocument, GitmarksError> {
    parse_json(body_text).map_err(|err| match err {
        GitmarksError::MalformedContent(_) if is_html(content_type) => GitmarksError::WrongTarget {
            content_type: content_type.to_string(),
        },
        other => other,
    })
}

/// BOM stripping, empty check and parse, without content-type diagnosis.
pub fn parse_json(text: &str) -> Result<BookmarkDocument, GitmarksError> {
    let text = strip_bom(text.trim()).trim();
    if text.is_empty() {
        return Err(GitmarksError::EmptyContent);
    }
    serde_json::from_str(text).map_err(|err| GitmarksError::MalformedContent(err.to_string()))
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

pub fn is_html(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("text/html")
        || essence.eq_ignore_ascii_case("application/xhtml+xml")
}
