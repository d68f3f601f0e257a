use serde_json::{Map, Value};

/// One display row of a flattened bookmark document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub depth: usize,
    pub label: String,
    pub url: Option<String>,
    pub folder: bool,
}

impl ViewLine {
    fn entry(depth: usize, label: String, url: Option<String>) -> Self {
        Self {
            depth,
            label,
            url,
            folder: false,
        }
    }

    fn folder(depth: usize, label: String) -> Self {
        Self {
            depth,
            label,
            url: None,
            folder: true,
        }
    }
}

const CHILD_KEYS: &[&str] = &["children", "bookmarks", "items"];
const TITLE_KEYS: &[&str] = &["title", "name"];

/// Flattens an arbitrary document into indented rows.
///
/// Objects with a string `url` become bookmark rows labelled by `title` or
/// `name`. Objects holding a `children`, `bookmarks` or `items` array become
/// folders. Anything else is shown key by key, scalars as compact JSON.
pub fn flatten_document(document: &Value) -> Vec<ViewLine> {
    let mut lines = Vec::new();
    flatten_value(document, 0, &mut lines);
    lines
}

pub fn count_bookmarks(lines: &[ViewLine]) -> usize {
    lines.iter().filter(|line| line.url.is_some()).count()
}

fn flatten_value(value: &Value, depth: usize, lines: &mut Vec<ViewLine>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_value(item, depth, lines);
            }
        }
        Value::Object(map) => flatten_object(map, depth, lines),
        scalar => lines.push(ViewLine::entry(depth, scalar.to_string(), None)),
    }
}

fn flatten_object(map: &Map<String, Value>, depth: usize, lines: &mut Vec<ViewLine>) {
    let title = TITLE_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    if let Some(url) = map.get("url").and_then(Value::as_str) {
        let label = title.unwrap_or_else(|| url.to_string());
        lines.push(ViewLine::entry(depth, label, Some(url.to_string())));
        return;
    }

    let children = CHILD_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|value| value.is_array()));
    if let Some(children) = children {
        lines.push(ViewLine::folder(
            depth,
            title.unwrap_or_else(|| "(untitled)".to_string()),
        ));
        flatten_value(children, depth + 1, lines);
        return;
    }

    for (key, value) in map {
        match value {
            Value::Array(_) | Value::Object(_) => {
                lines.push(ViewLine::folder(depth, key.clone()));
                flatten_value(value, depth + 1, lines);
            }
            scalar => lines.push(ViewLine::entry(depth, format!("{key}: {scalar}"), None)),
        }
    }
}
