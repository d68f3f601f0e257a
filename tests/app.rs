use std::sync::Mutex;

use camino::Utf8PathBuf;
use serde_json::json;
use url::Url;

use gitmarks::app::App;
use gitmarks::config::ConfigStore;
use gitmarks::domain::{ConfigPatch, ConnectionConfig, LoadOutcome, Response};
use gitmarks::error::{FailureKind, GitmarksError};
use gitmarks::fetch::{RemoteFetchResult, RemoteFetcher};
use gitmarks::local::LocalReader;

#[derive(Clone)]
enum Reply {
    Body {
        status: u16,
        reason: &'static str,
        content_type: &'static str,
        body: &'static str,
    },
    Timeout,
    Network,
}

struct MockFetcher {
    reply: Reply,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockFetcher {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn ok(content_type: &'static str, body: &'static str) -> Self {
        Self::new(Reply::Body {
            status: 200,
            reason: "OK",
            content_type,
            body,
        })
    }
}

impl RemoteFetcher for MockFetcher {
    fn fetch(
        &self,
        url: &Url,
        config: &ConnectionConfig,
    ) -> Result<RemoteFetchResult, GitmarksError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), config.token.clone()));
        match self.reply.clone() {
            Reply::Body {
                status,
                reason,
                content_type,
                body,
            } => Ok(RemoteFetchResult {
                status_code: status,
                reason: reason.to_string(),
                content_type: content_type.to_string(),
                body_text: body.to_string(),
            }),
            Reply::Timeout => Err(GitmarksError::Timeout("operation timed out".to_string())),
            Reply::Network => Err(GitmarksError::Network("dns error".to_string())),
        }
    }
}

struct Fixture {
    _temp: tempfile::TempDir,
    app: App<MockFetcher>,
}

impl Fixture {
    fn new(fetcher: MockFetcher) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let store = ConfigStore::new(root.join("config"));
        let local = LocalReader::new(root.join("bookmarks.json"));
        Self {
            _temp: temp,
            app: App::new(store, fetcher, local),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.app.fetcher().calls.lock().unwrap().clone()
    }
}

fn alice() -> ConnectionConfig {
    ConnectionConfig {
        username: "alice".to_string(),
        repo: "bm".to_string(),
        file_path: "bookmarks.json".to_string(),
        token: String::new(),
        use_mirror: false,
    }
}

fn failure_kind(outcome: &LoadOutcome) -> Option<FailureKind> {
    match outcome {
        LoadOutcome::Failure { kind, .. } => Some(*kind),
        LoadOutcome::Success { .. } => None,
    }
}

#[test]
fn end_to_end_remote_load() {
    let fixture = Fixture::new(MockFetcher::ok(
        "text/plain; charset=utf-8",
        r#"[{"title":"x","url":"http://x"}]"#,
    ));

    let outcome = fixture.app.load_from_remote(&alice());

    assert_eq!(
        outcome,
        LoadOutcome::Success {
            data: json!([{ "title": "x", "url": "http://x" }])
        }
    );
    assert_eq!(
        fixture.calls(),
        vec![(
            "https://raw.githubusercontent.com/alice/bm/main/bookmarks.json".to_string(),
            String::new()
        )]
    );
}

#[test]
fn unconfigured_load_fails_without_fetching() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[]"));
    let outcome = fixture.app.load_from_remote(&ConnectionConfig::default());
    assert_eq!(failure_kind(&outcome), Some(FailureKind::NotConfigured));
    assert!(fixture.calls().is_empty());
}

#[test]
fn error_status_is_reported_with_code_and_reason() {
    let fixture = Fixture::new(MockFetcher::new(Reply::Body {
        status: 404,
        reason: "Not Found",
        content_type: "text/plain; charset=utf-8",
        body: "404: Not Found",
    }));

    let outcome = fixture.app.load_from_remote(&alice());
    match outcome {
        LoadOutcome::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::HttpStatus);
            assert!(message.contains("404"));
            assert!(message.contains("Not Found"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn html_success_page_is_wrong_target() {
    let fixture = Fixture::new(MockFetcher::ok(
        "text/html; charset=utf-8",
        "<!DOCTYPE html><html><body>repo page</body></html>",
    ));
    let outcome = fixture.app.load_from_remote(&alice());
    assert_eq!(failure_kind(&outcome), Some(FailureKind::WrongTarget));
}

#[test]
fn transport_failures_keep_their_kind() {
    let fixture = Fixture::new(MockFetcher::new(Reply::Timeout));
    let outcome = fixture.app.load_from_remote(&alice());
    assert_eq!(failure_kind(&outcome), Some(FailureKind::Timeout));

    let fixture = Fixture::new(MockFetcher::new(Reply::Network));
    let outcome = fixture.app.load_from_remote(&alice());
    assert_eq!(failure_kind(&outcome), Some(FailureKind::Network));
}

#[test]
fn empty_and_malformed_bodies() {
    let fixture = Fixture::new(MockFetcher::ok("text/plain", "  \n "));
    let outcome = fixture.app.load_from_remote(&alice());
    assert_eq!(failure_kind(&outcome), Some(FailureKind::EmptyContent));

    let fixture = Fixture::new(MockFetcher::ok("application/json", "{not json"));
    let outcome = fixture.app.load_from_remote(&alice());
    assert_eq!(failure_kind(&outcome), Some(FailureKind::MalformedContent));
}

#[test]
fn each_load_fetches_again() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[]"));
    assert!(fixture.app.load_from_remote(&alice()).is_success());
    assert!(fixture.app.load_from_remote(&alice()).is_success());
    assert_eq!(fixture.calls().len(), 2);
}

#[test]
fn mirror_setting_reaches_the_fetcher() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[]"));
    let config = ConnectionConfig {
        use_mirror: true,
        ..alice()
    };
    fixture.app.load_from_remote(&config);
    assert_eq!(
        fixture.calls()[0].0,
        "https://raw.githack.com/alice/bm/main/bookmarks.json"
    );
}

#[test]
fn stored_config_drives_load_bookmarks() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", r#"{"a":1}"#));
    let saved = fixture.app.save_config(ConfigPatch {
        username: Some("alice".to_string()),
        repo: Some("bm".to_string()),
        token: Some("tok".to_string()),
        ..ConfigPatch::default()
    });
    assert!(saved.success);
    assert_eq!(fixture.app.get_config().file_path, "bookmarks.json");

    let response = fixture.app.load_bookmarks();
    assert!(response.success);
    assert_eq!(response.data, Some(json!({ "a": 1 })));
    assert_eq!(fixture.calls()[0].1, "tok");
}

#[test]
fn explicit_url_uses_stored_token() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[1]"));
    fixture.app.save_config(ConfigPatch {
        token: Some("tok".to_string()),
        ..ConfigPatch::default()
    });

    let response = fixture
        .app
        .load_bookmarks_from_remote("https://example.com/marks.json");
    assert!(response.success);
    assert_eq!(
        fixture.calls(),
        vec![("https://example.com/marks.json".to_string(), "tok".to_string())]
    );
}

#[test]
fn invalid_explicit_url_is_a_structured_failure() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[]"));
    let response = fixture.app.load_bookmarks_from_remote("not a url");
    assert!(!response.success);
    assert_eq!(response.kind, Some(FailureKind::InvalidUrl));
    assert!(response.error.is_some());
    assert!(fixture.calls().is_empty());
}

#[test]
fn local_load_reports_missing_file() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[]"));
    let response = fixture.app.load_bookmarks_from_local();
    assert!(!response.success);
    assert_eq!(response.kind, Some(FailureKind::NotFound));
}

#[test]
fn local_load_reads_present_file() {
    let fixture = Fixture::new(MockFetcher::ok("application/json", "[]"));
    std::fs::write(
        fixture.app.local_reader().path().as_std_path(),
        r#"[{"title":"local","url":"file:///x"}]"#,
    )
    .unwrap();
    let response = fixture.app.load_bookmarks_from_local();
    assert!(response.success);
    assert_eq!(
        response.data,
        Some(json!([{ "title": "local", "url": "file:///x" }]))
    );
    assert!(fixture.calls().is_empty());
}

#[test]
fn failed_response_serializes_without_data() {
    let fixture = Fixture::new(MockFetcher::new(Reply::Network));
    let response: Response<serde_json::Value> = fixture.app.load_from_remote(&alice()).into();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["success"], false);
    assert!(value.get("data").is_none());
    assert!(value["error"].as_str().unwrap().contains("dns error"));
    assert_eq!(value["kind"], "network");
}
