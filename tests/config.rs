use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use gitmarks::config::ConfigStore;
use gitmarks::domain::{ConfigPatch, ConnectionConfig, DEFAULT_FILE_PATH};
use gitmarks::error::GitmarksError;

fn temp_store() -> (tempfile::TempDir, ConfigStore) {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().join("gitmarks")).unwrap();
    (temp, ConfigStore::new(dir))
}

#[test]
fn missing_file_yields_defaults() {
    let (_temp, store) = temp_store();
    let config = store.load();
    assert_eq!(config, ConnectionConfig::default());
    assert_eq!(config.file_path, DEFAULT_FILE_PATH);
    assert!(!config.use_mirror);
}

#[test]
fn missing_fields_are_backfilled() {
    let (_temp, store) = temp_store();
    std::fs::create_dir_all(store.dir().as_std_path()).unwrap();
    std::fs::write(
        store.path().as_std_path(),
        r#"{ "username": "alice", "repo": "bm", "token": "" }"#,
    )
    .unwrap();

    let config = store.load();
    assert_eq!(config.username, "alice");
    assert_eq!(config.repo, "bm");
    assert_eq!(config.file_path, DEFAULT_FILE_PATH);
    assert!(!config.use_mirror);
}

#[test]
fn null_and_unknown_keys_are_tolerated() {
    let (_temp, store) = temp_store();
    std::fs::create_dir_all(store.dir().as_std_path()).unwrap();
    std::fs::write(
        store.path().as_std_path(),
        r#"{ "username": null, "repo": "bm", "useMirror": true, "theme": "dark" }"#,
    )
    .unwrap();

    let config = store.load();
    assert_eq!(config.username, "");
    assert_eq!(config.repo, "bm");
    assert!(config.use_mirror);
}

#[test]
fn corrupt_file_yields_defaults() {
    let (_temp, store) = temp_store();
    std::fs::create_dir_all(store.dir().as_std_path()).unwrap();
    std::fs::write(store.path().as_std_path(), "{ username: alice").unwrap();
    assert_eq!(store.load(), ConnectionConfig::default());
}

#[test]
fn leading_bom_is_accepted() {
    let (_temp, store) = temp_store();
    std::fs::create_dir_all(store.dir().as_std_path()).unwrap();
    std::fs::write(
        store.path().as_std_path(),
        "\u{feff}{\"username\":\"alice\",\"repo\":\"bm\"}",
    )
    .unwrap();
    assert_eq!(store.load().username, "alice");
}

#[test]
fn save_then_load_matches_defaulted_candidate() {
    let candidates = vec![
        ConfigPatch::default(),
        ConfigPatch {
            username: Some("alice".to_string()),
            ..ConfigPatch::default()
        },
        ConfigPatch {
            repo: Some("bm".to_string()),
            use_mirror: Some(true),
            ..ConfigPatch::default()
        },
        ConfigPatch {
            username: Some(" alice ".to_string()),
            repo: Some("bm".to_string()),
            file_path: Some("data/marks.json".to_string()),
            token: Some("ghp_abc".to_string()),
            use_mirror: Some(false),
        },
    ];

    for candidate in candidates {
        let (_temp, store) = temp_store();
        let expected = ConnectionConfig::from_patch(candidate.clone());
        let saved = store.save(candidate).unwrap();
        assert_eq!(saved, expected);
        assert_eq!(store.load(), expected);
    }
}

#[test]
fn saved_file_is_complete_camel_case_json_without_bom() {
    let (_temp, store) = temp_store();
    store
        .save(ConfigPatch {
            username: Some("alice".to_string()),
            ..ConfigPatch::default()
        })
        .unwrap();

    let bytes = std::fs::read(store.path().as_std_path()).unwrap();
    assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let object = value.as_object().unwrap();
    for key in ["username", "repo", "filePath", "token", "useMirror"] {
        assert!(object.contains_key(key), "missing key {key}");
    }
    assert_eq!(object["filePath"], "bookmarks.json");
    assert_eq!(object["useMirror"], false);
}

#[test]
fn save_overwrites_previous_content() {
    let (_temp, store) = temp_store();
    store
        .save(ConfigPatch {
            username: Some("alice".to_string()),
            token: Some("first".to_string()),
            ..ConfigPatch::default()
        })
        .unwrap();
    store
        .save(ConfigPatch {
            username: Some("bob".to_string()),
            ..ConfigPatch::default()
        })
        .unwrap();

    let config = store.load();
    assert_eq!(config.username, "bob");
    assert_eq!(config.token, "");
    let leftovers = std::fs::read_dir(store.dir().as_std_path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name() != "config.json")
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn save_reports_io_failure() {
    let temp = tempfile::tempdir().unwrap();
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let dir = Utf8PathBuf::from_path_buf(blocker.join("nested")).unwrap();
    let store = ConfigStore::new(dir);

    let err = store.save(ConfigPatch::default()).unwrap_err();
    assert_matches!(err, GitmarksError::Io(_));
}
