use chatipelago_admin::content::{load_content_file, ContentDocument, MAX_CONTENT_FILE_BYTES};
use chatipelago_admin::error::LoadError;
use chatipelago_admin::template::load_template_file;
use tempfile::tempdir;

#[tokio::test]
async fn flat_yaml_is_detected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("content.yml");
    tokio::fs::write(
        &path,
        "items:\n  - Sword\n  - Shield\nprogitems:\n  - Key\nlocations:\n  - Lobby\n",
    )
    .await
    .unwrap();

    let doc = load_content_file(&path).await.unwrap();
    assert!(matches!(doc, ContentDocument::Flat(_)));
    assert_eq!(doc.counts().generic, 2);
    assert_eq!(doc.counts().progression, 1);
}

#[tokio::test]
async fn nested_yaml_is_detected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("content.YAML");
    tokio::fs::write(
        &path,
        "items:\n  normal: [Sword]\n  trap: []\n  filler: []\n  prog: []\nlocations:\n  chatroom: [Lobby]\n  prog: []\n",
    )
    .await
    .unwrap();

    let doc = load_content_file(&path).await.unwrap();
    assert!(doc.is_nested());
}

#[tokio::test]
async fn wrong_extension_is_rejected_before_reading() {
    let err = load_content_file("does-not-exist.json").await.unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedExtension));
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("huge.yaml");
    let body = "# padding\n".repeat((MAX_CONTENT_FILE_BYTES as usize / 10) + 1);
    tokio::fs::write(&path, body).await.unwrap();

    let err = load_content_file(&path).await.unwrap_err();
    assert!(matches!(err, LoadError::TooLarge { .. }), "{err}");
}

#[tokio::test]
async fn broken_yaml_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    tokio::fs::write(&path, "items: [Sword\n").await.unwrap();

    let err = load_content_file(&path).await.unwrap_err();
    assert!(matches!(err, LoadError::Yaml(_)));
    assert!(err.to_string().starts_with("Invalid YAML format"));
}

#[tokio::test]
async fn template_files_load_as_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trap.json");
    tokio::fs::write(&path, r#"{"messages": ["{player} stepped on a trap"]}"#)
        .await
        .unwrap();
    let value = load_template_file(&path).await.unwrap();
    assert_eq!(value["messages"][0], "{player} stepped on a trap");

    let missing = load_template_file(dir.path().join("nope.json")).await;
    assert!(matches!(missing, Err(LoadError::Io { .. })));
}
