use chatipelago_admin::config::AdminConfig;
use chatipelago_admin::validation::{FlatCounts, ValidationProfile};
use tempfile::tempdir;

#[tokio::test]
async fn default_file_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chatipelago-admin.toml");
    let path = path.to_str().unwrap();

    AdminConfig::create_default(path).await.unwrap();
    let loaded = AdminConfig::load(path).await.unwrap();
    assert_eq!(loaded, AdminConfig::default());
}

#[tokio::test]
async fn profile_selects_counts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.toml");
    tokio::fs::write(&path, "[validation]\nprofile = \"legacy\"\n")
        .await
        .unwrap();

    let config = AdminConfig::load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(config.validation.profile, ValidationProfile::Legacy);
    assert_eq!(config.flat_counts(), FlatCounts::legacy());
    assert_eq!(config.api.base_url, "http://localhost:8015");
}

#[tokio::test]
async fn missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let path = path.to_str().unwrap();

    assert!(AdminConfig::load(path).await.is_err());
    assert_eq!(
        AdminConfig::load_or_default(path).await.unwrap(),
        AdminConfig::default()
    );
}

#[tokio::test]
async fn broken_file_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    tokio::fs::write(&path, "[api\nbase_url = 3").await.unwrap();

    let err = AdminConfig::load(path.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("broken.toml"), "{err}");
}
