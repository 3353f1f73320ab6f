use httpmock::prelude::*;
use qsine::app::flows::SettingsFlow;
use qsine::core::profile::STORAGE_KEY;
use qsine::{HttpBackend, LocalStorage, ProfileState, ProfileStore};
use std::time::Duration;
use tempfile::TempDir;

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

async fn settings(
    server: &MockServer,
    dir: &TempDir,
) -> SettingsFlow<HttpBackend, LocalStorage> {
    let store = ProfileStore::new(LocalStorage::new(dir.path()));
    SettingsFlow::new(backend(server), ProfileState::load(store).await)
}

#[tokio::test]
async fn test_selection_survives_restart() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let mut flow = settings(&server, &dir).await;
    assert!(flow.profile().is_empty());

    flow.toggle("milk").await;
    flow.toggle("peanuts").await;
    flow.toggle("soy").await;
    flow.toggle("peanuts").await;
    assert_eq!(flow.profile().ids(), ["milk", "soy"]);

    let stored = LocalStorage::new(dir.path()).path_for(STORAGE_KEY);
    let raw = std::fs::read_to_string(&stored).unwrap();
    assert_eq!(raw, r#"["milk","soy"]"#);

    // 重新開啟 app
    let reopened = settings(&server, &dir).await;
    assert_eq!(reopened.profile().ids(), ["milk", "soy"]);
    assert!(reopened.is_selected("soy"));
    assert!(!reopened.is_selected("peanuts"));
}

#[tokio::test]
async fn test_clear_removes_stored_profile() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let mut flow = settings(&server, &dir).await;
    flow.set(vec!["eggs".to_string(), "fish".to_string()]).await;
    let stored = LocalStorage::new(dir.path()).path_for(STORAGE_KEY);
    assert!(stored.exists());

    assert!(flow.clear().await.is_empty());
    assert!(!stored.exists());
    assert!(settings(&server, &dir).await.profile().is_empty());
}

#[tokio::test]
async fn test_corrupt_profile_loads_empty() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let stored = LocalStorage::new(dir.path()).path_for(STORAGE_KEY);
    std::fs::write(&stored, "{not json").unwrap();

    let mut flow = settings(&server, &dir).await;
    assert!(flow.profile().is_empty());

    // 下一次儲存會覆寫壞掉的檔案
    flow.toggle("wheat").await;
    assert_eq!(std::fs::read_to_string(&stored).unwrap(), r#"["wheat"]"#);
}

#[tokio::test]
async fn test_catalogue_search_is_sorted_and_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let catalogue = server.mock(|when, then| {
        when.method(GET).path("/get-allergens");
        then.status(200).json_body(serde_json::json!([
            {"id": "tree_nuts", "name": "tree nuts"},
            {"id": "milk", "name": "Milk"},
            {"id": "peanuts", "name": "peanuts"},
            {"id": "coconut", "name": "Coconut"}
        ]));
    });

    let mut flow = settings(&server, &dir).await;
    let scope = qsine::ScreenScope::new("settings");
    assert_eq!(flow.load_catalogue(&scope).await.unwrap().len(), 4);
    catalogue.assert();

    let names: Vec<String> = flow.visible("NUT").into_iter().map(|a| a.name).collect();
    assert_eq!(names, ["Coconut", "peanuts", "tree nuts"]);
    assert_eq!(flow.visible("").len(), 4);
    assert!(flow.visible("shellfish").is_empty());
}

#[tokio::test]
async fn test_catalogue_failure_keeps_profile_usable() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/get-allergens");
        then.status(503).json_body(serde_json::json!({"message": "maintenance"}));
    });

    let mut flow = settings(&server, &dir).await;
    let scope = qsine::ScreenScope::new("settings");
    assert!(flow.load_catalogue(&scope).await.is_err());
    assert!(flow.visible("").is_empty());

    flow.toggle("milk").await;
    let state = flow.into_state();
    assert!(state.profile().contains("milk"));
}
