//! The real Gemini and Algolia clients, wired from configuration, against
//! local mock servers.

use std::collections::HashMap;

use mockito::{Matcher, Server};

use cookmate_app::config::{DEFAULT_GEMINI_MODEL, GEMINI_MISSING_WARNING};
use cookmate_app::services::SearchNotice;
use cookmate_app::{AppConfig, AppState};
use cookmate_core::Provider;
use cookmate_integration_tests::AI_REPLY;

fn config(vars: &[(&str, String)]) -> AppConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("config")
}

#[tokio::test]
async fn test_configured_state_talks_to_both_services() {
    let mut gemini = Server::new_async().await;
    let mut algolia = Server::new_async().await;
    let data = tempfile::tempdir().expect("tempdir");

    let reply = serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": AI_REPLY}]},
            "finishReason": "STOP"
        }]
    });
    let gemini_mock = gemini
        .mock(
            "POST",
            format!("/v1beta/models/{DEFAULT_GEMINI_MODEL}:generateContent").as_str(),
        )
        .match_header("x-goog-api-key", "live-gemini-key")
        .match_body(Matcher::Regex("Generate a unique recipe".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply.to_string())
        .create_async()
        .await;

    let algolia_mock = algolia
        .mock("POST", "/1/indexes/recipes/query")
        .match_header("x-algolia-application-id", "APP42")
        .match_header("x-algolia-api-key", "live-search-key")
        .match_body(Matcher::PartialJson(serde_json::json!({"query": "stew"})))
        .with_status(200)
        .with_body(r#"{"hits":[{"objectID":"s1","name":"Irish Stew","servings":6}]}"#)
        .create_async()
        .await;

    let config = config(&[
        ("COOKMATE_DATA_DIR", data.path().display().to_string()),
        ("GEMINI_API_KEY", "live-gemini-key".to_string()),
        ("GEMINI_API_BASE_URL", gemini.url()),
        ("ALGOLIA_APP_ID", "APP42".to_string()),
        ("ALGOLIA_SEARCH_KEY", "live-search-key".to_string()),
        ("ALGOLIA_HOST", algolia.url()),
    ]);
    assert!(config.warnings().is_empty());

    let state = AppState::from_config(&config).expect("state");
    state.load().expect("load");
    assert!(state.warnings().is_empty());

    state.search().commit("stew".to_string()).await;
    let board = state.board().snapshot();
    assert_eq!(board.len(), 1);
    let stew = board.first().expect("hit");
    assert_eq!(stew.name, "Irish Stew");
    assert_eq!(stew.servings, 6);
    assert_eq!(state.search().snapshot().notice, None);

    let recipe = state.generation().generate().await.expect("generate");
    assert_eq!(recipe.name, "Chickpea Spinach Stew");
    assert_eq!(state.board().snapshot().first(), Some(&recipe));

    gemini_mock.assert_async().await;
    algolia_mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_search_key_falls_back_locally() {
    let mut algolia = Server::new_async().await;
    let data = tempfile::tempdir().expect("tempdir");

    let _mock = algolia
        .mock("POST", "/1/indexes/recipes/query")
        .with_status(403)
        .with_body(r#"{"message":"Invalid Application-ID or API key","status":403}"#)
        .create_async()
        .await;

    let config = config(&[
        ("COOKMATE_DATA_DIR", data.path().display().to_string()),
        ("ALGOLIA_APP_ID", "APP42".to_string()),
        ("ALGOLIA_SEARCH_KEY", "revoked-key".to_string()),
        ("ALGOLIA_HOST", algolia.url()),
    ]);
    assert_eq!(config.warnings(), [GEMINI_MISSING_WARNING]);

    let state = AppState::from_config(&config).expect("state");
    state.load().expect("load");

    state.search().commit("pasta".to_string()).await;
    let names: Vec<String> = state.board().snapshot().into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["Speedy Tomato Pasta"]);
    assert!(matches!(
        state.search().snapshot().notice,
        Some(SearchNotice::RemoteFailed { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_file_store_lives_in_configured_directory() {
    let data = tempfile::tempdir().expect("tempdir");
    let dir = data.path().join("nested");
    let config = config(&[("COOKMATE_DATA_DIR", dir.display().to_string())]);

    let state = AppState::from_config(&config).expect("state");
    state.load().expect("load");
    state.auth().login(Provider::Mock).await.expect("login");

    assert!(dir.join("authUser.json").is_file());
}
