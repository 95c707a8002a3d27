//! API tests for the game's static resources

use game_automation::{api_client, Config, ManifestBody, RunTimer};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(base_url: &str) -> Config {
    Config::from_toml(&format!(
        "[app]\nbase_url = \"{}/\"\nui_delay = 5.0\n",
        base_url
    ))
    .unwrap()
}

fn manifest_json() -> serde_json::Value {
    json!({
        "short_name": "TicTacToe",
        "name": "Tic Tac Toe Game",
        "icons": [
            { "src": "favicon.ico", "sizes": "64x64 32x32 24x24 16x16", "type": "image/x-icon" }
        ],
        "start_url": "./index.html",
        "display": "standalone",
        "theme_color": "#000000",
        "background_color": "#ffffff"
    })
}

#[tokio::test]
async fn manifest_json_returns_200_ok() {
    let _timer = RunTimer::start("TestStaticResources/1");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_json()))
        .mount(&server)
        .await;

    let client = api_client(&config_for(&server.uri())).unwrap();
    let (body, meta) = client.get_manifest().await.unwrap();

    assert!(body.is_json());
    assert_eq!(meta.status.as_u16(), 200);
    assert_eq!(meta.reason, "OK");
    assert!(meta
        .content_type
        .as_deref()
        .unwrap_or_default()
        .contains("application/json"));
}

#[tokio::test]
async fn manifest_content_has_expected_keys() {
    let _timer = RunTimer::start("TestStaticResources/2");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_json()))
        .mount(&server)
        .await;

    let client = api_client(&config_for(&server.uri())).unwrap();
    let (body, _meta) = client.get_manifest().await.unwrap();

    let manifest = body.as_json().unwrap();
    for key in [
        "short_name",
        "name",
        "icons",
        "start_url",
        "display",
        "theme_color",
        "background_color",
    ] {
        assert!(manifest.get(key).is_some(), "missing key {}", key);
    }

    let icons = manifest["icons"].as_array().unwrap();
    assert!(!icons.is_empty());
    for key in ["src", "sizes", "type"] {
        assert!(icons[0].get(key).is_some(), "missing icon key {}", key);
    }
}

#[tokio::test]
async fn non_json_body_falls_back_to_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a manifest</html>"))
        .mount(&server)
        .await;

    let client = api_client(&config_for(&server.uri())).unwrap();
    let (body, meta) = client.get_manifest().await.unwrap();

    assert_eq!(meta.status.as_u16(), 200);
    assert!(!body.is_json());
    assert_eq!(body.as_text(), Some("<html>not a manifest</html>"));
}

#[tokio::test]
async fn empty_body_falls_back_to_the_reason_phrase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = api_client(&config_for(&server.uri())).unwrap();
    let (body, _meta) = client.get_manifest().await.unwrap();

    assert_eq!(body.as_text(), Some("OK"));
}

#[tokio::test]
async fn transport_errors_propagate_unchanged() {
    // Nothing listens here; the connection error must surface, not a
    // fallback body.
    let client = api_client(&config_for("http://127.0.0.1:1")).unwrap();

    let result = client.get_manifest().await;
    assert!(matches!(
        result,
        Err(game_automation::AutomationError::Http(_))
    ));
}
