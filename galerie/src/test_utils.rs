//! Test utilities for integration testing (available with `test-utils` feature).

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{Config, StoreConfig};
use crate::store::{ImageRecord, ImageStore};
use crate::telegram::{BotApi, Update};
use crate::{AppState, build_router};

/// Bot token used by every mock Bot API interaction.
pub const TEST_TOKEN: &str = "TEST_TOKEN";

/// Config with an in-memory store and no bot token.
pub fn create_test_config() -> Config {
    Config {
        store: StoreConfig::Memory,
        ..Config::default()
    }
}

/// Config whose Bot API client points at a wiremock server, using [`TEST_TOKEN`].
pub fn test_config_with_bot(server: &MockServer) -> Config {
    let mut config = create_test_config();
    config.telegram.bot_token = Some(TEST_TOKEN.to_string());
    config.telegram.api_base_url = Url::parse(&server.uri()).expect("mock server uri should parse");
    config
}

/// Spin up a test server over the full router.
pub async fn create_test_app(config: Config) -> TestServer {
    let (server, _state) = create_test_app_with_state(config).await;
    server
}

/// Spin up a test server and also hand back the shared state so tests can
/// seed or inspect the store directly.
pub async fn create_test_app_with_state(config: Config) -> (TestServer, AppState) {
    let store = Arc::new(ImageStore::open(&config.store).await.expect("store should open"));
    let bot = config
        .telegram
        .bot_token
        .as_ref()
        .map(|token| BotApi::new(config.telegram.api_base_url.clone(), token));

    let state = AppState::builder().store(store).config(config).maybe_bot(bot).build();
    let router = build_router(state.clone()).expect("router should build");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}

/// A record with a deterministic timestamp: fixed epoch plus `n` hours, so
/// larger `n` means newer.
pub fn sample_record(id: &str, n: i64) -> ImageRecord {
    let epoch = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    record_at(id, epoch + Duration::hours(n))
}

/// A record pinned to an exact timestamp.
pub fn record_at(id: &str, timestamp: DateTime<Utc>) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        file_id: format!("file-{id}"),
        full_url: format!("https://files.example.com/{id}.jpg"),
        thumbnail_url: Some(format!("https://files.example.com/{id}-thumb.jpg")),
        caption: None,
        width: Some(1280),
        height: Some(960),
        message_id: 1,
        timestamp,
    }
}

/// A webhook update carrying a two-rendition photo; the ingest pipeline is
/// expected to keep the last (largest) entry.
pub fn photo_update_json(message_id: i64, file_unique_id: &str, file_id: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": message_id,
        "message": {
            "message_id": message_id,
            "date": 1756300000,
            "caption": "sample caption",
            "photo": [
                {"file_id": "small-file", "file_unique_id": "u-small", "width": 320, "height": 240},
                {"file_id": file_id, "file_unique_id": file_unique_id, "width": 1280, "height": 960}
            ]
        }
    })
}

/// [`photo_update_json`] parsed into an [`Update`].
pub fn photo_update(message_id: i64, file_unique_id: &str, file_id: &str) -> Update {
    serde_json::from_value(photo_update_json(message_id, file_unique_id, file_id)).expect("update json should parse")
}

/// Mount a `getFile` mock answering for `file_id` with `file_path`.
pub async fn mock_get_file(server: &MockServer, file_id: &str, file_path: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/bot{TEST_TOKEN}/getFile")))
        .and(query_param("file_id", file_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"file_id": file_id, "file_unique_id": format!("u-{file_id}"), "file_path": file_path}
        })))
        .mount(server)
        .await;
}
