//! Thin HTTP client for the Telegram Bot API.

use serde::Deserialize;
use thiserror::Error as ThisError;
use tracing::instrument;
use url::Url;

#[derive(ThisError, Debug)]
pub enum TelegramError {
    /// No bot token configured - ingestion is disabled
    #[error("bot token is not configured")]
    NotConfigured,

    #[error("Bot API request failed")]
    Http(#[from] reqwest::Error),

    /// Bot API answered with ok=false
    #[error("Bot API error: {description}")]
    Api { description: String },

    /// Bot API answered ok=true without the expected result payload
    #[error("Bot API response for {method} is missing its result")]
    MissingResult { method: &'static str },
}

/// Generic Bot API response envelope: `{"ok": bool, "result": ..., "description": ...}`.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

/// Client for the two Bot API methods the gallery uses.
///
/// The base URL is configurable (`telegram.api_base_url`) so tests can point
/// it at a mock server instead of `https://api.telegram.org`.
#[derive(Debug, Clone)]
pub struct BotApi {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl BotApi {
    pub fn new(base: Url, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}bot{}/{}", ensure_trailing_slash(&self.base), self.token, method)
    }

    /// Resolve a `file_id` to the fetchable download URL of the file.
    ///
    /// Calls `getFile` to obtain the server-side `file_path`, then formats
    /// the download URL as `{base}/file/bot{token}/{file_path}`.
    #[instrument(skip(self))]
    pub async fn resolve_file_url(&self, file_id: &str) -> Result<String, TelegramError> {
        let response: ApiResponse<File> = self
            .http
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(TelegramError::Api {
                description: response.description.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let file_path = response
            .result
            .and_then(|f| f.file_path)
            .ok_or(TelegramError::MissingResult { method: "getFile" })?;

        Ok(format!("{}file/bot{}/{}", ensure_trailing_slash(&self.base), self.token, file_path))
    }

    /// Register `webhook_url` with Telegram so updates get delivered to us.
    #[instrument(skip(self))]
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<(), TelegramError> {
        let response: ApiResponse<bool> = self
            .http
            .get(self.method_url("setWebhook"))
            .query(&[("url", webhook_url)])
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(TelegramError::Api {
                description: response.description.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(())
    }
}

fn ensure_trailing_slash(url: &Url) -> String {
    let s = url.as_str();
    if s.ends_with('/') { s.to_string() } else { format!("{s}/") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bot(server: &MockServer) -> BotApi {
        BotApi::new(Url::parse(&server.uri()).unwrap(), "TEST_TOKEN")
    }

    #[tokio::test]
    async fn test_resolve_file_url_builds_download_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/botTEST_TOKEN/getFile"))
            .and(query_param("file_id", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"file_id": "abc", "file_unique_id": "u-abc", "file_path": "photos/file_1.jpg"}
            })))
            .mount(&server)
            .await;

        let url = bot(&server).resolve_file_url("abc").await.unwrap();
        assert_eq!(url, format!("{}/file/botTEST_TOKEN/photos/file_1.jpg", server.uri()));
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/botTEST_TOKEN/getFile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Bad Request: file not found"
            })))
            .mount(&server)
            .await;

        let err = bot(&server).resolve_file_url("missing").await.unwrap_err();
        assert!(matches!(err, TelegramError::Api { ref description } if description.contains("file not found")));
    }

    #[tokio::test]
    async fn test_set_webhook_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/botTEST_TOKEN/setWebhook"))
            .and(query_param("url", "https://gallery.example.com/api/telegram/webhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true, "result": true})))
            .mount(&server)
            .await;

        bot(&server)
            .set_webhook("https://gallery.example.com/api/telegram/webhook")
            .await
            .unwrap();
    }
}
