//! Response envelopes for the read API and webhook acknowledgment.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::ImageRecord;

/// `GET /api/images` response: always an object with an `images` array,
/// even when the store is empty.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImagesResponse {
    pub images: Vec<ImageRecord>,
}

/// Fixed webhook acknowledgment. Telegram only cares about the 200.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    /// Always "ok"
    pub status: String,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}

/// `GET /health` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Gallery view settings the frontend needs, from `GET /api/config`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GalleryConfigResponse {
    /// Images per page (client-side pagination)
    pub page_size: usize,
    /// Auto-refresh poll interval in milliseconds
    pub refresh_interval_ms: u64,
    /// Slideshow auto-advance interval in milliseconds
    pub slideshow_interval_ms: u64,
    /// Delay between consecutive batch downloads in milliseconds
    pub download_stagger_ms: u64,
}

/// `GET /api/test-data` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestDataResponse {
    pub status: String,
    /// Number of sample records appended
    pub count: usize,
}

/// `POST /api/telegram/set-webhook` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetWebhookResponse {
    pub status: String,
    /// The webhook URL that was registered
    pub webhook_url: String,
}
