//! Telegram webhook endpoints.
//!
//! The webhook handler acknowledges every delivery with `{"status": "ok"}`
//! no matter what happened inside - a non-200 makes Telegram retry the same
//! update indefinitely. Failures are logged, never surfaced.

use axum::{Json, extract::State};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    AppState,
    api::models::images::{SetWebhookResponse, WebhookAck},
    errors::{Error, Result},
    ingest::{IngestOutcome, process_update},
    telegram::Update,
};

#[utoipa::path(
    post,
    path = "/api/telegram/webhook",
    tag = "telegram",
    summary = "Receive a Telegram update",
    description = "Ingests photo and image-document messages delivered by Telegram. \
                   Always acknowledges with 200 so the provider does not retry.",
    request_body = Value,
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAck),
    )
)]
#[instrument(skip_all)]
pub async fn telegram_webhook(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<WebhookAck> {
    // Anything that does not parse as an update is acknowledged and dropped.
    let update: Update = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Discarding webhook payload that is not a Telegram update");
            return Json(WebhookAck::ok());
        }
    };

    match process_update(update, &state.store, state.bot.as_ref()).await {
        IngestOutcome::Added { id } => info!(image_id = %id, "Stored new image"),
        IngestOutcome::Duplicate { id } => debug!(image_id = %id, "Ignoring redelivered image"),
        IngestOutcome::Ignored => debug!("Update carries no image"),
        IngestOutcome::Failed { reason } => warn!(reason, "Failed to ingest update"),
    }

    Json(WebhookAck::ok())
}

#[utoipa::path(
    post,
    path = "/api/telegram/set-webhook",
    tag = "telegram",
    summary = "Register the webhook with Telegram",
    description = "Tells Telegram to deliver updates to `{public_url}/api/telegram/webhook`. \
                   Requires both a bot token and a configured public URL.",
    responses(
        (status = 200, description = "Webhook registered", body = SetWebhookResponse),
        (status = 400, description = "No public URL configured"),
        (status = 501, description = "No bot token configured"),
        (status = 502, description = "Telegram rejected the registration"),
    )
)]
#[instrument(skip_all)]
pub async fn register_webhook(State(state): State<AppState>) -> Result<Json<SetWebhookResponse>> {
    let bot = state.bot.as_ref().ok_or(crate::telegram::TelegramError::NotConfigured)?;
    let public_url = state.config.public_url.as_ref().ok_or_else(|| Error::BadRequest {
        message: "public_url is not configured; set it before registering the webhook".to_string(),
    })?;

    let webhook_url = format!("{}api/telegram/webhook", ensure_trailing_slash(public_url));
    bot.set_webhook(&webhook_url).await?;

    info!(%webhook_url, "Registered Telegram webhook");
    Ok(Json(SetWebhookResponse {
        status: "Webhook set".to_string(),
        webhook_url,
    }))
}

fn ensure_trailing_slash(url: &url::Url) -> String {
    let s = url.as_str();
    if s.ends_with('/') { s.to_string() } else { format!("{s}/") }
}
