//! Webhook ingestion pipeline.
//!
//! One delivery goes through: extract the image reference from the update,
//! resolve it to a fetchable URL via the Bot API, build an [`ImageRecord`],
//! append it to the store. The pipeline never fails the webhook response -
//! every path collapses into an [`IngestOutcome`] that the handler logs
//! before acknowledging.

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::store::{ImageRecord, ImageStore};
use crate::telegram::{BotApi, Message, Update};

/// What happened to one webhook delivery.
///
/// Logged but never surfaced to Telegram: the webhook contract is an
/// unconditional acknowledgment, otherwise the provider keeps retrying.
#[derive(Debug)]
pub enum IngestOutcome {
    /// A new record was appended to the store
    Added { id: String },
    /// A record with the same id already exists (provider redelivery)
    Duplicate { id: String },
    /// The update carries nothing the gallery ingests (text message,
    /// edited message, non-image document, ...)
    Ignored,
    /// Extraction or the Bot API call failed; nothing was stored
    Failed { reason: String },
}

/// Process one webhook update end to end.
#[instrument(skip_all, fields(update_id = update.update_id))]
pub async fn process_update(update: Update, store: &ImageStore, bot: Option<&BotApi>) -> IngestOutcome {
    let Some(message) = update.message else {
        return IngestOutcome::Ignored;
    };

    // Photos first, then image documents, matching how clients send them.
    let Some(reference) = extract_image(&message) else {
        return IngestOutcome::Ignored;
    };

    let Some(bot) = bot else {
        return IngestOutcome::Failed {
            reason: "bot token is not configured".to_string(),
        };
    };

    let full_url = match bot.resolve_file_url(&reference.file_id).await {
        Ok(url) => url,
        Err(e) => {
            return IngestOutcome::Failed {
                reason: format!("could not resolve file {}: {e}", reference.file_id),
            };
        }
    };

    let record = ImageRecord {
        id: reference.file_unique_id,
        file_id: reference.file_id,
        thumbnail_url: Some(full_url.clone()),
        full_url,
        caption: message.caption.filter(|c| !c.is_empty()),
        width: reference.width,
        height: reference.height,
        message_id: message.message_id,
        timestamp: message_timestamp(message.date),
    };

    let id = record.id.clone();
    match store.insert(record).await {
        Ok(true) => IngestOutcome::Added { id },
        Ok(false) => IngestOutcome::Duplicate { id },
        Err(e) => IngestOutcome::Failed {
            reason: format!("could not store record {id}: {e}"),
        },
    }
}

struct ImageReference {
    file_id: String,
    file_unique_id: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Pull the image reference out of a message, if it has one.
///
/// For photos Telegram sends every rendition; the last entry of the array is
/// the largest and is the one the gallery keeps. Documents are ingested only
/// when their MIME type says they are images.
fn extract_image(message: &Message) -> Option<ImageReference> {
    if let Some(photos) = &message.photo
        && let Some(largest) = photos.last()
    {
        return Some(ImageReference {
            file_id: largest.file_id.clone(),
            file_unique_id: largest.file_unique_id.clone(),
            width: Some(largest.width),
            height: Some(largest.height),
        });
    }

    if let Some(document) = &message.document
        && document.is_image()
    {
        return Some(ImageReference {
            file_id: document.file_id.clone(),
            file_unique_id: document.file_unique_id.clone(),
            width: None,
            height: None,
        });
    }

    None
}

fn message_timestamp(date: Option<i64>) -> DateTime<Utc> {
    date.and_then(|secs| DateTime::from_timestamp(secs, 0)).unwrap_or_else(Utc::now)
}
