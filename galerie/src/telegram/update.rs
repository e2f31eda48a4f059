//! Inbound webhook payload types.
//!
//! Telegram posts an `Update` JSON object to the webhook endpoint for every
//! bot event. The structs below deserialize just the image-relevant subset;
//! unknown fields are skipped by serde.

use serde::Deserialize;

/// One incoming bot event.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Present for new-message events; other update kinds are ignored.
    pub message: Option<Message>,
}

/// A message, possibly carrying a photo or an image document.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Unix timestamp of when the message was sent
    pub date: Option<i64>,
    pub caption: Option<String>,
    /// Available photo sizes, smallest first. The last entry is the largest.
    pub photo: Option<Vec<PhotoSize>>,
    /// Set when the image was sent as a file instead of a photo.
    pub document: Option<Document>,
}

/// One rendition of a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    /// Stable across bot tokens and redeliveries; used as the record id.
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
}

/// A file attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl Document {
    /// Whether this document is an image, judged by MIME type.
    pub fn is_image(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|m| m.starts_with("image/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_update_deserializes() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 42,
                "date": 1756300000,
                "caption": "Beautiful landscape",
                "photo": [
                    {"file_id": "small", "file_unique_id": "u-small", "width": 90, "height": 60},
                    {"file_id": "large", "file_unique_id": "u-large", "width": 1280, "height": 853}
                ]
            }
        }"#;

        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        let photos = message.photo.unwrap();
        assert_eq!(photos.last().unwrap().file_id, "large");
        assert_eq!(message.caption.as_deref(), Some("Beautiful landscape"));
    }

    #[test]
    fn test_non_message_update_deserializes() {
        let update: Update = serde_json::from_str(r#"{"update_id": 11, "edited_message": {}}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_document_image_detection() {
        let image = Document {
            file_id: "f".into(),
            file_unique_id: "u".into(),
            file_name: Some("photo.png".into()),
            mime_type: Some("image/png".into()),
        };
        assert!(image.is_image());

        let pdf = Document {
            mime_type: Some("application/pdf".into()),
            ..image.clone()
        };
        assert!(!pdf.is_image());

        let unknown = Document { mime_type: None, ..image };
        assert!(!unknown.is_image());
    }
}
