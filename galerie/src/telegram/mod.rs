//! Telegram Bot API integration.
//!
//! Two pieces live here:
//!
//! - [`update`]: serde types for the inbound webhook payload (`Update`,
//!   `Message`, `PhotoSize`, `Document`). Only the fields the gallery reads
//!   are modelled; everything else in the payload is ignored.
//! - [`client`]: [`BotApi`], a thin reqwest client for the two Bot API
//!   methods in use, `getFile` and `setWebhook`.

pub mod client;
pub mod update;

pub use client::{BotApi, TelegramError};
pub use update::{Document, Message, PhotoSize, Update};
