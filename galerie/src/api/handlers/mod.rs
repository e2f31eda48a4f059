//! HTTP request handlers for all endpoints.
//!
//! - [`images`]: read API (`/api/images`, `/api/config`, `/api/test-data`)
//! - [`webhook`]: Telegram webhook receiver and webhook registration
//! - [`static_assets`]: embedded gallery page serving
//! - [`health`]: liveness check
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the
//! appropriate HTTP status code. The webhook handler is the exception: it
//! acknowledges unconditionally and only logs failures.

pub mod health;
pub mod images;
pub mod static_assets;
pub mod webhook;
