//! API layer for HTTP request handling and data models.
//!
//! This module contains the HTTP surface of the gallery, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Read API** (`/api/images`, `/api/config`): JSON consumed by the gallery frontend
//! - **Webhook** (`/api/telegram/webhook`): inbound Telegram update deliveries
//! - **Operations** (`/api/telegram/set-webhook`, `/api/test-data`, `/health`)
//! - **Static assets** (`/`, `/static/*`): the embedded gallery page
//!
//! All JSON endpoints are documented with OpenAPI annotations using `utoipa`;
//! the docs UI is served at `/docs`.

pub mod handlers;
pub mod models;
