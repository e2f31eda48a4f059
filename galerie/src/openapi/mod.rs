//! OpenAPI documentation configuration.
//!
//! One document covers the whole surface: the read API the frontend consumes
//! and the Telegram webhook endpoints. Served interactively at `/docs`.

use utoipa::OpenApi;

use crate::api::{handlers, models};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Galerie API",
        description = "Telegram-fed photo gallery. Images arrive via the Telegram \
                       webhook; the frontend reads them back through a small JSON API.",
        version = "0.3.0",
    ),
    paths(
        handlers::health::health_check,
        handlers::images::list_images,
        handlers::images::get_gallery_config,
        handlers::images::add_test_data,
        handlers::webhook::telegram_webhook,
        handlers::webhook::register_webhook,
    ),
    components(schemas(
        crate::store::ImageRecord,
        models::images::ImagesResponse,
        models::images::WebhookAck,
        models::images::HealthResponse,
        models::images::GalleryConfigResponse,
        models::images::TestDataResponse,
        models::images::SetWebhookResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "images", description = "Read API consumed by the gallery frontend"),
        (name = "telegram", description = "Telegram webhook ingestion and registration"),
    )
)]
pub struct ApiDoc;
