//! # galerie: Telegram-fed Photo Gallery
//!
//! `galerie` turns a Telegram chat into a web photo gallery. A bot added to the
//! chat receives every photo (and image document) via a webhook; this service
//! resolves each one to a fetchable download URL, stores its metadata, and
//! serves a small JSON API plus an embedded single-page frontend that renders
//! the gallery.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the
//! HTTP layer. Image metadata lives in an append-only store ([`store`]) backed
//! either by memory or by a JSON-lines file; image bytes are never stored,
//! browsers fetch them straight from Telegram's file servers.
//!
//! ### Request Flow
//!
//! When Telegram delivers an update to `POST /api/telegram/webhook`, the
//! ingestion pipeline ([`ingest`]) extracts the image reference, asks the Bot
//! API ([`telegram`]) for the file's download URL, and appends an
//! [`store::ImageRecord`]. Redelivered updates dedupe on the record id. The
//! webhook always answers 200 so Telegram never retries.
//!
//! The frontend polls `GET /api/images` and does all sorting, month grouping,
//! search, and pagination client-side. The same view logic exists as the
//! [`gallery::GalleryState`] model, which the frontend mirrors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use galerie::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = galerie::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     galerie::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod gallery;
pub mod ingest;
mod openapi;
mod static_assets;
pub mod store;
pub mod telegram;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    Router, http,
    routing::{get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use config::CorsOrigin;
use openapi::ApiDoc;
use store::ImageStore;
use telegram::BotApi;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .store(Arc::new(store))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<ImageStore>,
    pub config: Config,
    /// Bot API client, present only when a bot token is configured
    pub bot: Option<BotApi>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    // `AllowOrigin::list` panics on a literal `*`; tower-http requires
    // `AllowOrigin::any()` for the wildcard case.
    let allow_origin = if config.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(config.cors.allow_credentials)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Routes:
/// - Read API (`/api/images`, `/api/config`, `/api/test-data`) and `/health`
/// - Telegram webhook endpoints under `/api/telegram/*`
/// - Interactive API docs at `/docs`
/// - Embedded static frontend for everything else
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/images", get(api::handlers::images::list_images))
        .route("/api/config", get(api::handlers::images::get_gallery_config))
        .route("/api/test-data", get(api::handlers::images::add_test_data))
        .route("/api/telegram/webhook", post(api::handlers::webhook::telegram_webhook))
        .route("/api/telegram/set-webhook", post(api::handlers::webhook::register_webhook))
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .merge(api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .fallback(get(api::handlers::static_assets::serve_embedded_asset))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] opens the image store and builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
/// 3. **Shutdown**: the shutdown future resolves, in-flight requests drain,
///    telemetry flushes
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(ImageStore::open(&config.store).await?);
        info!(records = store.len().await, "Opened image store");

        let bot = match &config.telegram.bot_token {
            Some(token) => Some(BotApi::new(config.telegram.api_base_url.clone(), token)),
            None => {
                warn!("No bot token configured; webhook ingestion is disabled");
                None
            }
        };

        let state = AppState::builder().store(store).config(config.clone()).maybe_bot(bot).build();
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Gallery listening on http://{}, available at http://localhost:{}", bind_addr, self.config.port);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
