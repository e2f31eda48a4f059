//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `GALERIE_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **Built-in defaults** - Every field has a usable default
//! 2. **YAML config file** - Base configuration (default: `config.yaml`)
//! 3. **Environment variables** - Variables prefixed with `GALERIE_` override YAML values
//! 4. **`TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`** - Special case: these bare variables
//!    override `telegram.bot_token` and `telegram.chat_id` if set, matching how the bot
//!    is usually provisioned on hosting platforms.
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `GALERIE_STORE__TYPE=memory` sets the `store.type` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! GALERIE_PORT=8080
//!
//! # Set the bot credentials (preferred method)
//! TELEGRAM_BOT_TOKEN="123456:ABC-DEF"
//! TELEGRAM_CHAT_ID="-1001234567890"
//!
//! # Persist image metadata to a flat file
//! GALERIE_STORE__TYPE=file
//! GALERIE_STORE__PATH=./data/images.jsonl
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "GALERIE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Public base URL where this gallery is reachable (e.g., "https://gallery.example.com").
    /// Required for webhook registration - Telegram must be able to reach it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<Url>,
    /// Telegram bot credentials and API endpoint
    pub telegram: TelegramConfig,
    /// Image metadata store backend - in-memory or flat-file
    pub store: StoreConfig,
    /// Gallery view settings exposed to the frontend
    pub gallery: GalleryConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Telegram Bot API configuration.
///
/// The bot token authenticates every Bot API call. When it is absent, the
/// gallery still serves whatever the store holds, but ingestion is disabled
/// (webhook deliveries are acknowledged and logged as failed).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot token issued by @BotFather
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    /// Chat or group identifier the bot watches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Base URL of the Bot API. Overridable so tests can point at a mock server.
    pub api_base_url: Url,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base_url: Url::parse("https://api.telegram.org").unwrap(),
        }
    }
}

/// Image metadata store configuration.
///
/// Either a purely in-memory list (records are lost on restart) or a flat
/// JSON-lines file that is loaded on startup and appended on every insert.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Keep records in memory only
    Memory,
    /// Append records to a JSON-lines file
    File {
        /// Path to the JSON-lines file (created if missing)
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory
    }
}

impl StoreConfig {
    /// Check if using the flat-file backend
    pub fn is_file(&self) -> bool {
        matches!(self, StoreConfig::File { .. })
    }
}

/// Gallery view settings.
///
/// These values are exposed to the frontend via `GET /api/config` and drive
/// the pagination, auto-refresh, slideshow, and batch download behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Number of images per page (fixed page size, client-side pagination)
    pub page_size: usize,
    /// How often the frontend polls `GET /api/images` for new arrivals
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Auto-advance interval for the slideshow
    #[serde(with = "humantime_serde")]
    pub slideshow_interval: Duration,
    /// Delay between consecutive downloads in a batch download
    #[serde(with = "humantime_serde")]
    pub download_stagger: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            page_size: 24,
            refresh_interval: Duration::from_secs(30),
            slideshow_interval: Duration::from_secs(5),
            download_stagger: Duration::from_millis(300),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard", serialize_with = "serialize_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://gallery.example.com`)
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn serialize_wildcard<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("*")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_url: None,
            telegram: TelegramConfig::default(),
            store: StoreConfig::default(),
            gallery: GalleryConfig::default(),
            cors: CorsConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // The bare variables win over everything else, matching how the bot
        // credentials are provisioned on most hosting platforms.
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN")
            && !token.is_empty()
        {
            config.telegram.bot_token = Some(token);
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID")
            && !chat_id.is_empty()
        {
            config.telegram.chat_id = Some(chat_id);
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            config.port = port;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    fn figment(args: &Args) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("GALERIE_").split("__"))
    }

    /// Get the socket address string to bind the HTTP server to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.gallery.page_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: gallery.page_size cannot be 0. Set a positive integer value (default: 24).".to_string(),
            });
        }

        if self.gallery.refresh_interval.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: gallery.refresh_interval cannot be 0. Use a humantime value such as '30s'.".to_string(),
            });
        }

        if self.gallery.slideshow_interval.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: gallery.slideshow_interval cannot be 0. Use a humantime value such as '5s'.".to_string(),
            });
        }

        // Validate that wildcard is not used with credentials
        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && self.cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        // A token without a chat id is fine (the webhook payload carries the chat),
        // but webhook registration needs a reachable public URL.
        if let Some(url) = &self.public_url
            && url.scheme() != "https"
            && url.scheme() != "http"
        {
            return Err(Error::Internal {
                operation: format!("Config validation: public_url must be an http(s) URL, got scheme '{}'", url.scheme()),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = base_config();
        config.validate().expect("default config should validate");
        assert_eq!(config.gallery.page_size, 24);
        assert!(matches!(config.store, StoreConfig::Memory));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = base_config();
        config.gallery.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_with_credentials_rejected() {
        let mut config = base_config();
        config.cors.allow_credentials = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_from_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                store:
                  type: file
                  path: ./images.jsonl
                gallery:
                  page_size: 12
                "#,
            )?;
            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert!(config.store.is_file());
            assert_eq!(config.gallery.page_size, 12);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "port: 9000\n")?;
            jail.set_env("GALERIE_PORT", "9001");
            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.port, 9001);
            Ok(())
        });
    }

    #[test]
    fn test_bare_telegram_token_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TELEGRAM_BOT_TOKEN", "123:abc");
            let args = Args {
                config: "missing.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
            Ok(())
        });
    }
}
