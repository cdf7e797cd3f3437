use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::price::CurrencyFormat;
use crate::error::ConfigError;

/// Root configuration for jackbot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub messenger: MessengerConfig,
    pub catalog: CatalogConfig,
    pub gateway: GatewayConfig,
    pub image_proxy: ImageProxyConfig,
    pub currencies: HashMap<String, CurrencyFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            messenger: MessengerConfig::default(),
            catalog: CatalogConfig::default(),
            gateway: GatewayConfig::default(),
            image_proxy: ImageProxyConfig::default(),
            currencies: default_currencies(),
        }
    }
}

impl Config {
    /// Rendering format for a currency code, falling back to EUR
    /// conventions for unknown codes.
    pub fn currency_format(&self, currency_code: &str) -> CurrencyFormat {
        self.currencies
            .get(currency_code)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessengerConfig {
    /// Shared secret keying the webhook signature.
    pub app_secret: String,
    /// Token echoed back during webhook subscription verification.
    pub validation_token: String,
    pub page_access_token: String,
    pub api_base: String,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            app_secret: String::new(),
            validation_token: String::new(),
            page_access_token: String::new(),
            api_base: "https://graph.facebook.com/v2.6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogConfig {
    pub associate_tag: String,
    /// Region code to catalog API host.
    pub regions: HashMap<String, String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let regions = [
            ("de_DE", "webservices.amazon.de"),
            ("en_GB", "webservices.amazon.co.uk"),
            ("en_US", "webservices.amazon.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            associate_tag: String::new(),
            regions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProxyConfig {
    /// cloudimage.io token. Empty disables the proxy.
    pub token: String,
}

impl ImageProxyConfig {
    /// Card images go through the resizing proxy so they fit the
    /// platform's 1200x600 card dimensions.
    pub fn fit_url(&self, image_url: &str) -> String {
        if self.token.is_empty() {
            image_url.to_string()
        } else {
            format!("http://{}.cloudimg.io/s/fit/1200x600/{}", self.token, image_url)
        }
    }
}

fn default_currencies() -> HashMap<String, CurrencyFormat> {
    let mut currencies = HashMap::new();
    currencies.insert("EUR".to_string(), CurrencyFormat::default());
    currencies.insert(
        "GBP".to_string(),
        CurrencyFormat {
            symbol: "£".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            decimal_places: 2,
        },
    );
    currencies.insert(
        "USD".to_string(),
        CurrencyFormat {
            symbol: "$".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            decimal_places: 2,
        },
    );
    currencies
}

// ====== Config loading/saving ======

/// Load configuration from environment variables.
///
/// Priority:
/// 1. `JACKBOT_CONFIG` env var — full JSON config
/// 2. Individual env vars (merged on top of the file fallback)
/// 3. File fallback (`~/.jackbot/config.json`)
pub fn load_config_from_env() -> Config {
    // 1. Full JSON from JACKBOT_CONFIG
    if let Ok(json) = std::env::var("JACKBOT_CONFIG") {
        match serde_json::from_str::<Config>(&json) {
            Ok(config) => return config,
            Err(e) => {
                tracing::warn!("Failed to parse JACKBOT_CONFIG: {}", e);
            }
        }
    }

    // 2. Start with file fallback, then overlay individual env vars
    let mut cfg = load_config(None);

    if let Ok(v) = std::env::var("MESSENGER_APP_SECRET") {
        cfg.messenger.app_secret = v;
    }
    if let Ok(v) = std::env::var("MESSENGER_VALIDATION_TOKEN") {
        cfg.messenger.validation_token = v;
    }
    if let Ok(v) = std::env::var("MESSENGER_PAGE_ACCESS_TOKEN") {
        cfg.messenger.page_access_token = v;
    }
    if let Ok(v) = std::env::var("CATALOG_ASSOCIATE_TAG") {
        cfg.catalog.associate_tag = v;
    }
    if let Ok(v) = std::env::var("CLOUDIMAGE_TOKEN") {
        cfg.image_proxy.token = v;
    }
    if let Ok(v) = std::env::var("PORT") {
        if let Ok(port) = v.parse() {
            cfg.gateway.port = port;
        }
    }

    cfg
}

/// Get the default configuration file path.
pub fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jackbot")
        .join("config.json")
}

/// Get the jackbot data directory.
pub fn get_data_dir() -> PathBuf {
    let path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jackbot");
    std::fs::create_dir_all(&path).ok();
    path
}

/// Load configuration from file or create default.
pub fn load_config(config_path: Option<&Path>) -> Config {
    let path = config_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(get_config_path);

    if path.exists() {
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(mut config) => {
                    if config.currencies.is_empty() {
                        config.currencies = default_currencies();
                    }
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config from {}: {}", path.display(), e);
                    tracing::warn!("Using default configuration.");
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config from {}: {}", path.display(), e);
                tracing::warn!("Using default configuration.");
            }
        }
    }

    Config::default()
}

/// Save configuration to file.
pub fn save_config(config: &Config, config_path: Option<&Path>) -> std::result::Result<(), ConfigError> {
    let path = config_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(get_config_path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(())
}
