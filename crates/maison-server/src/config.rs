//! Server configuration.
//!
//! Loaded from an optional TOML file, then overridden by `MAISON_*`
//! environment variables.

use anyhow::{bail, Context, Result};
use maison_commerce::cart::ShippingPolicy;
use maison_commerce::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load config from an optional TOML file and the process environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse TOML config: {}", path))
    }

    /// Apply `MAISON_*` overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("MAISON_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("MAISON_PORT") {
            self.server.port = v
                .parse()
                .with_context(|| format!("MAISON_PORT is not a port number: {}", v))?;
        }
        if let Some(v) = lookup("MAISON_DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("MAISON_PAYMENT_MODE") {
            self.payment.mode = match v.to_ascii_lowercase().as_str() {
                "mock" => PaymentMode::Mock,
                "live" => PaymentMode::Live,
                other => bail!("MAISON_PAYMENT_MODE must be mock or live, got {}", other),
            };
        }
        if let Some(v) = lookup("MAISON_PAYMENT_KEY_ID") {
            self.payment.key_id = v;
        }
        if let Some(v) = lookup("MAISON_PAYMENT_KEY_SECRET") {
            self.payment.key_secret = v;
        }
        if let Some(v) = lookup("MAISON_PAYMENT_WEBHOOK_SECRET") {
            self.payment.webhook_secret = v;
        }
        if let Some(v) = lookup("MAISON_PAYMENT_API_BASE") {
            self.payment.api_base = v;
        }
        if let Some(v) = lookup("MAISON_STORE_CURRENCY") {
            self.store.currency = Currency::from_code(&v)
                .with_context(|| format!("MAISON_STORE_CURRENCY is not supported: {}", v))?;
        }
        if let Some(v) = lookup("MAISON_SESSION_TTL_SECS") {
            self.auth.session_ttl_secs = v
                .parse()
                .with_context(|| format!("MAISON_SESSION_TTL_SECS is not a number: {}", v))?;
        }
        if let Some(v) = lookup("MAISON_ADMIN_EMAIL") {
            self.auth.admin_email = Some(v);
        }
        if let Some(v) = lookup("MAISON_ADMIN_PASSWORD") {
            self.auth.admin_password = Some(v);
        }
        if let Some(v) = lookup("MAISON_LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = lookup("MAISON_LOG_JSON") {
            self.log.json = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.payment.mode == PaymentMode::Live {
            let payment = &self.payment;
            // Mock defaults are public and never valid live credentials.
            if payment.key_id.is_empty()
                || payment.key_id == default_key_id()
                || payment.key_secret.is_empty()
                || payment.key_secret == default_key_secret()
            {
                bail!("live payment mode needs payment.key_id and payment.key_secret");
            }
            if payment.webhook_secret.is_empty()
                || payment.webhook_secret == default_webhook_secret()
            {
                bail!("live payment mode needs payment.webhook_secret");
            }
        }
        if self.store.flat_shipping_cents < 0 {
            bail!("store.flat_shipping_cents cannot be negative");
        }
        if self.auth.session_ttl_secs <= 0 {
            bail!("auth.session_ttl_secs must be positive");
        }
        if self.auth.admin_email.is_some() != self.auth.admin_password.is_some() {
            bail!("auth.admin_email and auth.admin_password must be set together");
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://data/maison.db`.
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "sqlite://maison.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Which payment gateway client to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// In-process gateway that approves everything.
    #[default]
    Mock,
    /// Real gateway over HTTPS.
    Live,
}

/// Payment gateway credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub mode: PaymentMode,

    /// Public key ID handed to the browser checkout.
    #[serde(default = "default_key_id")]
    pub key_id: String,

    /// Secret used for API calls and checkout signatures.
    #[serde(default = "default_key_secret")]
    pub key_secret: String,

    /// Secret used to sign webhook deliveries.
    #[serde(default = "default_webhook_secret")]
    pub webhook_secret: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_key_id() -> String {
    "key_mock".to_string()
}

fn default_key_secret() -> String {
    "mock_key_secret".to_string()
}

fn default_webhook_secret() -> String {
    "mock_webhook_secret".to_string()
}

fn default_api_base() -> String {
    "https://api.razorpay.com".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            mode: PaymentMode::default(),
            key_id: default_key_id(),
            key_secret: default_key_secret(),
            webhook_secret: default_webhook_secret(),
            api_base: default_api_base(),
        }
    }
}

/// Storefront commercial settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub currency: Currency,

    /// Flat shipping charge in minor units.
    #[serde(default = "default_flat_shipping")]
    pub flat_shipping_cents: i64,

    /// Post-discount subtotal at which shipping is free. Unset means never.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold_cents: Option<i64>,

    /// Variants at or below this stock show on the dashboard.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_flat_shipping() -> i64 {
    9900
}

fn default_free_shipping_threshold() -> Option<i64> {
    Some(199900)
}

fn default_low_stock_threshold() -> i64 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            flat_shipping_cents: default_flat_shipping(),
            free_shipping_threshold_cents: default_free_shipping_threshold(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

impl StoreConfig {
    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy::new(
            Money::new(self.flat_shipping_cents, self.currency),
            self.free_shipping_threshold_cents
                .map(|cents| Money::new(cents, self.currency)),
        )
    }
}

/// Session and bootstrap admin settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    /// Admin account ensured at startup.
    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_session_ttl() -> i64 {
    maison_auth::DEFAULT_SESSION_TTL_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            admin_email: None,
            admin_password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info,tower_http=info,sqlx=warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.payment.mode, PaymentMode::Mock);
        assert_eq!(config.store.currency, Currency::INR);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [store]
            currency = "USD"
            flat_shipping_cents = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.currency, Currency::USD);
        assert_eq!(config.store.flat_shipping_cents, 500);
        assert_eq!(config.store.low_stock_threshold, 5);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MAISON_PORT", "9000"),
            ("MAISON_DATABASE_URL", "sqlite::memory:"),
            ("MAISON_STORE_CURRENCY", "eur"),
            ("MAISON_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.store.currency, Currency::EUR);
        assert!(config.log.json);
    }

    #[test]
    fn test_bad_env_value_is_error() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env(|key| (key == "MAISON_PORT").then(|| "eighty".to_string()))
            .is_err());
    }

    #[test]
    fn test_live_mode_requires_secrets() {
        let mut config = AppConfig::default();
        config.payment.mode = PaymentMode::Live;
        config.payment.key_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_live_mode_rejects_mock_webhook_secret() {
        let env: HashMap<&str, &str> = [
            ("MAISON_PAYMENT_MODE", "live"),
            ("MAISON_PAYMENT_KEY_ID", "rzp_live_abc"),
            ("MAISON_PAYMENT_KEY_SECRET", "live-secret"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.payment.mode, PaymentMode::Live);
        assert!(config.validate().is_err());

        config.payment.webhook_secret = "whsec-live".to_string();
        assert!(config.validate().is_ok());

        config.payment.key_secret = default_key_secret();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipping_policy() {
        let policy = StoreConfig::default().shipping_policy();
        assert_eq!(policy.flat_rate, Money::new(9900, Currency::INR));
        assert_eq!(
            policy.free_shipping_threshold,
            Some(Money::new(199900, Currency::INR))
        );
    }
}
