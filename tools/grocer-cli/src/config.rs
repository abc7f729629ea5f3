//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use grocer_commerce::cart::DEFAULT_MAX_QUANTITY_PER_ITEM;
use grocer_commerce::customer::DEFAULT_CITY;
use grocer_commerce::Currency;
use serde::{Deserialize, Serialize};

/// Config file names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["grocer.toml", ".grocer.toml", "grocer.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrocerConfig {
    /// Storage locations.
    #[serde(default)]
    pub store: StoreConfig,

    /// Cart rules.
    #[serde(default)]
    pub cart: CartConfig,

    /// Delivery defaults.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

impl GrocerConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the storefront cannot run with.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if Currency::from_code(&self.cart.currency).is_none() {
            errors.push(format!("cart.currency '{}' is not supported", self.cart.currency));
        }
        if self.cart.max_quantity_per_item < 1 {
            errors.push("cart.max_quantity_per_item must be at least 1".to_string());
        }
        if self.store.database_file.trim().is_empty() {
            errors.push("store.database_file is required".to_string());
        }

        if !errors.is_empty() {
            bail!("Invalid configuration: {}", errors.join("; "));
        }
        Ok(())
    }

    /// The configured currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.cart.currency)
            .with_context(|| format!("Unsupported currency: {}", self.cart.currency))
    }
}

/// Where data is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory, relative to the directory holding the config file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Snapshot file of the document database, inside `data_dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".grocer")
}

fn default_database_file() -> String {
    "database.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
        }
    }
}

/// Cart rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Largest quantity a single cart line may hold.
    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_item: i64,

    /// ISO currency code for prices.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_max_quantity() -> i64 {
    DEFAULT_MAX_QUANTITY_PER_ITEM
}

fn default_currency() -> String {
    Currency::default().code().to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_quantity_per_item: default_max_quantity(),
            currency: default_currency(),
        }
    }
}

/// Delivery defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// City used when a non-student address leaves it blank.
    #[serde(default = "default_city")]
    pub default_city: String,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `grocer_commerce=debug`.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Generate a default grocer.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Campus grocer configuration

[store]
data_dir = ".grocer"
database_file = "database.json"

[cart]
max_quantity_per_item = {max}
currency = "{currency}"

[delivery]
default_city = "{city}"

[log]
# Overridden by RUST_LOG when set.
level = "warn"
format = "human"
"#,
        max = DEFAULT_MAX_QUANTITY_PER_ITEM,
        currency = Currency::default().code(),
        city = DEFAULT_CITY,
    )
}
