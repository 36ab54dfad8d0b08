//! # Register Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`--config <path>` or `<platform config dir>/caja.toml`)
//! 3. Environment variables (`CAJA_*`)
//! 4. `--data-dir` flag
//!
//! ## Example caja.toml
//! ```toml
//! data_dir = "/var/lib/caja"
//! store_name = "Almacen Don Pepe"
//! currency_symbol = "$"
//! fuzzy_cutoff = 0.8
//! vip_discount_bps = 1000
//! expiry_window_days = 30
//! closing_note_fields = ["SALDO SUBE", "BBVA", "EFECTIVO"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use caja_core::{
    DiscountRate, Money, DEFAULT_CLOSING_NOTE_FIELDS, DEFAULT_EXPIRY_WINDOW_DAYS,
    DEFAULT_FUZZY_CUTOFF, DEFAULT_VIP_DISCOUNT_BPS,
};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "caja.toml";

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the JSON documents.
    pub data_dir: PathBuf,

    /// Shown in headers and reports.
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Minimum similarity for fuzzy product matching (0.0 - 1.0].
    pub fuzzy_cutoff: f64,

    /// Discount VIP customers get on credit, in basis points.
    /// e.g., 1000 = 10%
    pub vip_discount_bps: u32,

    /// Products expiring within this many days get repriced.
    pub expiry_window_days: i64,

    /// Amounts the cashier reports at logout.
    pub closing_note_fields: Vec<String>,

    /// Login name suggested when none is given.
    pub default_cashier: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from("datos"),
            store_name: "Caja".to_string(),
            currency_symbol: "$".to_string(),
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            vip_discount_bps: DEFAULT_VIP_DISCOUNT_BPS,
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
            closing_note_fields: DEFAULT_CLOSING_NOTE_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            default_cashier: "cajero_1".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the platform default may not.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(path = %path.display(), "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `CAJA_*` overrides. `lookup` is the environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CAJA_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(name) = lookup("CAJA_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(cutoff) = lookup("CAJA_FUZZY_CUTOFF") {
            match cutoff.parse::<f64>() {
                Ok(c) => self.fuzzy_cutoff = c,
                Err(_) => warn!(value = %cutoff, "Ignoring invalid CAJA_FUZZY_CUTOFF"),
            }
        }

        if let Some(symbol) = lookup("CAJA_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fuzzy_cutoff > 0.0 && self.fuzzy_cutoff <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "fuzzy_cutoff must be in (0, 1], got {}",
                self.fuzzy_cutoff
            )));
        }

        if self.vip_discount_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "vip_discount_bps must be at most 10000, got {}",
                self.vip_discount_bps
            )));
        }

        if self.expiry_window_days <= 0 {
            return Err(ConfigError::Invalid(
                "expiry_window_days must be greater than 0".into(),
            ));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }

        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "caja", "caja")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn vip_discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.vip_discount_bps)
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            (cents / 100).abs(),
            (cents % 100).abs()
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fuzzy_cutoff, 0.8);
        assert_eq!(config.vip_discount().bps(), 1000);
        assert_eq!(config.expiry_window_days, 30);
        assert_eq!(config.closing_note_fields.len(), 5);
        assert_eq!(config.default_cashier, "cajero_1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(5)), "$0.05");
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-$12.34");
        assert_eq!(config.format_currency(Money::from_cents(123456789)), "$1234567.89");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CAJA_DATA_DIR", "/srv/caja"),
            ("CAJA_STORE_NAME", "Kiosco"),
            ("CAJA_FUZZY_CUTOFF", "0.6"),
            ("CAJA_CURRENCY_SYMBOL", "AR$"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/srv/caja"));
        assert_eq!(config.store_name, "Kiosco");
        assert_eq!(config.fuzzy_cutoff, 0.6);
        assert_eq!(config.format_currency(Money::from_cents(100)), "AR$1.00");
    }

    #[test]
    fn test_invalid_env_cutoff_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|k| (k == "CAJA_FUZZY_CUTOFF").then(|| "mucho".to_string()));
        assert_eq!(config.fuzzy_cutoff, 0.8);
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.fuzzy_cutoff = 0.0;
        assert!(config.validate().is_err());

        config.fuzzy_cutoff = 1.0;
        config.vip_discount_bps = 12_000;
        assert!(config.validate().is_err());

        config.vip_discount_bps = 1000;
        config.expiry_window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            store_name = "Almacen"
            closing_note_fields = ["EFECTIVO"]
            "#,
        )
        .unwrap();
        assert_eq!(config.store_name, "Almacen");
        assert_eq!(config.closing_note_fields, vec!["EFECTIVO"]);
        assert_eq!(config.vip_discount_bps, 1000);

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("store_name = \"Almacen\""));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let missing = std::env::temp_dir().join("caja-no-such-config.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
