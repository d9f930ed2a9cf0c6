//! # Configuration State
//!
//! Hotel and billing configuration loaded at startup.
//!
//! ## Configuration Sources (later wins)
//! 1. Defaults (this file)
//! 2. Config file: `INNKEEP_CONFIG`, or `frontdesk.toml` in the platform
//!    config directory
//! 3. Environment variables (`INNKEEP_*`)
//!
//! ## Example `frontdesk.toml`
//! ```toml
//! hotel_name = "Lakeview Inn"
//! address_lines = ["12 Shore Road", "Kandy"]
//! phone = "+94 81 222 3344"
//! currency_prefix = "Rs."
//! default_tax_rate = 12.5
//! stay_policy = "strict"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use innkeep_core::validation::validate_tax_percentage;
use innkeep_core::{
    CurrencyFormat, HotelHeader, InvoiceCalculator, Money, StayDatePolicy, TaxRate,
    TextInvoiceRenderer, ValidationError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "frontdesk.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Hotel name (printed on invoices)
    pub hotel_name: String,

    /// Hotel address lines (printed under the name)
    pub address_lines: Vec<String>,

    /// Front desk phone number
    pub phone: String,

    /// Text placed before every amount on documents, e.g. "Rs."
    pub currency_prefix: String,

    /// Tax rate pre-filled on new invoices, as a percentage (0-100)
    pub default_tax_rate: f64,

    /// How check-out before check-in is treated
    pub stay_policy: StayDatePolicy,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Hotel: "Innkeep Dev Hotel"
    /// - Currency prefix: "Rs."
    /// - Tax: 0%
    /// - Stay policy: tolerant
    fn default() -> Self {
        ConfigState {
            hotel_name: "Innkeep Dev Hotel".to_string(),
            address_lines: vec!["1 Harbour Street".to_string(), "Colombo 01".to_string()],
            phone: String::new(),
            currency_prefix: "Rs.".to_string(),
            default_tax_rate: 0.0,
            stay_policy: StayDatePolicy::Tolerant,
        }
    }
}

impl ConfigState {
    /// Loads configuration from defaults, the config file and the environment.
    ///
    /// `config_path` wins over `INNKEEP_CONFIG`, which wins over the
    /// platform default. A missing file is not an error.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path
            .or_else(|| std::env::var("INNKEEP_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(path = %path.display(), "No config file, using defaults");
                ConfigState::default()
            }
            None => ConfigState::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ConfigState = toml::from_str(&contents)?;

        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies `INNKEEP_*` overrides read through `lookup`.
    ///
    /// ## Environment Variables
    /// - `INNKEEP_HOTEL_NAME`: hotel name
    /// - `INNKEEP_CURRENCY`: currency prefix
    /// - `INNKEEP_TAX_RATE`: default tax rate in percent (e.g. "12.5")
    /// - `INNKEEP_STAY_POLICY`: "tolerant" or "strict"
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("INNKEEP_HOTEL_NAME") {
            self.hotel_name = name;
        }

        if let Some(prefix) = lookup("INNKEEP_CURRENCY") {
            self.currency_prefix = prefix;
        }

        if let Some(rate) = lookup("INNKEEP_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) => {
                    debug!(rate = pct, "Overriding tax rate from environment");
                    self.default_tax_rate = pct;
                }
                Err(_) => warn!(rate = %rate, "Ignoring unparseable tax rate in environment"),
            }
        }

        if let Some(policy) = lookup("INNKEEP_STAY_POLICY") {
            match policy.parse::<StayDatePolicy>() {
                Ok(p) => self.stay_policy = p,
                Err(_) => warn!(policy = %policy, "Unknown stay policy in environment"),
            }
        }
    }

    /// Checks values that would otherwise surface as invoice failures later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tax_percentage(self.default_tax_rate)?;
        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "innkeep", "frontdesk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Default tax rate in basis points.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_percentage(self.default_tax_rate)
    }

    /// Calculator configured with the stay date policy.
    pub fn calculator(&self) -> InvoiceCalculator {
        InvoiceCalculator::new(self.stay_policy)
    }

    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency_prefix.clone())
    }

    /// Plain-text renderer carrying the hotel letterhead.
    pub fn renderer(&self) -> TextInvoiceRenderer {
        let header = HotelHeader {
            name: self.hotel_name.clone(),
            address_lines: self.address_lines.clone(),
            phone: self.phone.clone(),
        };
        TextInvoiceRenderer::new(header, self.currency())
    }

    /// Formats an amount the way documents print it.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "Rs. 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        self.currency().format(amount)
    }
}
