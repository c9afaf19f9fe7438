use crate::error::{RollbookError, Result};
use crate::view::DEFAULT_PAGE_SIZE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_RATE: i64 = 50;
const DEFAULT_CURRENCY: &str = "₹";

pub const KEYS: [&str; 3] = ["page-size", "default-rate", "currency"];

/// Configuration for rollbook, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollbookConfig {
    /// Rows per page in every list
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Hourly rate prefilled on new bookings
    #[serde(default = "default_rate")]
    pub default_rate: Decimal,

    /// Symbol printed in front of amounts
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_rate() -> Decimal {
    Decimal::from(DEFAULT_RATE)
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for RollbookConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_rate: default_rate(),
            currency: default_currency(),
        }
    }
}

impl RollbookConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(RollbookError::Io)?;
        let config: RollbookConfig =
            serde_json::from_str(&content).map_err(RollbookError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(RollbookError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(RollbookError::Serialization)?;
        fs::write(config_path, content).map_err(RollbookError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "page-size" => Some(self.page_size.to_string()),
            "default-rate" => Some(self.default_rate.to_string()),
            "currency" => Some(self.currency.clone()),
            _ => None,
        }
    }

    /// Sets a key from its string form. Errors are user-facing messages.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match key {
            "page-size" => {
                let size: usize = value
                    .parse()
                    .map_err(|_| format!("page-size must be a whole number, got {}", value))?;
                if size == 0 {
                    return Err("page-size must be at least 1".to_string());
                }
                self.page_size = size;
            }
            "default-rate" => {
                let rate: Decimal = value
                    .parse()
                    .map_err(|_| format!("default-rate must be a number, got {}", value))?;
                if rate.is_sign_negative() {
                    return Err("default-rate cannot be negative".to_string());
                }
                self.default_rate = rate;
            }
            "currency" => self.currency = value.to_string(),
            other => return Err(format!("Unknown config key: {}", other)),
        }
        Ok(())
    }
}
