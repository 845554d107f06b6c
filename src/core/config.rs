//! Engine configuration with documented constants
//!
//! Market tuning, population limits and script strictness live here.
//! Values can be loaded from a TOML file; every field falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{AiError, Result};
use crate::core::types::{DifficultyLevel, StartingResources};

/// Configuration for the rule engine and its sandbox collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === MARKET ===
    /// Units of a commodity moved by one buy or sell order
    pub trade_lot: i32,

    /// Spread applied around the base price, in percent
    ///
    /// Buying costs base * (100 + fee) / 100 gold, selling yields
    /// base * (100 - fee) / 100 gold.
    pub market_fee_percent: i32,

    /// Base price of every tradable commodity at match start
    pub initial_commodity_price: i32,

    /// Base price change after each buy (up) or sell (down)
    pub price_step: i32,

    /// Lower clamp for the base price
    pub min_price: i32,

    /// Upper clamp for the base price
    pub max_price: i32,

    // === POPULATION ===
    /// Population cap given to every player at match start
    pub default_population_cap: i32,

    // === SCRIPTS ===
    /// Fail script loading on the first rule that cannot be compiled
    ///
    /// When false, such rules are dropped from the active set and reported.
    pub strict_scripts: bool,

    // === MATCH SETTINGS ===
    /// Difficulty seen by the difficulty fact
    pub difficulty: DifficultyLevel,

    /// Starting resources seen by the starting-resources fact
    pub starting_resources: StartingResources,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trade_lot: 100,
            market_fee_percent: 30,
            initial_commodity_price: 100,
            price_step: 3,
            min_price: 20,
            max_price: 9999,

            default_population_cap: 200,

            strict_scripts: false,

            difficulty: DifficultyLevel::Moderate,
            starting_resources: StartingResources::Low,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(AiError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.trade_lot <= 0 {
            return Err(format!("trade_lot ({}) must be positive", self.trade_lot));
        }

        if !(0..100).contains(&self.market_fee_percent) {
            return Err(format!(
                "market_fee_percent ({}) must be in 0..100",
                self.market_fee_percent
            ));
        }

        if self.min_price <= 0 || self.min_price > self.max_price {
            return Err(format!(
                "min_price ({}) must be positive and <= max_price ({})",
                self.min_price, self.max_price
            ));
        }

        if !(self.min_price..=self.max_price).contains(&self.initial_commodity_price) {
            return Err(format!(
                "initial_commodity_price ({}) must lie in [{}, {}]",
                self.initial_commodity_price, self.min_price, self.max_price
            ));
        }

        if self.default_population_cap < 0 {
            return Err("default_population_cap must not be negative".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Get the global engine config (initializes with defaults if not set)
pub fn config() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}

/// Set the global engine config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: EngineConfig) -> std::result::Result<(), EngineConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
trade_lot = 50
strict_scripts = true
difficulty = "hard"
"#,
        )
        .unwrap();

        assert_eq!(config.trade_lot, 50);
        assert!(config.strict_scripts);
        assert_eq!(config.difficulty, DifficultyLevel::Hard);
        assert_eq!(config.market_fee_percent, 30);
    }

    #[test]
    fn test_invalid_price_range_rejected() {
        let result = EngineConfig::from_toml_str("min_price = 500\nmax_price = 100\n");
        assert!(matches!(result, Err(AiError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_is_toml_error() {
        let result = EngineConfig::from_toml_str("trade_lot = ");
        assert!(matches!(result, Err(AiError::TomlError(_))));
    }
}
