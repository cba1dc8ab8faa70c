use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::price_history::{PriceHistoryGenerator, DEFAULT_DAYS, MAX_DAYS};
use crate::types::Tier;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub general: General,
    pub web: Option<Web>,
    #[serde(default)]
    pub dashboard: Dashboard,
}

#[derive(Debug, Deserialize)]
pub struct General {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Web {
    pub port: u16,
    pub host: String,
}

impl Default for Web {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Dashboard {
    /// Tier used when a request does not name one.
    #[serde(default)]
    pub default_tier: Tier,
    #[serde(default = "default_price_history_days")]
    pub price_history_days: usize,
    /// Fixed seed for synthetic price history. Unset draws a fresh series per render.
    pub price_seed: Option<u64>,
    /// Day the price charts and deadline scan run up to. Unset follows the local clock.
    pub as_of: Option<NaiveDate>,
}

fn default_price_history_days() -> usize {
    DEFAULT_DAYS
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            default_tier: Tier::default(),
            price_history_days: DEFAULT_DAYS,
            price_seed: None,
            as_of: None,
        }
    }
}

impl Dashboard {
    pub fn price_generator(&self) -> Result<PriceHistoryGenerator> {
        PriceHistoryGenerator::new(self.price_history_days, self.price_seed)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn web_or_default(&self) -> Web {
        self.web.clone().unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if self.dashboard.price_history_days == 0 {
            bail!("dashboard.price_history_days must be at least 1");
        }
        if self.dashboard.price_history_days > MAX_DAYS {
            bail!(
                "dashboard.price_history_days must be at most {MAX_DAYS}, got {}",
                self.dashboard.price_history_days
            );
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}
