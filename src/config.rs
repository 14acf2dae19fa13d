// ⚙️ Configuration
// Defaults → optional JSON file (HOLIDAYS_CONFIG) → environment overrides.

use crate::engine::{DEFAULT_MAX_LOOKBACK_YEARS, MAX_LOOKBACK_YEARS};
use crate::nager::DEFAULT_BASE_URL;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_VAR: &str = "HOLIDAYS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the holiday API (without the /PublicHolidays suffix)
    pub api_base_url: String,

    /// Address the API server listens on
    pub bind_addr: String,

    /// Hard stop for the recent-holidays backward walk
    pub max_lookback_years: u32,

    pub request_timeout_secs: u64,

    /// flexi_logger spec, e.g. "info" or "info, holiday_insights::engine=debug"
    pub log_spec: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            max_lookback_years: DEFAULT_MAX_LOOKBACK_YEARS,
            request_timeout_secs: 10,
            log_spec: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load from an explicit variable map (file named by HOLIDAYS_CONFIG first)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = match vars.get(CONFIG_FILE_VAR) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    fn apply_overrides(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        if let Some(url) = vars.get("HOLIDAYS_API_BASE_URL") {
            self.api_base_url = url.clone();
        }
        if let Some(addr) = vars.get("HOLIDAYS_BIND_ADDR") {
            self.bind_addr = addr.clone();
        }
        if let Some(years) = vars.get("HOLIDAYS_MAX_LOOKBACK_YEARS") {
            self.max_lookback_years = years
                .trim()
                .parse()
                .with_context(|| format!("Invalid HOLIDAYS_MAX_LOOKBACK_YEARS: {:?}", years))?;
        }
        if let Some(secs) = vars.get("HOLIDAYS_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid HOLIDAYS_REQUEST_TIMEOUT_SECS: {:?}", secs))?;
        }
        if let Some(spec) = vars.get("HOLIDAYS_LOG") {
            self.log_spec = spec.clone();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        if self.max_lookback_years == 0 {
            bail!("max_lookback_years must be at least 1");
        }
        if self.max_lookback_years > MAX_LOOKBACK_YEARS {
            bail!(
                "max_lookback_years must be at most {}, got {}",
                MAX_LOOKBACK_YEARS,
                self.max_lookback_years
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
