use crate::features::brand_impersonation::DEFAULT_BRANDS;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Pause before every registration lookup, in milliseconds
    pub lookup_delay_ms: u64,
    pub whois_timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
    /// URLs classified at once in batch mode
    pub concurrency: usize,
    /// Hosting platforms where every customer shares one registration
    pub wildcard_suffixes: Vec<String>,
    /// Brands checked for impersonation, in priority order
    pub brands: Vec<String>,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup_delay_ms: 1000,
            whois_timeout_seconds: 10,
            probe_timeout_seconds: 5,
            concurrency: 4,
            wildcard_suffixes: vec!["blogspot.com".to_string()],
            brands: DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect(),
            user_agent: format!("phishscan/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {path}"))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing configuration {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).with_context(|| format!("writing configuration {path}"))?;
        Ok(())
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file not found: {path}, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.probe_timeout_seconds == 0 || self.whois_timeout_seconds == 0 {
            anyhow::bail!("timeouts must be at least one second");
        }
        if self.brands.iter().all(|b| b.trim().is_empty()) {
            anyhow::bail!("brand list must not be empty");
        }
        Ok(())
    }

    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}
