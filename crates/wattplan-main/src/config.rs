// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of WattPlan.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Application configuration
//!
//! Loaded from an explicit `--config` path, else `wattplan.toml` or
//! `wattplan.json` in the working directory, else defaults with
//! environment overrides. Every section falls back field by field, so
//! a config file only has to name what it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use wattplan_types::SizingFactors;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub sizing: SizingFactors,

    #[serde(default)]
    pub web: WebConfig,
}

/// Where the equipment catalog comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Store API products endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local catalog file; when set the store API is not contacted
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on listing pages walked per fetch
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_base_url() -> String {
    "https://store.solare.cz/api/products".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    50
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            file: None,
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path or the working directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let config = Self::from_file(path)?;
            info!("✅ Loaded configuration from {}", path.display());
            config.validate()?;
            return Ok(config);
        }

        // Try wattplan.toml for development
        if let Ok(config_str) = std::fs::read_to_string("wattplan.toml") {
            let config: AppConfig =
                toml::from_str(&config_str).context("Failed to parse wattplan.toml")?;
            info!("✅ Loaded configuration from wattplan.toml");
            config.validate()?;
            return Ok(config);
        }

        // Try wattplan.json for deployments that template JSON
        if let Ok(config_str) = std::fs::read_to_string("wattplan.json") {
            let config: AppConfig =
                serde_json::from_str(&config_str).context("Failed to parse wattplan.json")?;
            info!("✅ Loaded configuration from wattplan.json");
            config.validate()?;
            return Ok(config);
        }

        warn!("No configuration file found, using defaults with environment overrides");
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&config_str)
                .with_context(|| format!("Failed to parse {}", path.display())),
            Some("json") => serde_json::from_str(&config_str)
                .with_context(|| format!("Failed to parse {}", path.display())),
            _ => anyhow::bail!(
                "Unsupported config format: {} (expected .toml or .json)",
                path.display()
            ),
        }
    }

    /// Load from environment variables (development/testing)
    fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("WATTPLAN_CATALOG_URL") {
            config.catalog.base_url = url;
        }

        if let Ok(file) = std::env::var("WATTPLAN_CATALOG_FILE") {
            config.catalog.file = Some(file);
        }

        if let Ok(port) = std::env::var("WATTPLAN_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            config.web.port = port;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.file.is_none() && self.catalog.base_url.is_empty() {
            anyhow::bail!("catalog.base_url cannot be empty without a catalog.file");
        }

        if self.catalog.timeout_secs == 0 {
            anyhow::bail!("catalog.timeout_secs must be greater than zero");
        }

        if self.catalog.max_pages == 0 {
            anyhow::bail!("catalog.max_pages must be at least 1");
        }

        if self.web.port == 0 {
            anyhow::bail!("web.port cannot be 0");
        }

        self.sizing.validate()?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }
}
