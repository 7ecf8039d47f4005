use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use engine_logging::{LevelFilter, LogDestination};
use episode_engine::{EngineSettings, RelayIdentity};
use serde::Deserialize;

use crate::cli::ConfigOverrides;

/// Server configuration, read from RON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub catalog_base_url: String,
    pub bypass_base_url: String,
    /// Prefix for relay URLs handed to clients; empty means relative URLs.
    pub public_base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub resolver_timeout_secs: u64,
    pub bypass_concurrency: usize,
    pub episode_workers: usize,
    pub user_agent: String,
    pub referer: String,
    pub origin: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            listen_addr: "127.0.0.1:8787".to_string(),
            catalog_base_url: engine.catalog_base_url,
            bypass_base_url: engine.bypass_base_url,
            public_base_url: String::new(),
            connect_timeout_secs: engine.connect_timeout.as_secs(),
            request_timeout_secs: engine.request_timeout.as_secs(),
            resolver_timeout_secs: engine.resolver_timeout.as_secs(),
            bypass_concurrency: engine.bypass_concurrency,
            episode_workers: engine.episode_workers,
            user_agent: engine.relay_identity.user_agent,
            referer: engine.relay_identity.referer,
            origin: engine.relay_identity.origin,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration file, or returns the defaults without one.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.listen_addr = listen.clone();
        }
        if let Some(catalog) = &overrides.catalog {
            self.catalog_base_url = catalog.clone();
        }
        if let Some(bypass) = &overrides.bypass {
            self.bypass_base_url = bypass.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            catalog_base_url: self.catalog_base_url.clone(),
            bypass_base_url: self.bypass_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            resolver_timeout: Duration::from_secs(self.resolver_timeout_secs),
            bypass_concurrency: self.bypass_concurrency,
            episode_workers: self.episode_workers,
            relay_identity: RelayIdentity {
                user_agent: self.user_agent.clone(),
                referer: self.referer.clone(),
                origin: self.origin.clone(),
            },
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        engine_logging::parse_level(&self.log_level)
    }
}
