use std::net::SocketAddr;

use serde::Deserialize;
use wakametrics_core::error::{MetricsError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub security: SecuritySection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub backend: BackendSection,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.metrics.validate()?;
        self.backend.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            MetricsError::BadRequest(format!(
                "server.listen must be a valid socket address: {}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecuritySection {
    /// Register `/api/metrics` at all. Off by default.
    #[serde(default)]
    pub expose_metrics: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Per-user worker pool size; 0 means half the logical cores (min 1).
    #[serde(default)]
    pub workers: usize,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            workers: 0,
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_metric_prefix(&self.prefix) {
            return Err(MetricsError::BadRequest(format!(
                "metrics.prefix must match [a-zA-Z_:][a-zA-Z0-9_:]*: {:?}",
                self.prefix
            )));
        }
        if self.workers > 1024 {
            return Err(MetricsError::BadRequest(
                "metrics.workers must be at most 1024".into(),
            ));
        }
        Ok(())
    }

    /// Effective pool size.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            half_cpus()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    /// YAML dataset for the in-memory backend. Empty dataset when absent.
    #[serde(default)]
    pub seed_file: Option<String>,

    #[serde(default = "default_active_days")]
    pub active_days: u32,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            seed_file: None,
            active_days: default_active_days(),
        }
    }
}

impl BackendSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=365).contains(&self.active_days) {
            return Err(MetricsError::BadRequest(
                "backend.active_days must be between 1 and 365".into(),
            ));
        }
        Ok(())
    }
}

/// `max(1, logical_cores / 2)`.
pub fn half_cpus() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    (cpus / 2).max(1)
}

fn is_valid_metric_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_prefix() -> String {
    "wakatime".into()
}
fn default_active_days() -> u32 {
    7
}
