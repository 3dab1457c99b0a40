//! Shared application state for the metrics gateway.
//!
//! Holds the loaded config, the collector wired to its collaborators, and the
//! authenticator used by the auth middleware. Startup errors are returned as
//! `Result` so `main` can report them instead of panicking.

use std::sync::Arc;

use wakametrics_core::error::Result;

use crate::auth::Authenticator;
use crate::backend::seed::Seed;
use crate::backend::{Backends, MemoryBackend, ProcessRuntimeStats};
use crate::collect::{MetricNames, MetricsCollector};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    authenticator: Arc<dyn Authenticator>,
}

struct AppStateInner {
    cfg: AppConfig,
    collector: MetricsCollector,
}

impl AppState {
    /// Build state from explicit collaborators.
    pub fn new(cfg: AppConfig, backends: Backends, authenticator: Arc<dyn Authenticator>) -> Self {
        let collector = MetricsCollector::new(
            backends,
            MetricNames::new(cfg.metrics.prefix.clone()),
            cfg.metrics.worker_count(),
        );
        tracing::debug!(workers = collector.workers(), prefix = %cfg.metrics.prefix, "metrics collector ready");

        Self {
            inner: Arc::new(AppStateInner { cfg, collector }),
            authenticator,
        }
    }

    /// Build state on top of the in-memory backend described by `cfg.backend`.
    pub fn from_config(cfg: AppConfig) -> Result<Self> {
        let seed = match cfg.backend.seed_file.as_deref() {
            Some(path) => Seed::load_from_file(path)?,
            None => {
                tracing::warn!("backend.seed_file not set, starting with an empty dataset");
                Seed::default()
            }
        };
        tracing::info!(
            users = seed.users.len(),
            activities = seed.activities.len(),
            "in-memory backend loaded"
        );

        let memory = Arc::new(MemoryBackend::new(seed, cfg.backend.active_days));
        let backends = Backends::from_memory(memory.clone(), Arc::new(ProcessRuntimeStats::new()));
        Ok(Self::new(cfg, backends, memory))
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.inner.cfg
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.inner.collector
    }

    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        Arc::clone(&self.authenticator)
    }
}
