//! Collaborator contracts consumed by the collector.
//!
//! Every backing store is reached through one of these traits and injected at
//! construction time (`Backends`). `MemoryBackend` is the in-process reference
//! implementation used by the binary and the tests; production deployments
//! plug their own stores in behind the same traits.

pub mod memory;
pub mod runtime;
pub mod seed;
pub mod summary;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use wakametrics_core::error::Result;

pub use memory::MemoryBackend;
pub use runtime::ProcessRuntimeStats;
pub use summary::{Retrieval, Summary, SummaryFilters, SummaryItem, SummaryKind, SummaryQuery};

/// A registered user as seen by the metrics engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Offset from UTC used to resolve "today".
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
            utc_offset_minutes: 0,
            api_key: None,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::new(id)
        }
    }

    /// User's timezone as a fixed offset; out-of-range offsets fall back to UTC.
    pub fn tz(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }
}

/// Output of the batched heartbeat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCount {
    pub user: String,
    pub count: i64,
}

/// Job queue state at request time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSnapshot {
    pub queue: String,
    #[serde(default)]
    pub enqueued: i64,
    #[serde(default)]
    pub finished: i64,
}

/// Host runtime statistics at request time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    pub allocated_bytes: u64,
    pub system_bytes: u64,
    pub gc_pause_total_ns: u64,
    pub gc_cycles: u64,
    pub workers: u64,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn count(&self) -> Result<i64>;
    /// Users with recent activity. `exact` bypasses any collaborator-side cache.
    async fn get_active(&self, exact: bool) -> Result<Vec<User>>;
}

#[async_trait]
pub trait HeartbeatService: Send + Sync {
    async fn count(&self, approximate: bool) -> Result<i64>;
    async fn count_by_user(&self, user: &User) -> Result<i64>;
    async fn count_by_users(&self, users: &[User]) -> Result<Vec<UserCount>>;
}

#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Summary over `[from, to)` with the user's aliases applied.
    async fn aliased(&self, query: SummaryQuery<'_>) -> Result<Summary>;
}

#[async_trait]
pub trait KeyValueService: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Total database size in bytes.
    async fn database_size(&self) -> Result<i64>;
}

#[async_trait]
pub trait QueueMetricsProvider: Send + Sync {
    async fn queue_metrics(&self) -> Result<Vec<QueueSnapshot>>;
}

pub trait RuntimeStatsProvider: Send + Sync {
    fn snapshot(&self) -> RuntimeSnapshot;
}

/// The full set of collaborators the collector talks to.
#[derive(Clone)]
pub struct Backends {
    pub users: Arc<dyn UserService>,
    pub heartbeats: Arc<dyn HeartbeatService>,
    pub summaries: Arc<dyn SummaryService>,
    pub key_values: Arc<dyn KeyValueService>,
    pub repository: Arc<dyn MetricsRepository>,
    pub queues: Arc<dyn QueueMetricsProvider>,
    pub runtime: Arc<dyn RuntimeStatsProvider>,
}

impl Backends {
    /// Wire every store contract to one in-memory backend.
    pub fn from_memory(mem: Arc<MemoryBackend>, runtime: Arc<dyn RuntimeStatsProvider>) -> Self {
        Self {
            users: mem.clone(),
            heartbeats: mem.clone(),
            summaries: mem.clone(),
            key_values: mem.clone(),
            repository: mem.clone(),
            queues: mem,
            runtime,
        }
    }
}
