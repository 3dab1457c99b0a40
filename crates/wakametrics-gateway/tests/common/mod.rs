//! Hand-written collaborator fakes shared by the integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use wakametrics_core::error::{MetricsError, Result};
use wakametrics_gateway::app_state::AppState;
use wakametrics_gateway::auth::Authenticator;
use wakametrics_gateway::backend::{
    Backends, HeartbeatService, KeyValueService, MetricsRepository, QueueMetricsProvider,
    QueueSnapshot, RuntimeSnapshot, RuntimeStatsProvider, Summary, SummaryItem, SummaryKind,
    SummaryQuery, SummaryService, User, UserCount, UserService,
};
use wakametrics_gateway::config;

#[derive(Default)]
pub struct FakeBackend {
    pub users: Vec<User>,
    pub active: Vec<User>,
    pub all_time: HashMap<String, Summary>,
    pub today: HashMap<String, Summary>,
    pub failing_summaries: HashSet<String>,
    /// Users whose "today" lookup fails while the all-time one succeeds.
    pub failing_today_summaries: HashSet<String>,
    pub hanging_summaries: HashSet<String>,
    pub failing_calls: HashSet<&'static str>,
    pub heartbeats: HashMap<String, i64>,
    pub key_values: HashMap<String, String>,
    pub db_size: i64,
    pub queues: Vec<QueueSnapshot>,
    pub runtime: RuntimeSnapshot,
    pub summary_delay: Duration,

    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub summary_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` with an API key equal to its id.
    pub fn with_user(mut self, mut user: User) -> Self {
        user.api_key = Some(format!("key-{}", user.id));
        self.users.push(user);
        self
    }

    pub fn user(&self, id: &str) -> User {
        self.users.iter().find(|u| u.id == id).cloned().unwrap()
    }

    fn check(&self, call: &'static str) -> Result<()> {
        if self.failing_calls.contains(call) {
            return Err(MetricsError::Backend(format!("{call} unavailable")));
        }
        Ok(())
    }

    pub fn backends(self: &Arc<Self>) -> Backends {
        Backends {
            users: self.clone(),
            heartbeats: self.clone(),
            summaries: self.clone(),
            key_values: self.clone(),
            repository: self.clone(),
            queues: self.clone(),
            runtime: self.clone(),
        }
    }
}

#[async_trait]
impl UserService for FakeBackend {
    async fn count(&self) -> Result<i64> {
        self.check("users.count")?;
        Ok(self.users.len() as i64)
    }

    async fn get_active(&self, _exact: bool) -> Result<Vec<User>> {
        self.check("users.get_active")?;
        Ok(self.active.clone())
    }
}

#[async_trait]
impl HeartbeatService for FakeBackend {
    async fn count(&self, _approximate: bool) -> Result<i64> {
        self.check("heartbeats.count")?;
        Ok(self.heartbeats.values().sum())
    }

    async fn count_by_user(&self, user: &User) -> Result<i64> {
        self.check("heartbeats.count_by_user")?;
        Ok(self.heartbeats.get(&user.id).copied().unwrap_or(0))
    }

    async fn count_by_users(&self, users: &[User]) -> Result<Vec<UserCount>> {
        self.check("heartbeats.count_by_users")?;
        Ok(users
            .iter()
            .map(|u| UserCount {
                user: u.id.clone(),
                count: self.heartbeats.get(&u.id).copied().unwrap_or(0),
            })
            .collect())
    }
}

#[async_trait]
impl SummaryService for FakeBackend {
    async fn aliased(&self, query: SummaryQuery<'_>) -> Result<Summary> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.hanging_summaries.contains(&query.user.id) {
            std::future::pending::<()>().await;
        }
        if !self.summary_delay.is_zero() {
            tokio::time::sleep(self.summary_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_summaries.contains(&query.user.id) {
            return Err(MetricsError::Backend(format!("no summary for {}", query.user.id)));
        }
        let all_time = query.from == DateTime::<Utc>::MIN_UTC;
        if !all_time && self.failing_today_summaries.contains(&query.user.id) {
            return Err(MetricsError::Backend(format!("no summary for {} today", query.user.id)));
        }
        let source = if all_time { &self.all_time } else { &self.today };
        Ok(source
            .get(&query.user.id)
            .cloned()
            .unwrap_or_else(|| Summary::empty(query.from, query.to)))
    }
}

#[async_trait]
impl KeyValueService for FakeBackend {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.check("key_values.get_string")?;
        Ok(self.key_values.get(key).cloned())
    }
}

#[async_trait]
impl MetricsRepository for FakeBackend {
    async fn database_size(&self) -> Result<i64> {
        self.check("repository.database_size")?;
        Ok(self.db_size)
    }
}

#[async_trait]
impl QueueMetricsProvider for FakeBackend {
    async fn queue_metrics(&self) -> Result<Vec<QueueSnapshot>> {
        self.check("queues.queue_metrics")?;
        Ok(self.queues.clone())
    }
}

impl RuntimeStatsProvider for FakeBackend {
    fn snapshot(&self) -> RuntimeSnapshot {
        self.runtime
    }
}

#[async_trait]
impl Authenticator for FakeBackend {
    async fn authenticate(&self, api_key: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.api_key.as_deref() == Some(api_key))
            .cloned())
    }
}

/// Summary with the given `(kind, key, seconds)` items.
pub fn summary(items: &[(SummaryKind, &str, u64)]) -> Summary {
    let mut s = Summary::empty(DateTime::<Utc>::MIN_UTC, Utc::now());
    for (kind, key, secs) in items {
        s.items_mut(*kind).push(SummaryItem::new(*key, Duration::from_secs(*secs)));
    }
    s
}

pub const TEST_CONFIG: &str = r#"
version: 1
security:
  expose_metrics: true
metrics:
  prefix: "wakapi"
  workers: 2
"#;

pub fn state(fake: &Arc<FakeBackend>) -> AppState {
    let cfg = config::load_from_str(TEST_CONFIG).unwrap();
    AppState::new(cfg, fake.backends(), fake.clone())
}

/// Sample lines (everything but `#` comments).
pub fn samples(body: &str) -> Vec<&str> {
    body.lines().filter(|l| !l.starts_with('#')).collect()
}

/// Distinct metric names appearing in sample lines.
pub fn names(body: &str) -> BTreeSet<String> {
    samples(body)
        .into_iter()
        .map(|l| {
            let series = l.rsplit_once(' ').unwrap().0;
            series.split('{').next().unwrap().to_string()
        })
        .collect()
}
