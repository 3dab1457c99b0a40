//! In-memory reference backend.
//!
//! Holds an immutable dataset loaded from a `Seed` and implements every store
//! contract on top of it. Summaries are computed from raw activities on demand
//! and memoized per `(user, from, to)` when the caller asks for caching.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use wakametrics_core::error::Result;

use super::seed::{Activity, Seed};
use super::{
    HeartbeatService, KeyValueService, MetricsRepository, QueueMetricsProvider, QueueSnapshot,
    Retrieval, Summary, SummaryFilters, SummaryItem, SummaryKind, SummaryQuery, SummaryService, User,
    UserCount, UserService,
};
use crate::auth::Authenticator;

const UNKNOWN_KEY: &str = "unknown";
const SUMMARY_CACHE_CAPACITY: usize = 4096;

type SummaryCacheKey = (String, DateTime<Utc>, DateTime<Utc>);

pub struct MemoryBackend {
    users: Vec<User>,
    activities: HashMap<String, Vec<Activity>>,
    /// `(user, kind) -> (alias value -> canonical key)`
    aliases: HashMap<(String, SummaryKind), HashMap<String, String>>,
    key_values: BTreeMap<String, String>,
    database_size: i64,
    queues: Vec<QueueSnapshot>,
    active_window: chrono::Duration,
    summary_cache: DashMap<SummaryCacheKey, Summary>,
}

impl MemoryBackend {
    pub fn new(seed: Seed, active_days: u32) -> Self {
        let mut activities: HashMap<String, Vec<Activity>> = HashMap::new();
        for a in seed.activities {
            activities.entry(a.user.clone()).or_default().push(a);
        }

        let mut aliases: HashMap<(String, SummaryKind), HashMap<String, String>> = HashMap::new();
        for a in seed.aliases {
            aliases.entry((a.user, a.kind)).or_default().insert(a.value, a.key);
        }

        Self {
            users: seed.users,
            activities,
            aliases,
            key_values: seed.key_values,
            database_size: seed.database_size,
            queues: seed.queues,
            active_window: chrono::Duration::days(i64::from(active_days)),
            summary_cache: DashMap::new(),
        }
    }

    /// Number of memoized summaries.
    pub fn cached_summaries(&self) -> usize {
        self.summary_cache.len()
    }

    fn user_activities(&self, user_id: &str) -> &[Activity] {
        self.activities.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn resolve<'a>(&'a self, user_id: &str, kind: SummaryKind, raw: &'a str) -> &'a str {
        if raw.is_empty() {
            return UNKNOWN_KEY;
        }
        self.aliases
            .get(&(user_id.to_string(), kind))
            .and_then(|m| m.get(raw))
            .map(String::as_str)
            .unwrap_or(raw)
    }

    fn matches(&self, user_id: &str, a: &Activity, filters: Option<&SummaryFilters>) -> bool {
        let Some(f) = filters else { return true; };
        match a.key(f.kind) {
            Some(raw) => {
                let key = self.resolve(user_id, f.kind, raw);
                f.values.iter().any(|v| v == key)
            }
            None => a.labels.iter().any(|l| f.values.contains(l)),
        }
    }

    fn summarize(&self, query: &SummaryQuery<'_>) -> Summary {
        let user_id = query.user.id.as_str();
        let mut buckets: BTreeMap<SummaryKind, BTreeMap<&str, Duration>> = BTreeMap::new();

        for a in self.user_activities(user_id) {
            if a.time < query.from || a.time >= query.to {
                continue;
            }
            if !self.matches(user_id, a, query.filters.as_ref()) {
                continue;
            }
            let d = Duration::from_secs(a.duration_secs);
            for kind in SummaryKind::ALL {
                let bucket = buckets.entry(kind).or_default();
                match a.key(kind) {
                    Some(raw) => *bucket.entry(self.resolve(user_id, kind, raw)).or_default() += d,
                    None => {
                        for label in &a.labels {
                            *bucket.entry(label.as_str()).or_default() += d;
                        }
                    }
                }
            }
        }

        let mut summary = Summary::empty(query.from, query.to);
        for (kind, bucket) in buckets {
            let mut items: Vec<SummaryItem> = bucket
                .into_iter()
                .map(|(k, total)| SummaryItem::new(k, total))
                .collect();
            items.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
            *summary.items_mut(kind) = items;
        }
        summary
    }
}

#[async_trait]
impl UserService for MemoryBackend {
    async fn count(&self) -> Result<i64> {
        Ok(self.users.len() as i64)
    }

    async fn get_active(&self, _exact: bool) -> Result<Vec<User>> {
        let since = Utc::now() - self.active_window;
        Ok(self
            .users
            .iter()
            .filter(|u| self.user_activities(&u.id).iter().any(|a| a.time >= since))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HeartbeatService for MemoryBackend {
    async fn count(&self, _approximate: bool) -> Result<i64> {
        Ok(self.activities.values().map(|v| v.len() as i64).sum())
    }

    async fn count_by_user(&self, user: &User) -> Result<i64> {
        Ok(self.user_activities(&user.id).len() as i64)
    }

    async fn count_by_users(&self, users: &[User]) -> Result<Vec<UserCount>> {
        Ok(users
            .iter()
            .map(|u| UserCount {
                user: u.id.clone(),
                count: self.user_activities(&u.id).len() as i64,
            })
            .collect())
    }
}

#[async_trait]
impl SummaryService for MemoryBackend {
    async fn aliased(&self, query: SummaryQuery<'_>) -> Result<Summary> {
        // filtered and explicitly re-summarized queries are never memoized
        let cacheable =
            query.use_cache && query.filters.is_none() && query.retrieval == Retrieval::Retrieve;
        let key = (query.user.id.clone(), query.from, query.to);

        if cacheable {
            if let Some(hit) = self.summary_cache.get(&key) {
                return Ok(hit.value().clone());
            }
        }

        tracing::trace!(user = %query.user.id, retrieval = ?query.retrieval, "summarizing activities");
        let summary = self.summarize(&query);

        if cacheable {
            if self.summary_cache.len() >= SUMMARY_CACHE_CAPACITY {
                self.summary_cache.clear();
            }
            self.summary_cache.insert(key, summary.clone());
        }
        Ok(summary)
    }
}

#[async_trait]
impl KeyValueService for MemoryBackend {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.key_values.get(key).cloned())
    }
}

#[async_trait]
impl MetricsRepository for MemoryBackend {
    async fn database_size(&self) -> Result<i64> {
        Ok(self.database_size)
    }
}

#[async_trait]
impl QueueMetricsProvider for MemoryBackend {
    async fn queue_metrics(&self) -> Result<Vec<QueueSnapshot>> {
        Ok(self.queues.clone())
    }
}

#[async_trait]
impl Authenticator for MemoryBackend {
    async fn authenticate(&self, api_key: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.api_key.as_deref() == Some(api_key))
            .cloned())
    }
}
