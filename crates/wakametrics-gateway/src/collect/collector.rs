//! Metrics collector: builds the complete metric set for one request.
//!
//! Phases run strictly in sequence against the collaborators; any failure in
//! them aborts the request. The only fan-out happens in the admin segment and
//! is delegated to `PerUserAggregator`.

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use wakametrics_core::error::{MetricsError, Result};
use wakametrics_core::model::saturating_i64;
use wakametrics_core::{Metric, MetricSet, SortedMetrics};

use super::aggregator::PerUserAggregator;
use super::interval;
use super::names::{self, MetricNames};
use crate::backend::{Backends, SummaryKind, SummaryQuery, User};

/// Key-value entry holding the last computed instance-wide total time.
pub const KEY_LATEST_TOTAL_TIME: &str = "latest_total_time";

const BREAKDOWNS: [(SummaryKind, &str, &str); 6] = [
    (SummaryKind::Project, names::PROJECT_SECONDS, names::DESC_PROJECTS),
    (SummaryKind::Language, names::LANGUAGE_SECONDS, names::DESC_LANGUAGES),
    (SummaryKind::Editor, names::EDITOR_SECONDS, names::DESC_EDITORS),
    (SummaryKind::OperatingSystem, names::OPERATING_SYSTEM_SECONDS, names::DESC_OPERATING_SYSTEMS),
    (SummaryKind::Machine, names::MACHINE_SECONDS, names::DESC_MACHINES),
    (SummaryKind::Label, names::LABEL_SECONDS, names::DESC_LABELS),
];

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
}

pub struct MetricsCollector {
    backends: Backends,
    names: MetricNames,
    aggregator: PerUserAggregator,
}

impl MetricsCollector {
    pub fn new(backends: Backends, names: MetricNames, workers: usize) -> Self {
        let aggregator = PerUserAggregator::new(
            backends.heartbeats.clone(),
            backends.summaries.clone(),
            names.clone(),
            workers,
        );
        Self {
            backends,
            names,
            aggregator,
        }
    }

    pub fn workers(&self) -> usize {
        self.aggregator.workers()
    }

    /// User metrics, plus admin metrics for admins, merged and sorted.
    pub async fn collect(
        &self,
        principal: Option<&Principal>,
        cancel: &CancellationToken,
    ) -> Result<SortedMetrics> {
        let user = &principal.ok_or(MetricsError::Unauthorized)?.user;

        let mut metrics = self.user_metrics(user).await?;
        if user.is_admin {
            metrics.merge(self.admin_metrics(user, cancel).await?);
        }
        Ok(metrics.into_sorted())
    }

    pub async fn user_metrics(&self, user: &User) -> Result<MetricSet> {
        let b = &self.backends;
        let now = Utc::now();
        let mut metrics = MetricSet::new();

        let (from, to) = interval::all_time(now);
        let summary_all_time = b
            .summaries
            .aliased(SummaryQuery::retrieve(user, from, to))
            .await
            .map_err(|e| MetricsError::upstream("summaries.aliased(all_time)", &user.id, e))?;

        let (from, to) = interval::today(user, now);
        let summary_today = b
            .summaries
            .aliased(SummaryQuery::retrieve(user, from, to))
            .await
            .map_err(|e| MetricsError::upstream("summaries.aliased(today)", &user.id, e))?;

        let heartbeat_count = b
            .heartbeats
            .count_by_user(user)
            .await
            .map_err(|e| MetricsError::upstream("heartbeats.count_by_user", &user.id, e))?;

        metrics.push(Metric::gauge(
            self.names.get(names::CUMULATIVE_SECONDS),
            names::DESC_ALL_TIME,
            secs(summary_all_time.total_time()),
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::SECONDS),
            names::DESC_TOTAL,
            secs(summary_today.total_time()),
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::HEARTBEATS),
            names::DESC_HEARTBEATS,
            heartbeat_count,
        ));

        for (kind, suffix, desc) in BREAKDOWNS {
            let name = self.names.get(suffix);
            for item in summary_today.items(kind) {
                let value = secs(summary_today.total_time_by_key(kind, &item.key));
                metrics.push(Metric::gauge(name.clone(), desc, value).with_label("name", item.key.clone()));
            }
        }

        // runtime
        let rt = b.runtime.snapshot();
        metrics.push(Metric::gauge(
            self.names.get(names::GOROUTINES),
            names::DESC_GOROUTINES,
            saturating_i64(rt.workers),
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::MEM_ALLOC),
            names::DESC_MEM_ALLOC,
            saturating_i64(rt.allocated_bytes),
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::MEM_SYS),
            names::DESC_MEM_SYS,
            saturating_i64(rt.system_bytes),
        ));
        metrics.push(Metric::counter(
            self.names.get(names::PAUSED),
            names::DESC_PAUSED,
            saturating_i64(rt.gc_pause_total_ns),
        ));
        metrics.push(Metric::counter(
            self.names.get(names::NUM_GC),
            names::DESC_NUM_GC,
            saturating_i64(rt.gc_cycles),
        ));

        // database
        let db_size = b
            .repository
            .database_size()
            .await
            .map_err(|e| MetricsError::upstream("repository.database_size", &user.id, e))?;
        metrics.push(Metric::gauge(
            self.names.get(names::DB_BYTES),
            names::DESC_DATABASE_SIZE,
            db_size,
        ));

        // job queues
        let queues = b
            .queues
            .queue_metrics()
            .await
            .map_err(|e| MetricsError::upstream("queues.queue_metrics", &user.id, e))?;
        let enqueued = self.names.get(names::QUEUE_ENQUEUED);
        let finished = self.names.get(names::QUEUE_FINISHED);
        for q in queues {
            metrics.push(
                Metric::gauge(enqueued.clone(), names::DESC_QUEUE_ENQUEUED, q.enqueued)
                    .with_label("queue", q.queue.clone()),
            );
            metrics.push(
                Metric::counter(finished.clone(), names::DESC_QUEUE_FINISHED, q.finished)
                    .with_label("queue", q.queue),
            );
        }

        Ok(metrics)
    }

    pub async fn admin_metrics(&self, user: &User, cancel: &CancellationToken) -> Result<MetricSet> {
        if !user.is_admin {
            return Err(MetricsError::Forbidden(format!(
                "user '{}' may not read admin metrics",
                user.id
            )));
        }

        let b = &self.backends;
        let t0 = Instant::now();
        tracing::debug!(user = %user.id, "start admin metrics calculation");

        let total_seconds = self.cached_total_seconds(user).await?;
        let total_users = b
            .users
            .count()
            .await
            .map_err(|e| MetricsError::upstream("users.count", &user.id, e))?;
        let total_heartbeats = b
            .heartbeats
            .count(true)
            .await
            .map_err(|e| MetricsError::upstream("heartbeats.count", &user.id, e))?;
        tracing::debug!(elapsed_ms = elapsed_ms(t0), "finished counting users and heartbeats");

        let active_users = b
            .users
            .get_active(false)
            .await
            .map_err(|e| MetricsError::upstream("users.get_active", &user.id, e))?;
        tracing::debug!(
            elapsed_ms = elapsed_ms(t0),
            active = active_users.len(),
            "finished getting active users"
        );

        let mut metrics = MetricSet::new();
        metrics.push(Metric::gauge(
            self.names.get(names::ADMIN_SECONDS),
            names::DESC_ADMIN_TOTAL_TIME,
            total_seconds,
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::ADMIN_HEARTBEATS),
            names::DESC_ADMIN_TOTAL_HEARTBEATS,
            total_heartbeats,
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::ADMIN_USERS),
            names::DESC_ADMIN_TOTAL_USERS,
            total_users,
        ));
        metrics.push(Metric::gauge(
            self.names.get(names::ADMIN_USERS_ACTIVE),
            names::DESC_ADMIN_ACTIVE_USERS,
            active_users.len() as i64,
        ));

        metrics.merge(self.aggregator.heartbeat_counts(user, &active_users).await?);
        tracing::debug!(elapsed_ms = elapsed_ms(t0), "finished counting heartbeats by user");

        let metrics = self
            .aggregator
            .total_times(&active_users, interval::all_time_hourly(Utc::now()), metrics, cancel)
            .await?;
        tracing::debug!(
            elapsed_ms = elapsed_ms(t0),
            workers = self.aggregator.workers(),
            "finished retrieving total activity time by user"
        );

        Ok(metrics)
    }

    /// Last instance-wide total time persisted by the summary job, in seconds.
    /// Missing or unparseable values count as zero.
    async fn cached_total_seconds(&self, user: &User) -> Result<i64> {
        let raw = self
            .backends
            .key_values
            .get_string(KEY_LATEST_TOTAL_TIME)
            .await
            .map_err(|e| MetricsError::upstream("key_values.get_string", &user.id, e))?;

        let Some(raw) = raw.filter(|v| !v.is_empty()) else {
            return Ok(0);
        };
        match interval::parse_go_duration(&raw) {
            Some(secs) => Ok(secs as i64),
            None => {
                tracing::warn!(key = KEY_LATEST_TOTAL_TIME, value = %raw, "unparseable cached total time");
                Ok(0)
            }
        }
    }
}

fn secs(d: Duration) -> i64 {
    saturating_i64(d.as_secs())
}

fn elapsed_ms(t0: Instant) -> u64 {
    t0.elapsed().as_millis() as u64
}
