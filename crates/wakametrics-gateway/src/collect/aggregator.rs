//! Per-active-user aggregation for the admin segment.
//!
//! Heartbeat counts come from one batched call. Total time needs one summary
//! lookup per user, so those run as one task each on a `JoinSet`, with a
//! semaphore bounding how many lookups are in flight. Results are appended to
//! a shared set behind an async mutex; nobody reads it before every task has
//! been joined.
//!
//! A failing lookup is logged and skipped. Only cancellation of the owning
//! request aborts the barrier.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use wakametrics_core::error::{MetricsError, Result};
use wakametrics_core::model::saturating_i64;
use wakametrics_core::{Metric, MetricSet};

use super::names::{self, MetricNames};
use crate::backend::{HeartbeatService, SummaryQuery, SummaryService, User};

pub struct PerUserAggregator {
    heartbeats: Arc<dyn HeartbeatService>,
    summaries: Arc<dyn SummaryService>,
    names: MetricNames,
    workers: usize,
}

impl PerUserAggregator {
    pub fn new(
        heartbeats: Arc<dyn HeartbeatService>,
        summaries: Arc<dyn SummaryService>,
        names: MetricNames,
        workers: usize,
    ) -> Self {
        Self {
            heartbeats,
            summaries,
            names,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// One heartbeat-count gauge per user, from a single batched call.
    pub async fn heartbeat_counts(&self, requester: &User, users: &[User]) -> Result<MetricSet> {
        let counts = self
            .heartbeats
            .count_by_users(users)
            .await
            .map_err(|e| MetricsError::upstream("heartbeats.count_by_users", &requester.id, e))?;

        let name = self.names.get(names::ADMIN_USER_HEARTBEATS);
        Ok(counts
            .into_iter()
            .map(|uc| {
                Metric::gauge(name.clone(), names::DESC_ADMIN_USER_HEARTBEATS, uc.count)
                    .with_label("user", uc.user)
            })
            .collect())
    }

    /// Append one total-time gauge per user to `into`, for every user whose
    /// summary lookup succeeds. Returns `Cancelled` only if `cancel` fires
    /// before all tasks have finished.
    pub async fn total_times(
        &self,
        users: &[User],
        interval: (DateTime<Utc>, DateTime<Utc>),
        into: MetricSet,
        cancel: &CancellationToken,
    ) -> Result<MetricSet> {
        let (from, to) = interval;
        let shared = Arc::new(Mutex::new(into));
        let permits = Arc::new(Semaphore::new(self.workers));
        let name = self.names.get(names::ADMIN_USER_TIME);
        let mut tasks = JoinSet::new();

        for user in users.iter().cloned() {
            let summaries = Arc::clone(&self.summaries);
            let shared = Arc::clone(&shared);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            let name = name.clone();

            tasks.spawn(async move {
                let work = async {
                    let Ok(_permit) = permits.acquire_owned().await else { return; };
                    // aliased() is used for its cache, not for the aliases
                    let query = SummaryQuery::retrieve(&user, from, to);

                    match summaries.aliased(query).await {
                        Ok(summary) => {
                            let secs = saturating_i64(summary.total_time().as_secs());
                            let metric = Metric::gauge(name, names::DESC_ADMIN_USER_TIME, secs)
                                .with_label("user", user.id.clone());
                            shared.lock().await.push(metric);
                        }
                        Err(e) => {
                            tracing::error!(user = %user.id, error = %e, "failed to get total time for user as part of metrics");
                        }
                    }
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = work => {}
                }
            });
        }

        let cancelled = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break true,
                joined = tasks.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(e)) => tracing::error!(error = %e, "per-user metrics task did not complete"),
                    None => break false,
                },
            }
        };

        if cancelled {
            tasks.shutdown().await;
            return Err(MetricsError::Cancelled);
        }

        let mut guard = shared.lock().await;
        Ok(std::mem::take(&mut *guard))
    }
}
