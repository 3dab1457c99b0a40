//! Summary value types returned by `SummaryService`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::User;

/// Breakdown dimension of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    Project,
    Language,
    Editor,
    OperatingSystem,
    Machine,
    Label,
}

impl SummaryKind {
    pub const ALL: [SummaryKind; 6] = [
        SummaryKind::Project,
        SummaryKind::Language,
        SummaryKind::Editor,
        SummaryKind::OperatingSystem,
        SummaryKind::Machine,
        SummaryKind::Label,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub key: String,
    pub total: Duration,
}

impl SummaryItem {
    pub fn new(key: impl Into<String>, total: Duration) -> Self {
        Self {
            key: key.into(),
            total,
        }
    }
}

/// Tracked time over one interval, broken down per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub projects: Vec<SummaryItem>,
    pub languages: Vec<SummaryItem>,
    pub editors: Vec<SummaryItem>,
    pub operating_systems: Vec<SummaryItem>,
    pub machines: Vec<SummaryItem>,
    pub labels: Vec<SummaryItem>,
}

impl Summary {
    pub fn empty(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            projects: Vec::new(),
            languages: Vec::new(),
            editors: Vec::new(),
            operating_systems: Vec::new(),
            machines: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn items(&self, kind: SummaryKind) -> &[SummaryItem] {
        match kind {
            SummaryKind::Project => &self.projects,
            SummaryKind::Language => &self.languages,
            SummaryKind::Editor => &self.editors,
            SummaryKind::OperatingSystem => &self.operating_systems,
            SummaryKind::Machine => &self.machines,
            SummaryKind::Label => &self.labels,
        }
    }

    pub fn items_mut(&mut self, kind: SummaryKind) -> &mut Vec<SummaryItem> {
        match kind {
            SummaryKind::Project => &mut self.projects,
            SummaryKind::Language => &mut self.languages,
            SummaryKind::Editor => &mut self.editors,
            SummaryKind::OperatingSystem => &mut self.operating_systems,
            SummaryKind::Machine => &mut self.machines,
            SummaryKind::Label => &mut self.labels,
        }
    }

    /// Total tracked time: the sum of the first non-empty breakdown.
    ///
    /// Labels are never used, a project may carry several of them.
    pub fn total_time(&self) -> Duration {
        [
            SummaryKind::Project,
            SummaryKind::Language,
            SummaryKind::Editor,
            SummaryKind::OperatingSystem,
            SummaryKind::Machine,
        ]
        .into_iter()
        .map(|k| self.items(k))
        .find(|items| !items.is_empty())
        .map(|items| items.iter().map(|i| i.total).sum())
        .unwrap_or_default()
    }

    pub fn total_time_by_key(&self, kind: SummaryKind, key: &str) -> Duration {
        self.items(kind)
            .iter()
            .filter(|i| i.key == key)
            .map(|i| i.total)
            .sum()
    }
}

/// How the summary collaborator should obtain its data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retrieval {
    /// Reuse persisted summaries and only summarize the gaps.
    #[default]
    Retrieve,
    /// Summarize raw heartbeats for the whole interval, bypassing any cache.
    Summarize,
}

/// Restrict a summary to activities whose `kind` value is one of `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFilters {
    pub kind: SummaryKind,
    pub values: Vec<String>,
}

/// Arguments to `SummaryService::aliased`, passed through unchanged.
#[derive(Debug, Clone)]
pub struct SummaryQuery<'a> {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub user: &'a User,
    pub retrieval: Retrieval,
    pub filters: Option<SummaryFilters>,
    pub use_cache: bool,
}

impl<'a> SummaryQuery<'a> {
    /// Unfiltered `Retrieve` query that may be served from the collaborator's cache.
    pub fn retrieve(user: &'a User, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            user,
            retrieval: Retrieval::Retrieve,
            filters: None,
            use_cache: true,
        }
    }
}
