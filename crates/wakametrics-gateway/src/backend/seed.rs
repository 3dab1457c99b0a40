//! YAML dataset for `MemoryBackend` (strict parsing).

use std::collections::BTreeMap;
use std::fs;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use wakametrics_core::error::{MetricsError, Result};

use super::{QueueSnapshot, SummaryKind, User};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub aliases: Vec<Alias>,
    #[serde(default)]
    pub key_values: BTreeMap<String, String>,
    #[serde(default)]
    pub database_size: i64,
    #[serde(default)]
    pub queues: Vec<QueueSnapshot>,
}

/// One heartbeat with the time it accounts for.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Activity {
    pub user: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub duration_secs: u64,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub editor: String,
    #[serde(default)]
    pub operating_system: String,
    #[serde(default)]
    pub machine: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Activity {
    /// Value of a single-valued dimension. Labels are multi-valued and return `None`.
    pub fn key(&self, kind: SummaryKind) -> Option<&str> {
        match kind {
            SummaryKind::Project => Some(&self.project),
            SummaryKind::Language => Some(&self.language),
            SummaryKind::Editor => Some(&self.editor),
            SummaryKind::OperatingSystem => Some(&self.operating_system),
            SummaryKind::Machine => Some(&self.machine),
            SummaryKind::Label => None,
        }
    }
}

/// Maps `value` to the canonical `key` in the user's summaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alias {
    pub user: String,
    pub kind: SummaryKind,
    pub key: String,
    pub value: String,
}

impl Seed {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .map_err(|e| MetricsError::Internal(format!("read seed failed: {e}")))?;
        Self::load_from_str(&s)
    }

    pub fn load_from_str(s: &str) -> Result<Self> {
        let seed: Seed = serde_yaml::from_str(s)
            .map_err(|e| MetricsError::BadRequest(format!("invalid seed yaml: {e}")))?;
        seed.validate()?;
        Ok(seed)
    }

    fn validate(&self) -> Result<()> {
        for a in &self.activities {
            if !self.users.iter().any(|u| u.id == a.user) {
                return Err(MetricsError::BadRequest(format!(
                    "activity references unknown user: {}",
                    a.user
                )));
            }
        }
        let mut keys: Vec<&str> = self.users.iter().filter_map(|u| u.api_key.as_deref()).collect();
        keys.sort_unstable();
        if keys.windows(2).any(|w| w[0] == w[1]) {
            return Err(MetricsError::BadRequest("duplicate api_key in seed users".into()));
        }
        Ok(())
    }
}
