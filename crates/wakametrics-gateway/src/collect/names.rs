//! Metric name suffixes and their descriptions.
//!
//! Full names are `<prefix>_<suffix>`; the prefix comes from config
//! (`metrics.prefix`).

pub const CUMULATIVE_SECONDS: &str = "cumulative_seconds_total";
pub const SECONDS: &str = "seconds_total";
pub const HEARTBEATS: &str = "heartbeats_total";
pub const PROJECT_SECONDS: &str = "project_seconds_total";
pub const LANGUAGE_SECONDS: &str = "language_seconds_total";
pub const EDITOR_SECONDS: &str = "editor_seconds_total";
pub const OPERATING_SYSTEM_SECONDS: &str = "operating_system_seconds_total";
pub const MACHINE_SECONDS: &str = "machine_seconds_total";
pub const LABEL_SECONDS: &str = "label_seconds_total";

pub const GOROUTINES: &str = "goroutines_total";
pub const MEM_ALLOC: &str = "mem_alloc_total";
pub const MEM_SYS: &str = "mem_sys_total";
pub const PAUSED: &str = "paused_total";
pub const NUM_GC: &str = "num_gc_total";
pub const DB_BYTES: &str = "db_total_bytes";

pub const QUEUE_ENQUEUED: &str = "queue_jobs_enqueued";
pub const QUEUE_FINISHED: &str = "queue_jobs_total_finished";

pub const ADMIN_SECONDS: &str = "admin_seconds_total";
pub const ADMIN_HEARTBEATS: &str = "admin_heartbeats_total";
pub const ADMIN_USERS: &str = "admin_users_total";
pub const ADMIN_USERS_ACTIVE: &str = "admin_users_active_total";
pub const ADMIN_USER_HEARTBEATS: &str = "admin_user_heartbeats_total";
pub const ADMIN_USER_TIME: &str = "admin_user_time_seconds_total";

pub const DESC_HEARTBEATS: &str = "Total number of tracked heartbeats.";
pub const DESC_ALL_TIME: &str = "Total seconds (all time).";
pub const DESC_TOTAL: &str = "Total seconds.";
pub const DESC_EDITORS: &str = "Total seconds for each editor.";
pub const DESC_PROJECTS: &str = "Total seconds for each project.";
pub const DESC_LANGUAGES: &str = "Total seconds for each language.";
pub const DESC_OPERATING_SYSTEMS: &str = "Total seconds for each operating system.";
pub const DESC_MACHINES: &str = "Total seconds for each machine.";
pub const DESC_LABELS: &str = "Total seconds for each project label.";

pub const DESC_ADMIN_TOTAL_TIME: &str = "Total seconds (all users, all time).";
pub const DESC_ADMIN_TOTAL_HEARTBEATS: &str = "Total number of tracked heartbeats (all users, all time)";
pub const DESC_ADMIN_USER_HEARTBEATS: &str = "Total number of tracked heartbeats by user (all time).";
pub const DESC_ADMIN_USER_TIME: &str = "Total tracked activity in seconds (all time) (active users only).";
pub const DESC_ADMIN_TOTAL_USERS: &str = "Total number of registered users.";
pub const DESC_ADMIN_ACTIVE_USERS: &str = "Number of active users.";

pub const DESC_QUEUE_ENQUEUED: &str = "Number of jobs currently enqueued";
pub const DESC_QUEUE_FINISHED: &str = "Total number of processed jobs";

pub const DESC_MEM_ALLOC: &str = "Total number of bytes allocated for heap";
pub const DESC_MEM_SYS: &str = "Total number of bytes obtained from the OS";
pub const DESC_PAUSED: &str = "Total nanoseconds stop-the-world pause time due to GC";
pub const DESC_NUM_GC: &str = "Total number of GC cycles";
pub const DESC_GOROUTINES: &str = "Total number of running goroutines";
pub const DESC_DATABASE_SIZE: &str = "Total database size in bytes";

/// Builds fully-qualified metric names for one prefix.
#[derive(Debug, Clone)]
pub struct MetricNames {
    prefix: String,
}

impl MetricNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn get(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Whether `name` belongs to the admin segment.
    pub fn is_admin(&self, name: &str) -> bool {
        name.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix("_admin_"))
            .is_some()
    }
}
