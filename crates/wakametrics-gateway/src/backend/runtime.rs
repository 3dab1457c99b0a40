//! Process runtime statistics.
//!
//! Memory figures come from the OS view of this process (`sysinfo`), the
//! worker count from the Tokio runtime. Rust has no garbage collector, so the
//! GC pause and cycle counters stay at zero.

use std::sync::{Mutex, PoisonError};

use sysinfo::{Pid, System};

use super::{RuntimeSnapshot, RuntimeStatsProvider};

pub struct ProcessRuntimeStats {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessRuntimeStats {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = %e, "cannot resolve own pid, memory stats disabled");
                None
            }
        };
        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }

    fn memory(&self) -> (u64, u64) {
        let Some(pid) = self.pid else { return (0, 0); };
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        if !system.refresh_process(pid) {
            return (0, 0);
        }
        system
            .process(pid)
            .map(|p| (p.memory(), p.virtual_memory()))
            .unwrap_or((0, 0))
    }
}

impl Default for ProcessRuntimeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeStatsProvider for ProcessRuntimeStats {
    fn snapshot(&self) -> RuntimeSnapshot {
        let (allocated_bytes, system_bytes) = self.memory();
        let workers = tokio::runtime::Handle::try_current()
            .map(|h| h.metrics().num_alive_tasks() as u64)
            .unwrap_or(0);

        RuntimeSnapshot {
            allocated_bytes,
            system_bytes,
            gc_pause_total_ns: 0,
            gc_cycles: 0,
            workers,
        }
    }
}
