//! Process inventory (cross-platform via sysinfo).

use super::{ProcessInventory, ProcessSnapshot};
use crate::error::{PortwatchError, Result};
use std::sync::Mutex;
use sysinfo::{Pid, System};

pub struct SysinfoInventory {
    sys: Mutex<System>,
}

impl Default for SysinfoInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoInventory {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }
}

impl ProcessInventory for SysinfoInventory {
    fn list_processes(&self) -> Result<Vec<ProcessSnapshot>> {
        let mut sys = self.sys.lock().map_err(|_| PortwatchError::Platform {
            reason: "process table lock poisoned".to_string(),
        })?;
        sys.refresh_processes();

        if sys.processes().is_empty() {
            return Err(PortwatchError::Platform {
                reason: "no processes visible".to_string(),
            });
        }

        let out = sys
            .processes()
            .iter()
            .map(|(pid, proc_)| ProcessSnapshot {
                pid: pid.as_u32(),
                name: proc_.name().to_string(),
                cmdline: proc_.cmd().join(" "),
                threads: thread_count(*pid),
            })
            .collect();
        Ok(out)
    }
}

/// Threads of `pid`; 0 where the platform does not expose them.
#[cfg(target_os = "linux")]
fn thread_count(pid: Pid) -> usize {
    std::fs::read_dir(format!("/proc/{}/task", pid.as_u32()))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
fn thread_count(_pid: Pid) -> usize {
    0
}
