//! Canned collectors for tests, benches and dry runs.

use super::{PortMap, ProcessInventory, ProcessSnapshot, ResourceSample, ResourceSampler, SocketResolver};
use crate::error::{PortwatchError, Result, SampleError};
use std::collections::HashMap;

/// Returns the same port map every time.
#[derive(Debug, Clone, Default)]
pub struct FixedSockets(pub PortMap);

impl SocketResolver for FixedSockets {
    fn resolve(&self) -> PortMap {
        self.0.clone()
    }
}

/// Returns a fixed process list, or a platform error when `failing`.
#[derive(Debug, Clone, Default)]
pub struct FixedInventory {
    pub processes: Vec<ProcessSnapshot>,
    pub failing: bool,
}

impl FixedInventory {
    pub fn new(processes: Vec<ProcessSnapshot>) -> Self {
        Self {
            processes,
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            processes: Vec::new(),
            failing: true,
        }
    }
}

impl ProcessInventory for FixedInventory {
    fn list_processes(&self) -> Result<Vec<ProcessSnapshot>> {
        if self.failing {
            return Err(PortwatchError::Platform {
                reason: "process table unreadable".to_string(),
            });
        }
        Ok(self.processes.clone())
    }
}

/// Per-pid canned outcomes. Unknown pids are `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct FixedSampler {
    outcomes: HashMap<u32, std::result::Result<ResourceSample, SampleError>>,
}

impl FixedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample(mut self, pid: u32, cpu_percent: f64, memory_bytes: u64) -> Self {
        self.outcomes.insert(
            pid,
            Ok(ResourceSample {
                cpu_percent,
                memory_bytes,
            }),
        );
        self
    }

    pub fn with_error(mut self, pid: u32, err: SampleError) -> Self {
        self.outcomes.insert(pid, Err(err));
        self
    }
}

impl ResourceSampler for FixedSampler {
    fn sample(&self, pid: u32) -> std::result::Result<ResourceSample, SampleError> {
        self.outcomes
            .get(&pid)
            .cloned()
            .unwrap_or(Err(SampleError::NotFound { pid }))
    }
}
