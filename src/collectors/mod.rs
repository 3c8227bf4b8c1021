//! Host state collectors: listening sockets, process inventory, per-process
//! resource samples. Each sits behind a capability trait so the cycle can be
//! driven by canned data in tests.

mod fixed;
mod process;
mod sampler;
mod sockets;

use crate::error::{Result, SampleError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use fixed::{FixedInventory, FixedSampler, FixedSockets};
pub use process::SysinfoInventory;
pub use sampler::SysinfoSampler;
pub use sockets::{parse_listening, SsSocketResolver};

/// Listening port -> owning pid, rebuilt every cycle.
pub type PortMap = BTreeMap<u16, u32>;

/// One listening socket with a known owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListeningSocket {
    pub port: u16,
    pub owner_pid: u32,
}

/// Process metadata at enumeration time. Never cached across ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub cmdline: String,
    pub threads: usize,
}

/// Instantaneous usage for one pid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_bytes: u64,
}

/// Best-effort discovery of listening sockets. Never fails; an unusable
/// source yields an empty map.
pub trait SocketResolver: Send + Sync {
    fn resolve(&self) -> PortMap;
}

/// Enumerates every process visible at the caller's privilege level.
pub trait ProcessInventory: Send + Sync {
    fn list_processes(&self) -> Result<Vec<ProcessSnapshot>>;
}

/// Point-in-time CPU and resident memory for a pid.
pub trait ResourceSampler: Send + Sync {
    /// Called once per cycle with every pid about to be sampled.
    fn prepare(&self, _pids: &[u32]) {}

    fn sample(&self, pid: u32) -> std::result::Result<ResourceSample, SampleError>;
}

/// First listening port owned by `pid`, lowest port number first.
pub fn port_for_pid(ports: &PortMap, pid: u32) -> Option<u16> {
    ports
        .iter()
        .find_map(|(port, owner)| (*owner == pid).then_some(*port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_lookup_prefers_lowest_port() {
        let mut ports = PortMap::new();
        ports.insert(9090, 7);
        ports.insert(8080, 7);
        ports.insert(5432, 9);
        assert_eq!(port_for_pid(&ports, 7), Some(8080));
        assert_eq!(port_for_pid(&ports, 9), Some(5432));
        assert_eq!(port_for_pid(&ports, 1), None);
    }
}
