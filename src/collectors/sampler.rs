//! Per-process CPU and resident memory via sysinfo.
//!
//! All processes are refreshed together once per cycle in `prepare`, so CPU
//! usage covers the time since the previous cycle. Refreshing one pid at a
//! time would reset the global CPU counters between pids.

use super::{ResourceSample, ResourceSampler};
use crate::error::SampleError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use sysinfo::{Pid, System, MINIMUM_CPU_UPDATE_INTERVAL};

pub struct SysinfoSampler {
    state: Mutex<SamplerState>,
}

#[derive(Default)]
struct SamplerState {
    sys: Option<System>,
    /// pid -> start time at the last refresh; only live processes
    starts: HashMap<u32, u64>,
    /// pids refreshed this cycle, whether or not they were found
    prepared: HashSet<u32>,
    /// This cycle's samples, cleared by every `prepare`
    samples: HashMap<u32, ResourceSample>,
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSampler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SamplerState::default()),
        }
    }
}

impl SamplerState {
    fn refresh(&mut self, pids: &[u32]) {
        let sys = self.sys.get_or_insert_with(System::new);
        sys.refresh_processes();

        // No baseline yet for pids never seen, or seen as another process.
        let fresh: Vec<u32> = pids
            .iter()
            .copied()
            .filter(|pid| {
                let start = sys.process(Pid::from_u32(*pid)).map(|p| p.start_time());
                start.is_some() && self.starts.get(pid).copied() != start
            })
            .collect();

        self.prepared.extend(pids.iter().copied());
        self.samples.extend(collect(sys, pids));
        if !fresh.is_empty() {
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
            sys.refresh_processes();
            let again = collect(sys, &fresh);
            for pid in &fresh {
                match again.get(pid) {
                    Some(s) => self.samples.insert(*pid, *s),
                    None => self.samples.remove(pid),
                };
            }
        }

        self.starts = sys
            .processes()
            .iter()
            .map(|(pid, p)| (pid.as_u32(), p.start_time()))
            .collect();
    }
}

fn collect(sys: &System, pids: &[u32]) -> HashMap<u32, ResourceSample> {
    pids.iter()
        .filter_map(|pid| {
            let p = sys.process(Pid::from_u32(*pid))?;
            Some((
                *pid,
                ResourceSample {
                    cpu_percent: f64::from(p.cpu_usage()).max(0.0),
                    memory_bytes: p.memory(),
                },
            ))
        })
        .collect()
}

impl ResourceSampler for SysinfoSampler {
    fn prepare(&self, pids: &[u32]) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prepared.clear();
        state.samples.clear();
        state.refresh(pids);
    }

    fn sample(&self, pid: u32) -> Result<ResourceSample, SampleError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.prepared.contains(&pid) {
            state.refresh(&[pid]);
        }
        state
            .samples
            .get(&pid)
            .copied()
            .ok_or_else(|| classify_missing(pid))
    }
}

/// A pid whose `/proc` entry is still there but unreadable is a permission
/// problem, not an exit.
#[cfg(target_os = "linux")]
fn classify_missing(pid: u32) -> SampleError {
    if std::path::Path::new(&format!("/proc/{pid}")).exists() {
        SampleError::PermissionDenied { pid }
    } else {
        SampleError::NotFound { pid }
    }
}

#[cfg(not(target_os = "linux"))]
fn classify_missing(pid: u32) -> SampleError {
    SampleError::NotFound { pid }
}
