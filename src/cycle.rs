//! One collection cycle: sockets -> processes -> filter -> sample -> persist.
//!
//! Every record of a cycle carries the timestamp captured at cycle start.
//! A process that cannot be sampled is skipped for this tick only. The cycle
//! does not log; its report goes to the scheduler.

use crate::collectors::{
    port_for_pid, ProcessInventory, ResourceSampler, SocketResolver,
};
use crate::error::Result;
use crate::filter::ImportanceFilter;
use crate::storage::{CsvStore, MetricRecord};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Outcome of a completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    /// Processes that passed the importance filter
    pub important: usize,
    /// Important processes skipped because sampling failed
    pub skipped: usize,
    /// Records appended to the store
    pub written: usize,
}

pub struct CollectionCycle {
    sockets: Box<dyn SocketResolver>,
    inventory: Box<dyn ProcessInventory>,
    sampler: Box<dyn ResourceSampler>,
    filter: ImportanceFilter,
    store: Arc<CsvStore>,
}

impl CollectionCycle {
    pub fn new(
        sockets: Box<dyn SocketResolver>,
        inventory: Box<dyn ProcessInventory>,
        sampler: Box<dyn ResourceSampler>,
        filter: ImportanceFilter,
        store: Arc<CsvStore>,
    ) -> Self {
        Self {
            sockets,
            inventory,
            sampler,
            filter,
            store,
        }
    }

    pub fn store(&self) -> &Arc<CsvStore> {
        &self.store
    }

    pub fn run_cycle(&self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now())
    }

    /// Run with an explicit cycle timestamp.
    pub fn run_cycle_at(&self, timestamp: DateTime<Utc>) -> Result<CycleReport> {
        let ports = self.sockets.resolve();
        let processes = self.inventory.list_processes()?;

        let important: Vec<_> = processes
            .iter()
            .filter(|p| self.filter.is_important(p))
            .collect();

        let pids: Vec<u32> = important.iter().map(|p| p.pid).collect();
        self.sampler.prepare(&pids);

        let mut records = Vec::with_capacity(important.len());
        for proc_ in &important {
            match self.sampler.sample(proc_.pid) {
                Ok(sample) => {
                    let port = port_for_pid(&ports, proc_.pid);
                    records.push(MetricRecord::new(timestamp, port, proc_, &sample));
                }
                // Exited or inaccessible: skip for this tick only.
                Err(_) => continue,
            }
        }

        let skipped = important.len() - records.len();
        let written = self.store.append_batch(&records)?;
        Ok(CycleReport {
            timestamp,
            important: important.len(),
            skipped,
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::{
        FixedInventory, FixedSampler, FixedSockets, PortMap, ProcessSnapshot, ResourceSample,
    };
    use crate::error::{PortwatchError, SampleError};
    use crate::storage::format_timestamp;
    use chrono::TimeZone;

    fn snap(pid: u32, name: &str) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            name: name.to_string(),
            cmdline: String::new(),
            threads: 3,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn cycle(
        dir: &tempfile::TempDir,
        ports: PortMap,
        inventory: FixedInventory,
        sampler: FixedSampler,
    ) -> CollectionCycle {
        let store = Arc::new(CsvStore::open(dir.path().join("log.csv")).unwrap());
        CollectionCycle::new(
            Box::new(FixedSockets(ports)),
            Box::new(inventory),
            Box::new(sampler),
            ImportanceFilter::new(["nginx", "node", "redis"]),
            store,
        )
    }

    fn rows(c: &CollectionCycle) -> Vec<String> {
        std::fs::read_to_string(c.store().path())
            .unwrap()
            .lines()
            .skip(1)
            .map(String::from)
            .collect()
    }

    #[test]
    fn single_important_process_with_port() {
        let dir = tempfile::tempdir().unwrap();
        let c = cycle(
            &dir,
            PortMap::from([(8080, 100)]),
            FixedInventory::new(vec![snap(100, "nginx"), snap(200, "notepad")]),
            FixedSampler::new()
                .with_sample(100, 1.23, 52_428_800)
                .with_sample(200, 9.0, 1),
        );
        let report = c.run_cycle_at(ts()).unwrap();
        assert_eq!(report.important, 1);
        assert_eq!(report.written, 1);
        assert_eq!(
            rows(&c),
            vec!["2024-05-01T10:00:00.000Z,8080,100,nginx,1.23,50.00,3,0".to_string()]
        );
    }

    #[test]
    fn exited_process_yields_no_rows_and_next_cycle_works() {
        let dir = tempfile::tempdir().unwrap();
        let c = cycle(
            &dir,
            PortMap::from([(8080, 100)]),
            FixedInventory::new(vec![snap(100, "nginx")]),
            FixedSampler::new().with_error(100, SampleError::NotFound { pid: 100 }),
        );
        let report = c.run_cycle_at(ts()).unwrap();
        assert_eq!((report.important, report.skipped, report.written), (1, 1, 0));
        assert!(rows(&c).is_empty());

        let report = c.run_cycle_at(ts()).unwrap();
        assert_eq!(report.written, 0);
    }

    #[test]
    fn one_failure_does_not_suppress_later_processes() {
        let dir = tempfile::tempdir().unwrap();
        let c = cycle(
            &dir,
            PortMap::new(),
            FixedInventory::new(vec![
                snap(1, "node"),
                snap(2, "nginx"),
                snap(3, "redis-server"),
                snap(4, "bash"),
            ]),
            FixedSampler::new()
                .with_sample(1, 0.1, 1024)
                .with_error(2, SampleError::PermissionDenied { pid: 2 })
                .with_sample(3, 0.3, 2048),
        );
        let report = c.run_cycle_at(ts()).unwrap();
        assert_eq!((report.important, report.skipped, report.written), (3, 1, 2));
        let pids: Vec<String> = rows(&c)
            .iter()
            .map(|r| r.split(',').nth(2).unwrap().to_string())
            .collect();
        assert_eq!(pids, vec!["1", "3"]);
    }

    #[test]
    fn empty_socket_map_leaves_port_blank() {
        let dir = tempfile::tempdir().unwrap();
        let c = cycle(
            &dir,
            PortMap::new(),
            FixedInventory::new(vec![snap(100, "nginx"), snap(101, "node")]),
            FixedSampler::new()
                .with_sample(100, 0.0, 0)
                .with_sample(101, 0.0, 0),
        );
        assert_eq!(c.run_cycle_at(ts()).unwrap().written, 2);
        assert!(rows(&c).iter().all(|r| r.split(',').nth(1) == Some("")));
    }

    #[test]
    fn all_rows_share_cycle_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let procs: Vec<_> = (1..=20).map(|pid| snap(pid, "node")).collect();
        let sampler = (1..=20).fold(FixedSampler::new(), |s, pid| s.with_sample(pid, 1.0, 1));
        let c = cycle(&dir, PortMap::new(), FixedInventory::new(procs), sampler);
        let report = c.run_cycle().unwrap();
        let expected = format_timestamp(&report.timestamp);
        let rows = rows(&c);
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|r| r.split(',').next() == Some(expected.as_str())));
    }

    /// Records calls so the refresh-then-sample order can be checked.
    #[derive(Default)]
    struct RecordingSampler {
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl ResourceSampler for RecordingSampler {
        fn prepare(&self, pids: &[u32]) {
            self.calls.lock().unwrap().push(format!("prepare {pids:?}"));
        }

        fn sample(&self, pid: u32) -> std::result::Result<ResourceSample, SampleError> {
            self.calls.lock().unwrap().push(format!("sample {pid}"));
            Ok(ResourceSample {
                cpu_percent: 0.0,
                memory_bytes: 0,
            })
        }
    }

    #[test]
    fn sampler_is_prepared_once_with_important_pids() {
        let dir = tempfile::tempdir().unwrap();
        let sampler = Arc::new(RecordingSampler::default());
        struct Shared(Arc<RecordingSampler>);
        impl ResourceSampler for Shared {
            fn prepare(&self, pids: &[u32]) {
                self.0.prepare(pids)
            }
            fn sample(&self, pid: u32) -> std::result::Result<ResourceSample, SampleError> {
                self.0.sample(pid)
            }
        }
        let c = CollectionCycle::new(
            Box::new(FixedSockets::default()),
            Box::new(FixedInventory::new(vec![
                snap(1, "node"),
                snap(2, "bash"),
                snap(3, "nginx"),
            ])),
            Box::new(Shared(Arc::clone(&sampler))),
            ImportanceFilter::new(["nginx", "node"]),
            Arc::new(CsvStore::open(dir.path().join("log.csv")).unwrap()),
        );
        c.run_cycle_at(ts()).unwrap();
        assert_eq!(
            *sampler.calls.lock().unwrap(),
            vec!["prepare [1, 3]", "sample 1", "sample 3"]
        );
    }

    #[test]
    fn inventory_failure_aborts_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let c = cycle(
            &dir,
            PortMap::from([(80, 1)]),
            FixedInventory::failing(),
            FixedSampler::new().with_sample(1, 1.0, 1),
        );
        assert!(matches!(c.run_cycle_at(ts()), Err(PortwatchError::Platform { .. })));
        assert!(rows(&c).is_empty());
    }
}
