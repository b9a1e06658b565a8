//! Worker pool (C5, §4.5).
//!
//! Off-thread execution of the analysis kernel on immutable snapshots.
//! Completion order is not guaranteed to match submission order — the
//! channel only preserves FIFO *within* a single worker, and with `p > 1`
//! workers race each other to finish.
//!
//! Overload policy (documented per §4.5): submissions never block or fail.
//! The producer's dispatch rate is bounded by `time_interval_ms` (typically
//! ~100ms), so an unbounded queue is acceptable and is what this pool uses.

use std::thread::JoinHandle;

use rotascope_common::model::RotationResult;

use crate::kernel::{self, KernelParams};
use crate::window::Dispatch;

/// Pool of analysis-kernel worker threads.
pub struct WorkerPool {
    submit_tx: crossbeam_channel::Sender<Dispatch>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` (>= 1) worker threads, each running the kernel
    /// with the given parameters and publishing results to `result_tx`.
    pub fn new(
        worker_count: usize,
        params: KernelParams,
        result_tx: crossbeam_channel::Sender<RotationResult>,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let (submit_tx, submit_rx) = crossbeam_channel::unbounded::<Dispatch>();

        let handles = (0..worker_count)
            .map(|id| {
                let submit_rx = submit_rx.clone();
                let result_tx = result_tx.clone();
                let params = params;
                std::thread::Builder::new()
                    .name(format!("rotascope-worker-{id}"))
                    .spawn(move || {
                        while let Ok(dispatch) = submit_rx.recv() {
                            let result =
                                kernel::analyze(&dispatch.snapshot, dispatch.trace_id, &params);
                            if result_tx.send(result).is_err() {
                                break;
                            }
                        }
                    })
                    .expect("failed to spawn analysis worker thread")
            })
            .collect();

        Self { submit_tx, handles }
    }

    /// Submit a snapshot for analysis. Never blocks.
    pub fn submit(&self, dispatch: Dispatch) {
        // An unbounded channel send only fails if every receiver has been
        // dropped, i.e. the pool is already shut down.
        let _ = self.submit_tx.send(dispatch);
    }

    /// Close the pool: stop accepting submissions and join every worker.
    pub fn shutdown(self) {
        drop(self.submit_tx);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotascope_common::calibration::SensorRegistry;
    use rotascope_common::model::{Orientation, Snapshot};

    fn params() -> KernelParams {
        KernelParams {
            time_delta_ms: 40,
            orientation: Orientation::default(),
            profile: *SensorRegistry::default().get("am3x-1.5g").unwrap(),
        }
    }

    #[test]
    fn submitted_snapshots_produce_results() {
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let pool = WorkerPool::new(2, params(), result_tx);

        for trace_id in 0..5 {
            pool.submit(Dispatch { snapshot: Snapshot::new(), trace_id });
        }

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(result_rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap());
        }
        assert_eq!(seen.len(), 5);
        // Empty snapshots always yield the sentinel.
        assert!(seen.iter().all(|r| r.direction == 0 && r.rps == 0.0));

        pool.shutdown();
    }
}
