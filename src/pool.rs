//! Work-stealing trial pool (SPEC_FULL §5). Grounded on the teacher's
//! `src/engine_runner/engine_runner.rs` for the run-a-batch-of-trials shape
//! (generalized here from one sequential run to many parallel ones) and on
//! `nsg-ethz-bgpsim`'s declared `crossbeam` dependency for the channel-based
//! fan-out/fan-in; re-architected per SPEC_FULL §9's note against
//! process-fork-plus-pickled-graphs parallelism.
//!
//! Each worker holds its own deep copy of the `ASGraph`, so trials never
//! share mutable state; the only cross-thread communication is the bounded
//! work queue and the result queue. Results are collected in FIFO order of
//! *completion*, not submission — callers that need per-trial identity
//! should fold it into the `Trial` or pair it up themselves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::as_graph::ASGraph;
use crate::engine::{run_trial, Trial};
use crate::fraction::Fraction;
use crate::shared::NoRoute;

/// One trial's outcome: the success-rate fraction, or the `NoRoute` error
/// the hijack step hit trying to find an n-hop base.
pub type TrialOutcome = Result<Fraction, NoRoute>;

/// Cooperative stop flag: workers check it between trials (never
/// mid-trial), so an in-flight trial always completes. Clone and share with
/// a SIGINT handler to implement cancellation.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A fixed pool of `workers` threads, each with its own clone of `graph`,
/// draining a shared bounded queue of trials.
pub struct TrialPool {
    job_tx: Sender<(usize, Trial, usize)>,
    result_rx: Receiver<(usize, TrialOutcome)>,
    handles: Vec<thread::JoinHandle<()>>,
    stop: StopFlag,
}

impl TrialPool {
    /// `workers` worker threads, each deep-cloning `graph` once at
    /// construction. `queue_depth` bounds the job/result channels (callers
    /// pushing more trials than fit just block, same as a real bounded
    /// work queue).
    pub fn new(graph: &ASGraph, workers: usize, queue_depth: usize) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = bounded::<(usize, Trial, usize)>(queue_depth.max(1));
        let (result_tx, result_rx) = bounded::<(usize, TrialOutcome)>(queue_depth.max(1));
        let stop = StopFlag::new();

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let mut worker_graph = graph.clone();
            handles.push(thread::spawn(move || {
                while let Ok((id, trial, n_hops)) = job_rx.recv() {
                    let outcome = run_trial(&mut worker_graph, trial, n_hops);
                    if result_tx.send((id, outcome)).is_err() {
                        break;
                    }
                }
            }));
        }

        TrialPool {
            job_tx,
            result_rx,
            handles,
            stop,
        }
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Run every trial in `trials` (paired with `n_hops`) and return their
    /// outcomes in FIFO order of completion. Submission happens from this
    /// thread; workers drain concurrently. The submitter stops dispatching
    /// new trials as soon as the pool's stop flag is set — already-dispatched
    /// trials still run to completion and are included in the result, but
    /// anything after the stop point is simply never submitted.
    pub fn run_all(self, trials: &[(Trial, usize)]) -> Vec<TrialOutcome> {
        self.run_all_with_progress(trials, |_, _| {})
    }

    /// Same as `run_all`, but calls `on_result(done, total)` once per
    /// completed trial — the hook a long-running batch command uses to
    /// drive a progress bar without the pool needing to know what a
    /// progress bar is.
    pub fn run_all_with_progress(
        self,
        trials: &[(Trial, usize)],
        mut on_result: impl FnMut(usize, usize),
    ) -> Vec<TrialOutcome> {
        let job_tx = self.job_tx.clone();
        let stop = self.stop.clone();
        let total = trials.len();
        let trials_owned: Vec<(Trial, usize)> = trials.to_vec();
        let submitter = thread::spawn(move || {
            let mut submitted = 0usize;
            for (id, (trial, n_hops)) in trials_owned.into_iter().enumerate() {
                if stop.is_stopped() {
                    break;
                }
                if job_tx.send((id, trial, n_hops)).is_err() {
                    break;
                }
                submitted += 1;
            }
            submitted
        });

        let submitted = submitter.join().expect("submitter thread panicked");
        let mut results = Vec::with_capacity(submitted);
        for done in 0..submitted {
            match self.result_rx.recv() {
                Ok((_, outcome)) => {
                    results.push(outcome);
                    on_result(done + 1, total);
                }
                Err(_) => break,
            }
        }

        drop(self.job_tx);
        for handle in self.handles {
            let _ = handle.join();
        }
        results
    }
}

/// Worker count from the `PARALLELISM` environment variable, falling back
/// to the number of logical CPUs (SPEC_FULL §6's environment surface;
/// grounded on the teacher's `num_cpus` dependency, already used for this
/// exact fallback in `engine_runner.rs`).
pub fn parallelism_from_env() -> usize {
    std::env::var("PARALLELISM")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(num_cpus::get)
}
