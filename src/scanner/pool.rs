//! Bounded worker pool.
//!
//! A fixed number of worker tasks pull targets from a queue seeded with the
//! whole input list, probe them, and publish `(index, target, outcome)` on a
//! single channel. The collector drains that channel until every target has
//! reported, then joins the workers. Results come back in input order no
//! matter which probe finished first.

use super::cancel::CancelToken;
use super::sink::OutcomeSink;
use super::traits::{Probe, ProbeOutcome, Probed};
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Message recorded for targets whose worker vanished without reporting.
const LOST_WORKER: &str = "worker exited before reporting";

/// Returned when a run is cancelled before every target reported.
#[derive(Debug)]
pub struct Interrupted<T> {
    /// Outcomes collected before cancellation, in input order.
    pub partial: Vec<Probed<T>>,
    /// Number of targets submitted.
    pub total: usize,
}

/// Why a run ended without one outcome per target.
#[derive(Debug)]
pub enum PoolError<T> {
    /// The caller cancelled the run.
    Interrupted(Interrupted<T>),
    /// Some targets were lost without any outcome.
    Incomplete { collected: usize, total: usize },
}

struct Task<T> {
    index: usize,
    target: T,
}

/// Shared queue of not-yet-started tasks. Workers only ever pop.
struct TaskQueue<T> {
    tasks: Mutex<VecDeque<Task<T>>>,
}

impl<T> TaskQueue<T> {
    fn seeded(targets: Vec<T>) -> Self {
        let tasks = targets
            .into_iter()
            .enumerate()
            .map(|(index, target)| Task { index, target })
            .collect();
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    fn pop(&self) -> Option<Task<T>> {
        // Nothing panics while the lock is held, so a poisoned queue is still intact.
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Runs one probe kind over a target list with at most `workers` probes in
/// flight.
pub struct WorkerPool<P: Probe> {
    probe: Arc<P>,
    workers: NonZeroUsize,
    timeout: Duration,
    cancel: CancelToken,
    sink: Arc<dyn OutcomeSink>,
}

impl<P: Probe + 'static> WorkerPool<P> {
    /// Create a pool around `probe`.
    pub fn new(
        probe: P,
        workers: NonZeroUsize,
        timeout: Duration,
        cancel: CancelToken,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        Self {
            probe: Arc::new(probe),
            workers,
            timeout,
            cancel,
            sink,
        }
    }

    /// Probe every target and return exactly one outcome per target, in
    /// input order.
    ///
    /// On cancellation, workers stop taking targets, in-flight probes are
    /// dropped, all workers are joined, and the outcomes gathered so far are
    /// returned as [`PoolError::Interrupted`]. A run that cannot account for
    /// every target fails with [`PoolError::Incomplete`] instead of
    /// returning a short list.
    pub async fn run(
        self,
        targets: Vec<P::Target>,
    ) -> Result<Vec<Probed<P::Target>>, PoolError<P::Target>> {
        let total = targets.len();
        let kind = self.probe.kind();
        self.sink.begin(kind, total);

        let worker_count = self.workers.get().min(total);
        tracing::debug!("Dispatching {total} {kind} probes across {worker_count} workers");

        let queue = Arc::new(TaskQueue::seeded(targets));
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();

        let mut workers = JoinSet::new();
        for _ in 0..worker_count {
            workers.spawn(worker_loop(
                Arc::clone(&self.probe),
                Arc::clone(&queue),
                results_tx.clone(),
                Arc::clone(&self.sink),
                self.cancel.clone(),
                self.timeout,
            ));
        }
        // Only workers hold senders now; the channel closes when the last one exits.
        drop(results_tx);

        let mut slots: Vec<Option<Probed<P::Target>>> = (0..total).map(|_| None).collect();
        let mut received = 0;

        let cancelled = loop {
            if received == total {
                break false;
            }
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break true,
                message = results_rx.recv() => match message {
                    Some(probed) => {
                        if store(&mut slots, probed) {
                            received += 1;
                        }
                    }
                    None => break self.cancel.is_cancelled(),
                },
            }
        };

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("{kind} worker terminated abnormally: {e}");
            }
        }

        // Workers that finished a probe just before stopping may have reported.
        while let Ok(probed) = results_rx.try_recv() {
            if store(&mut slots, probed) {
                received += 1;
            }
        }

        self.sink.finish(kind);

        if cancelled && received < total {
            tracing::debug!("{kind} scan cancelled with {received}/{total} outcomes");
            return Err(PoolError::Interrupted(Interrupted {
                partial: slots.into_iter().flatten().collect(),
                total,
            }));
        }

        // A worker that died reported its in-flight target on the way out;
        // targets it never popped are still queued.
        let queue = match Arc::try_unwrap(queue) {
            Ok(queue) => queue.tasks.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(_) => VecDeque::new(),
        };
        let mut orphans: Vec<Option<P::Target>> = (0..total).map(|_| None).collect();
        for task in queue {
            orphans[task.index] = Some(task.target);
        }

        let results: Vec<Probed<P::Target>> = slots
            .into_iter()
            .zip(orphans)
            .enumerate()
            .filter_map(|(index, (slot, orphan))| {
                slot.or_else(|| {
                    orphan.map(|target| Probed {
                        index,
                        target,
                        outcome: ProbeOutcome::ProbeError {
                            message: LOST_WORKER.to_string(),
                        },
                    })
                })
            })
            .collect();

        if results.len() < total {
            tracing::error!(
                "{} {kind} targets were never reported",
                total - results.len()
            );
            return Err(PoolError::Incomplete {
                collected: results.len(),
                total,
            });
        }
        Ok(results)
    }
}

/// A popped task that has not reported yet.
///
/// Dropping it without [`complete`](Self::complete) or
/// [`abandon`](Self::abandon), e.g. while its worker unwinds, reports the
/// target as lost so the collector still gets exactly one outcome for it.
struct InFlight<'a, T> {
    task: Option<Task<T>>,
    results: &'a mpsc::UnboundedSender<Probed<T>>,
}

impl<'a, T> InFlight<'a, T> {
    fn new(task: Task<T>, results: &'a mpsc::UnboundedSender<Probed<T>>) -> Self {
        Self {
            task: Some(task),
            results,
        }
    }

    fn index(&self) -> Option<usize> {
        self.task.as_ref().map(|task| task.index)
    }

    fn target(&self) -> Option<&T> {
        self.task.as_ref().map(|task| &task.target)
    }

    /// Send the outcome. Returns `false` once the collector is gone.
    fn complete(mut self, outcome: ProbeOutcome) -> bool {
        match self.task.take() {
            Some(Task { index, target }) => self
                .results
                .send(Probed {
                    index,
                    target,
                    outcome,
                })
                .is_ok(),
            None => true,
        }
    }

    /// Drop the task without reporting; used when the run is cancelled.
    fn abandon(mut self) {
        self.task = None;
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if let Some(Task { index, target }) = self.task.take() {
            let _ = self.results.send(Probed {
                index,
                target,
                outcome: ProbeOutcome::ProbeError {
                    message: LOST_WORKER.to_string(),
                },
            });
        }
    }
}

/// Place a result in its slot. Returns `false` for an index that already
/// reported.
fn store<T>(slots: &mut [Option<Probed<T>>], probed: Probed<T>) -> bool {
    let index = probed.index;
    match slots.get_mut(index) {
        Some(slot) if slot.is_none() => {
            *slot = Some(probed);
            true
        }
        _ => {
            tracing::error!("Discarding duplicate outcome for target #{index}");
            false
        }
    }
}

async fn worker_loop<P: Probe>(
    probe: Arc<P>,
    queue: Arc<TaskQueue<P::Target>>,
    results: mpsc::UnboundedSender<Probed<P::Target>>,
    sink: Arc<dyn OutcomeSink>,
    cancel: CancelToken,
    timeout: Duration,
) {
    let kind = probe.kind();

    while !cancel.is_cancelled() {
        let Some(task) = queue.pop() else {
            break;
        };
        let in_flight = InFlight::new(task, &results);
        let (Some(index), Some(target)) = (in_flight.index(), in_flight.target()) else {
            break;
        };

        let outcome = tokio::select! {
            biased;
            // Dropping the probe future releases its socket or child process.
            _ = cancel.cancelled() => None,
            outcome = guarded(probe.as_ref(), target, timeout) => Some(outcome),
        };
        let Some(outcome) = outcome else {
            in_flight.abandon();
            break;
        };

        let recorded = panic::catch_unwind(AssertUnwindSafe(|| {
            sink.record(kind, target, &outcome)
        }));
        if recorded.is_err() {
            // The target's own Display may be what panicked; log by index.
            tracing::error!("Outcome sink panicked while recording {kind} target #{index}");
        }
        if !in_flight.complete(outcome) {
            break;
        }
    }
}

/// Run one probe, converting a panic into a [`ProbeOutcome::ProbeError`].
async fn guarded<P: Probe>(probe: &P, target: &P::Target, timeout: Duration) -> ProbeOutcome {
    AssertUnwindSafe(probe.probe(target, timeout))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| ProbeOutcome::ProbeError {
            message: panic_message(panic.as_ref()),
        })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "probe panicked".to_string()
    }
}
