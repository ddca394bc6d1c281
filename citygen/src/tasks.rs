//! Fan-out/fan-in execution of generation batches.
//!
//! A batch is a list of jobs, each owning a value copy of its inputs. Jobs run
//! on scoped worker threads and talk to the coordinator only through channels:
//! one carries [`Status`] updates, the other `(partition, result)` pairs. The
//! coordinator forwards status to a [`ProgressSink`], waits for every worker
//! and returns results ordered by partition. Without the `threads` feature the
//! same jobs run in order on the calling thread.

use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    Roads,
    LaneGuides,
    Buildings,
    Trees,
    Corridor,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Roads => "road",
            TaskKind::LaneGuides => "lane guide",
            TaskKind::Buildings => "building",
            TaskKind::Trees => "tree",
            TaskKind::Corridor => "corridor",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub value: u64,
    pub max: u64,
}

/// Incremental update emitted while a batch runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<usize>,
}

impl Status {
    pub fn comment(text: impl Into<String>) -> Self {
        Self { comment: Some(text.into()), ..Self::default() }
    }

    pub fn progress(value: u64, max: u64) -> Self {
        Self { progress: Some(Progress { value, max }), ..Self::default() }
    }

    pub fn with_progress(mut self, value: u64, max: u64) -> Self {
        self.progress = Some(Progress { value, max });
        self
    }
}

/// Receiver of batch status on the coordinating side.
pub trait ProgressSink {
    fn report(&mut self, status: Status);
}

/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _status: Status) {}
}

impl ProgressSink for Vec<Status> {
    fn report(&mut self, status: Status) {
        self.push(status);
    }
}

impl ProgressSink for Sender<Status> {
    fn report(&mut self, status: Status) {
        // A dropped receiver only means nobody is listening anymore.
        let _ = self.send(status);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn report(&mut self, status: Status) {
        (**self).report(status);
    }
}

/// Worker-side handle for emitting status tagged with the job's partition.
#[derive(Clone, Debug)]
pub struct Reporter {
    tx: Sender<Status>,
    partition: usize,
}

impl Reporter {
    pub fn partition(&self) -> usize {
        self.partition
    }

    pub fn report(&self, mut status: Status) {
        status.partition = Some(self.partition);
        let _ = self.tx.send(status);
    }

    pub fn comment(&self, text: &str) {
        self.report(Status::comment(text));
    }

    pub fn progress(&self, value: u64, max: u64) {
        self.report(Status::progress(value, max));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskPool {
    max_workers: usize,
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

impl TaskPool {
    pub fn new(max_workers: usize) -> Self {
        Self { max_workers: max_workers.max(1) }
    }

    pub fn with_available_parallelism() -> Self {
        let n = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(n)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Worker count for `items` pieces of work: never more than the items.
    pub fn workers_for(&self, items: usize) -> usize {
        self.max_workers.min(items).max(1)
    }

    /// Contiguous, near-equal index ranges covering `0..len`.
    pub fn partition(&self, len: usize) -> Vec<Range<usize>> {
        if len == 0 {
            return Vec::new();
        }
        let parts = self.workers_for(len);
        (0..parts)
            .map(|i| (i * len / parts)..((i + 1) * len / parts))
            .collect()
    }

    /// Runs every job and returns their results in dispatch order.
    ///
    /// The first failing partition (by index) aborts the batch; any failure is
    /// reported as [`Error::WorkerFailure`] carrying `phase` and the partition.
    pub fn fan_out<J, R>(
        &self,
        phase: &'static str,
        jobs: Vec<J>,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<R>>
    where
        J: FnOnce(&Reporter) -> Result<R> + Send,
        R: Send,
    {
        debug!("{phase}: dispatching {} partition(s)", jobs.len());
        let slots = self.run_jobs(phase, jobs, sink);
        slots
            .into_iter()
            .enumerate()
            .map(|(partition, slot)| match slot {
                Some(Ok(r)) => Ok(r),
                Some(Err(e)) => Err(worker_failure(phase, partition, e)),
                None => Err(Error::WorkerFailure {
                    phase,
                    partition,
                    message: "worker exited without a result".into(),
                }),
            })
            .collect()
    }

    #[cfg(feature = "threads")]
    fn run_jobs<J, R>(
        &self,
        phase: &'static str,
        jobs: Vec<J>,
        sink: &mut dyn ProgressSink,
    ) -> Vec<Option<Result<R>>>
    where
        J: FnOnce(&Reporter) -> Result<R> + Send,
        R: Send,
    {
        use crossbeam_channel::select;

        let total = jobs.len();
        let mut slots: Vec<Option<Result<R>>> = (0..total).map(|_| None).collect();
        let (status_tx, status_rx) = unbounded::<Status>();
        let (result_tx, result_rx) = unbounded::<(usize, Result<R>)>();

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(total);
            for (partition, job) in jobs.into_iter().enumerate() {
                let reporter = Reporter { tx: status_tx.clone(), partition };
                let result_tx = result_tx.clone();
                let spawned = std::thread::Builder::new()
                    .name(format!("citygen-{phase}-{partition}"))
                    .spawn_scoped(scope, move || {
                        let out = job(&reporter);
                        let _ = result_tx.send((partition, out));
                    });
                match spawned {
                    Ok(handle) => handles.push((partition, handle)),
                    Err(e) => {
                        slots[partition] = Some(Err(Error::WorkerFailure {
                            phase,
                            partition,
                            message: format!("failed to spawn worker: {e}"),
                        }))
                    }
                }
            }
            drop(status_tx);
            drop(result_tx);

            loop {
                select! {
                    recv(result_rx) -> msg => match msg {
                        Ok((partition, out)) => slots[partition] = Some(out),
                        Err(_) => break,
                    },
                    recv(status_rx) -> msg => {
                        if let Ok(status) = msg {
                            sink.report(status);
                        }
                    }
                }
            }
            for status in status_rx.try_iter() {
                sink.report(status);
            }

            for (partition, handle) in handles {
                if let Err(payload) = handle.join() {
                    slots[partition] = Some(Err(Error::WorkerFailure {
                        phase,
                        partition,
                        message: panic_message(payload.as_ref()),
                    }));
                }
            }
        });
        slots
    }

    #[cfg(not(feature = "threads"))]
    fn run_jobs<J, R>(
        &self,
        _phase: &'static str,
        jobs: Vec<J>,
        sink: &mut dyn ProgressSink,
    ) -> Vec<Option<Result<R>>>
    where
        J: FnOnce(&Reporter) -> Result<R> + Send,
        R: Send,
    {
        let mut slots = Vec::with_capacity(jobs.len());
        for (partition, job) in jobs.into_iter().enumerate() {
            let (tx, rx) = unbounded::<Status>();
            let out = job(&Reporter { tx, partition });
            forward(&rx, sink);
            slots.push(Some(out));
        }
        slots
    }
}

#[cfg(not(feature = "threads"))]
fn forward(rx: &Receiver<Status>, sink: &mut dyn ProgressSink) {
    for status in rx.try_iter() {
        sink.report(status);
    }
}

#[cfg(feature = "threads")]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

fn worker_failure(phase: &'static str, partition: usize, e: Error) -> Error {
    match e {
        e @ Error::WorkerFailure { .. } => e,
        other => Error::WorkerFailure { phase, partition, message: other.to_string() },
    }
}

/// Set of task kinds currently running.
#[derive(Clone, Debug, Default)]
pub struct InFlight {
    running: Arc<Mutex<HashSet<TaskKind>>>,
}

impl InFlight {
    /// Claims `kind`, failing with [`Error::Busy`] while another run holds it.
    pub fn begin(&self, kind: TaskKind) -> Result<TaskTicket> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if !running.insert(kind) {
            return Err(Error::Busy(kind));
        }
        Ok(TaskTicket { kind, running: Arc::clone(&self.running) })
    }

    pub fn is_running(&self, kind: TaskKind) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&kind)
    }
}

/// Releases its task kind when dropped.
#[derive(Debug)]
pub struct TaskTicket {
    kind: TaskKind,
    running: Arc<Mutex<HashSet<TaskKind>>>,
}

impl TaskTicket {
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}

impl Drop for TaskTicket {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.kind);
    }
}

/// Worker pool plus the reject-while-busy guard. Clones share the guard.
#[derive(Clone, Debug, Default)]
pub struct Orchestrator {
    pool: TaskPool,
    in_flight: InFlight,
}

impl Orchestrator {
    pub fn new(pool: TaskPool) -> Self {
        Self { pool, in_flight: InFlight::default() }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Runs `f` while holding the ticket for `kind`.
    pub fn run<T>(&self, kind: TaskKind, f: impl FnOnce(&TaskPool) -> Result<T>) -> Result<T> {
        let _ticket = self.in_flight.begin(kind)?;
        info!("{kind} generation started");
        let out = f(&self.pool);
        if let Err(e) = &out {
            info!("{kind} generation failed: {e}");
        }
        out
    }
}

/// Collects status sent from another thread, e.g. for a UI polling loop.
pub fn status_channel() -> (Sender<Status>, Receiver<Status>) {
    unbounded()
}
