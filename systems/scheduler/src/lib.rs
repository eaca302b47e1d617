#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Row scheduler that fans generation work out across scoped threads.
//!
//! A scheduling round partitions `[0, total_rows)` into contiguous chunks of
//! near-equal size, spawns one execution unit per chunk, and joins every unit
//! before returning. Units report their outcome into a per-unit slot; the
//! first failure in row order is returned to the caller once all units have
//! finished, so a failed round is never mistaken for a complete one.

use std::{any::Any, fmt, num::NonZeroUsize, sync::Arc, thread};

use life_core::RowRange;
use log::{debug, warn};
use thiserror::Error;

/// Boxed error produced by a failing worker.
pub type WorkerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced after a scheduling round has joined every unit.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The worker for a chunk returned an error.
    #[error("worker for rows {range} failed")]
    Worker {
        /// Rows assigned to the failing unit.
        range: RowRange,
        /// Error returned by the worker.
        #[source]
        source: WorkerError,
    },
    /// The worker for a chunk panicked.
    #[error("worker for rows {range} panicked: {message}")]
    Panicked {
        /// Rows assigned to the panicking unit.
        range: RowRange,
        /// Panic payload rendered as text.
        message: String,
    },
    /// The operating system refused to spawn a unit for a chunk.
    #[error("could not spawn worker for rows {range}")]
    Spawn {
        /// Rows that could not be dispatched.
        range: RowRange,
        /// Error reported by the thread builder.
        #[source]
        source: std::io::Error,
    },
}

impl ScheduleError {
    /// Rows assigned to the unit that caused the failure.
    #[must_use]
    pub fn range(&self) -> RowRange {
        match self {
            Self::Worker { range, .. } | Self::Panicked { range, .. } | Self::Spawn { range, .. } => {
                *range
            }
        }
    }
}

/// Terminal state of one chunk within a scheduling round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The worker returned successfully.
    Completed,
    /// The worker returned an error.
    Failed,
    /// The worker panicked.
    Panicked,
    /// No unit could be spawned for the chunk.
    NotSpawned,
}

impl From<&Result<(), ScheduleError>> for ChunkOutcome {
    fn from(result: &Result<(), ScheduleError>) -> Self {
        match result {
            Ok(()) => Self::Completed,
            Err(ScheduleError::Worker { .. }) => Self::Failed,
            Err(ScheduleError::Panicked { .. }) => Self::Panicked,
            Err(ScheduleError::Spawn { .. }) => Self::NotSpawned,
        }
    }
}

/// Hook notified as chunks move through a scheduling round.
///
/// `chunk_dispatched` is called on the scheduling thread in row order before
/// the unit starts. `chunk_finished` is called on the scheduling thread after
/// the unit has been joined.
pub trait ScheduleObserver: Send + Sync + fmt::Debug {
    /// Invoked before the unit for `range` is spawned.
    fn chunk_dispatched(&self, _index: usize, _range: RowRange) {}

    /// Invoked once the unit for `range` has been joined.
    fn chunk_finished(&self, _index: usize, _range: RowRange, _outcome: ChunkOutcome) {}
}

/// Observer that reports partitions and failures through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl ScheduleObserver for LogObserver {
    fn chunk_dispatched(&self, index: usize, range: RowRange) {
        debug!("chunk {index}: rows {range} ({} rows) dispatched", range.len());
    }

    fn chunk_finished(&self, index: usize, range: RowRange, outcome: ChunkOutcome) {
        if outcome == ChunkOutcome::Completed {
            debug!("chunk {index}: rows {range} completed");
        } else {
            warn!("chunk {index}: rows {range} ended with {outcome:?}");
        }
    }
}

/// Partitions rows across scoped execution units and joins them.
#[derive(Clone, Debug)]
pub struct RowScheduler {
    parallelism: usize,
    observer: Arc<dyn ScheduleObserver>,
}

impl RowScheduler {
    /// Creates a scheduler sized by the platform's available parallelism.
    #[must_use]
    pub fn new() -> Self {
        let parallelism = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_parallelism(parallelism)
    }

    /// Creates a scheduler that never runs more than `parallelism` units at once.
    ///
    /// A hint of zero is treated as one.
    #[must_use]
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
            observer: Arc::new(LogObserver),
        }
    }

    /// Replaces the observer notified during scheduling rounds.
    #[must_use]
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: ScheduleObserver + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    /// Upper bound on the number of units spawned per round.
    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Number of units a round over `total_rows` rows spawns.
    #[must_use]
    pub fn workers_for(&self, total_rows: usize) -> usize {
        self.parallelism.min(total_rows)
    }

    /// Computes the chunks a round over `total_rows` rows dispatches.
    #[must_use]
    pub fn partition(&self, total_rows: usize) -> Vec<RowRange> {
        partition_rows(total_rows, self.parallelism)
    }

    /// Runs `worker` once per chunk of `[0, total_rows)` and joins every unit.
    ///
    /// Returns the first failure in row order after all units have finished.
    pub fn run<F, E>(&self, total_rows: usize, worker: F) -> Result<(), ScheduleError>
    where
        F: Fn(RowRange) -> Result<(), E> + Sync,
        E: Into<WorkerError>,
    {
        let tasks: Vec<(RowRange, ())> = self
            .partition(total_rows)
            .into_iter()
            .map(|range| (range, ()))
            .collect();
        self.dispatch(tasks, |range, ()| worker(range))
    }

    /// Runs `worker` once per chunk of rows stored in `buffer`.
    ///
    /// `buffer` holds whole rows of `row_len` elements. Each unit receives
    /// the row range it owns together with the disjoint sub-slice backing
    /// exactly those rows. Panics when `row_len` is zero or `buffer` does not
    /// hold a whole number of rows.
    pub fn run_rows_mut<T, F, E>(
        &self,
        buffer: &mut [T],
        row_len: usize,
        worker: F,
    ) -> Result<(), ScheduleError>
    where
        T: Send,
        F: Fn(RowRange, &mut [T]) -> Result<(), E> + Sync,
        E: Into<WorkerError>,
    {
        assert!(row_len > 0, "rows must contain at least one element");
        assert_eq!(
            buffer.len() % row_len,
            0,
            "buffer must hold a whole number of rows"
        );

        let total_rows = buffer.len() / row_len;
        let mut remaining = buffer;
        let mut tasks = Vec::new();
        for range in self.partition(total_rows) {
            let (chunk, rest) = std::mem::take(&mut remaining).split_at_mut(range.len() * row_len);
            tasks.push((range, chunk));
            remaining = rest;
        }

        self.dispatch(tasks, worker)
    }

    fn dispatch<P, F, E>(&self, tasks: Vec<(RowRange, P)>, worker: F) -> Result<(), ScheduleError>
    where
        P: Send,
        F: Fn(RowRange, P) -> Result<(), E> + Sync,
        E: Into<WorkerError>,
    {
        let worker = &worker;
        let observer = &*self.observer;

        let outcomes: Vec<Result<(), ScheduleError>> = thread::scope(|scope| {
            let mut units = Vec::with_capacity(tasks.len());
            for (index, (range, payload)) in tasks.into_iter().enumerate() {
                observer.chunk_dispatched(index, range);
                let spawned = thread::Builder::new()
                    .name(format!("life-rows-{index}"))
                    .spawn_scoped(scope, move || -> Result<(), WorkerError> {
                        worker(range, payload).map_err(Into::into)
                    });
                let failed = spawned.is_err();
                units.push((index, range, spawned));
                if failed {
                    break;
                }
            }

            units
                .into_iter()
                .map(|(index, range, spawned)| {
                    let result = match spawned {
                        Ok(handle) => match handle.join() {
                            Ok(Ok(())) => Ok(()),
                            Ok(Err(source)) => Err(ScheduleError::Worker { range, source }),
                            Err(payload) => Err(ScheduleError::Panicked {
                                range,
                                message: panic_message(payload.as_ref()),
                            }),
                        },
                        Err(source) => Err(ScheduleError::Spawn { range, source }),
                    };
                    observer.chunk_finished(index, range, ChunkOutcome::from(&result));
                    result
                })
                .collect()
        });

        match outcomes.into_iter().find_map(Result::err) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for RowScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `[0, total_rows)` into `min(workers, total_rows)` contiguous chunks.
///
/// Every chunk holds `total_rows / n` rows and the first `total_rows % n`
/// chunks hold one more, so sizes differ by at most one. Chunks are returned
/// in row order. A `workers` value of zero is treated as one.
#[must_use]
pub fn partition_rows(total_rows: usize, workers: usize) -> Vec<RowRange> {
    let chunks = workers.max(1).min(total_rows);
    if chunks == 0 {
        return Vec::new();
    }

    let base = total_rows / chunks;
    let extra = total_rows % chunks;
    let mut start = 0;
    (0..chunks)
        .map(|index| {
            let len = base + usize::from(index < extra);
            let range = RowRange::new(start, start + len);
            start += len;
            range
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
