use std::{num::NonZeroUsize, time::Instant};

use framedup_common::utils::workers::{scoped_workers, FinishedWorker};

use crate::{
    args::SweepArgs,
    frame_store::{FrameId, FrameStore, StoreError},
    report::PartitionReport,
    sweeper::{sweep, SweepError},
};

#[derive(thiserror::Error, Debug)]
pub enum PartitionFailure {
    #[error("worker '{worker}' returned an error")]
    Errored {
        worker: String,
        #[source]
        error: SweepError,
    },
    #[error("worker '{worker}' panicked with: {message}")]
    Panicked { worker: String, message: String },
}

impl PartitionFailure {
    pub fn worker(&self) -> &str {
        match self {
            PartitionFailure::Errored { worker, .. } => worker,
            PartitionFailure::Panicked { worker, .. } => worker,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("failed to list the frames")]
    List(#[from] StoreError),
    #[error("{} of the partitions failed", .0.len())]
    Partitions(Vec<PartitionFailure>),
}

/// The number of workers to use when nothing else is said
pub fn default_workers() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or_else(|e| {
        log::warn!("Could not figure out the available parallelism, using one worker: {e}");
        NonZeroUsize::MIN
    })
}

/// Splits `items` into exactly `workers` contiguous slices. All but the last have the
/// same length, the last one also gets the remainder.
pub fn partition<T>(items: &[T], workers: NonZeroUsize) -> Vec<&[T]> {
    let workers = workers.get();
    let base = items.len() / workers;
    (0..workers)
        .map(|i| {
            let start = i * base;
            let end = if i == workers - 1 {
                items.len()
            } else {
                start + base
            };
            &items[start..end]
        })
        .collect()
}

/// Sweeps every partition of `frames` in its own worker thread and waits for all of them.
///
/// A failing worker does not stop the others, every partition is swept to completion.
/// Frames removed by successful workers stay removed even if the run as a whole fails.
pub fn run_partitions<S: FrameStore + ?Sized>(
    store: &S,
    frames: &[FrameId],
    workers: NonZeroUsize,
    args: &SweepArgs,
) -> Result<Vec<PartitionReport>, RunError> {
    let partitions = partition(frames, workers);
    log::info!(
        "Sweeping {} frames with {} workers, {} frames each",
        frames.len(),
        partitions.len(),
        frames.len() / partitions.len(),
    );

    let before = Instant::now();
    let finished = scoped_workers(|s| {
        for part in partitions.iter().copied() {
            s.spawn("S", move || sweep(store, part, args).map(|outcome| (part, outcome)));
        }
    });
    log::info!(
        "All workers finished in {}",
        humantime::Duration::from(before.elapsed())
    );

    let mut reports = Vec::with_capacity(finished.len());
    let mut failures = Vec::new();
    for FinishedWorker { name, result } in finished {
        match result {
            Err(panic) => {
                log::error!("Worker '{name}' panicked with: {panic}");
                failures.push(PartitionFailure::Panicked {
                    worker: name,
                    message: panic.message(),
                });
            }
            Ok(Err(e)) => {
                log::error!("Worker '{name}' returned an error: {e:?}");
                failures.push(PartitionFailure::Errored {
                    worker: name,
                    error: e,
                });
            }
            Ok(Ok((part, outcome))) => reports.push(PartitionReport::new(name, part, outcome)),
        }
    }

    if failures.is_empty() {
        Ok(reports)
    } else {
        Err(RunError::Partitions(failures))
    }
}

/// Lists the frames of the store and sweeps them
pub fn dedup<S: FrameStore + ?Sized>(
    store: &S,
    workers: NonZeroUsize,
    args: &SweepArgs,
) -> Result<Vec<PartitionReport>, RunError> {
    let frames = store.list()?;
    log::info!("Found {} frames", frames.len());
    run_partitions(store, &frames, workers, args)
}
