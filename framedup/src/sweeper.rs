//! The greedy forward sweep over one partition.
//!
//! Every frame, in order, acts as a reference and removes all later frames of the
//! partition that are closer to it than the threshold. This includes frames that were
//! themselves removed earlier in the sweep: they keep acting as references through
//! their cached histogram, so a chain of gradually changing frames collapses into its
//! first frame. Removed frames are never candidates again and are never loaded again.

use std::{
    collections::{hash_map::Entry, HashMap, HashSet},
    time::Instant,
};

use framedup_common::utils::{fsutils::Removed, time::Every};

use crate::{
    args::SweepArgs,
    frame_store::{FrameId, FrameStore},
    histogram::{DecodeError, Histogram},
    report::Removal,
};

#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("failed to read frame {id}")]
    Decode {
        id: FrameId,
        #[source]
        source: DecodeError,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepOutcome {
    pub comparisons: u64,
    pub removals: Vec<Removal>,
    pub failed_removals: Vec<FrameId>,
}

pub struct Sweeper<'a, S: ?Sized> {
    store: &'a S,
    args: &'a SweepArgs,
    cache: HashMap<FrameId, Histogram>,
    removed: HashSet<FrameId>,
    outcome: SweepOutcome,
}

impl<'a, S: FrameStore + ?Sized> Sweeper<'a, S> {
    pub fn new(store: &'a S, args: &'a SweepArgs) -> Self {
        Self {
            store,
            args,
            cache: HashMap::new(),
            removed: HashSet::new(),
            outcome: SweepOutcome::default(),
        }
    }

    /// Runs the sweep over `frames`, which must be sorted.
    pub fn sweep(mut self, frames: &[FrameId]) -> Result<SweepOutcome, SweepError> {
        let before = Instant::now();
        log::info!(
            "Sweeping {} frames{}",
            frames.len(),
            match (frames.first(), frames.last()) {
                (Some(first), Some(last)) => format!(" ({first}..={last})"),
                _ => String::new(),
            }
        );

        let mut log_every = Every::new(*self.args.progress_log_every);

        for (i, &kept) in frames.iter().enumerate() {
            log_every.perform(|| {
                log::info!(
                    "Progress: {}/{} frames, {} removed",
                    i + 1,
                    frames.len(),
                    self.removed.len()
                )
            });

            // NOTE: a removed reference was loaded as a candidate before it was removed, so
            // this is a cache hit. It is cloned out of the cache since candidates are
            // inserted into it while the reference is in use.
            let reference = self.histogram(kept)?.clone();

            for &candidate in &frames[i + 1..] {
                if self.removed.contains(&candidate) {
                    continue;
                }

                let distance = reference.distance_to(self.histogram(candidate)?);
                self.outcome.comparisons += 1;

                if self.args.is_duplicate(distance) {
                    log::debug!("Frame {candidate} is a duplicate of {kept} ({distance})");
                    self.remove(kept, candidate, distance.as_f64());
                }
            }
        }

        log::info!(
            "Removed {} of {} frames using {} comparisons in {}",
            self.removed.len(),
            frames.len(),
            self.outcome.comparisons,
            humantime::Duration::from(before.elapsed()),
        );

        Ok(self.outcome)
    }

    fn histogram(&mut self, id: FrameId) -> Result<&Histogram, SweepError> {
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let img = self
                    .store
                    .load(id)
                    .map_err(|source| SweepError::Decode { id, source })?;
                Ok(entry.insert(Histogram::from_image(&img, self.args.channel)))
            }
        }
    }

    fn remove(&mut self, reference: FrameId, id: FrameId, distance: f64) {
        // NOTE: the frame counts as removed even if the removal failed, it was judged a
        // duplicate all the same
        self.removed.insert(id);
        match self.store.remove(id) {
            Ok(Removed::Now) => (),
            Ok(Removed::AlreadyGone) => {
                log::debug!("Frame {id} was already gone");
            }
            Err(e) => {
                log::warn!("Failed to remove frame {id}: {e}");
                self.outcome.failed_removals.push(id);
                return;
            }
        }
        self.outcome.removals.push(Removal {
            reference,
            removed: id,
            distance,
        });
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Sweeps `frames` with a fresh cache
pub fn sweep<S: FrameStore + ?Sized>(
    store: &S,
    frames: &[FrameId],
    args: &SweepArgs,
) -> Result<SweepOutcome, SweepError> {
    Sweeper::new(store, args).sweep(frames)
}
