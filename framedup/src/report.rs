use std::collections::BTreeSet;

use crate::{args::SweepArgs, frame_store::FrameId, histogram::Channel, sweeper::SweepOutcome};

/// A frame that was removed because it was too close to an earlier one
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Removal {
    pub reference: FrameId,
    pub removed: FrameId,
    pub distance: f64,
}

/// What one worker did with its partition
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartitionReport {
    pub worker: String,
    pub first: Option<FrameId>,
    pub last: Option<FrameId>,
    pub len: usize,
    pub comparisons: u64,
    pub removals: Vec<Removal>,
    /// Frames that should have been removed, but the removal failed
    pub failed_removals: Vec<FrameId>,
}

impl PartitionReport {
    pub fn new(worker: impl Into<String>, frames: &[FrameId], outcome: SweepOutcome) -> Self {
        Self {
            worker: worker.into(),
            first: frames.first().copied(),
            last: frames.last().copied(),
            len: frames.len(),
            comparisons: outcome.comparisons,
            removals: outcome.removals,
            failed_removals: outcome.failed_removals,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunReport {
    pub similarity_threshold: f64,
    pub channel: Channel,
    pub dry_run: bool,
    pub partitions: Vec<PartitionReport>,
}

impl RunReport {
    pub fn new(args: &SweepArgs, dry_run: bool, partitions: Vec<PartitionReport>) -> Self {
        Self {
            similarity_threshold: args.similarity_threshold.as_f64(),
            channel: args.channel,
            dry_run,
            partitions,
        }
    }

    /// Every frame that was removed, over all partitions
    pub fn removed(&self) -> BTreeSet<FrameId> {
        self.partitions
            .iter()
            .flat_map(|part| part.removals.iter().map(|rem| rem.removed))
            .collect()
    }

    pub fn total_frames(&self) -> usize {
        self.partitions.iter().map(|part| part.len).sum()
    }

    pub fn total_comparisons(&self) -> u64 {
        self.partitions.iter().map(|part| part.comparisons).sum()
    }

    pub fn total_failed_removals(&self) -> usize {
        self.partitions
            .iter()
            .map(|part| part.failed_removals.len())
            .sum()
    }
}

pub fn save_to(writer: impl std::io::Write, report: &RunReport) -> ron::Result<()> {
    let conf = ron::ser::PrettyConfig::new().struct_names(true);
    ron::ser::to_writer_pretty(writer, report, conf)
}

pub fn read_from(reader: impl std::io::Read) -> ron::error::SpannedResult<RunReport> {
    ron::de::from_reader(reader)
}

#[cfg(test)]
mod test {
    use super::*;

    fn report() -> RunReport {
        let outcome = |removals: Vec<Removal>| SweepOutcome {
            comparisons: 3,
            removals,
            failed_removals: vec![],
        };

        RunReport::new(
            &SweepArgs::default(),
            false,
            vec![
                PartitionReport::new(
                    "S00",
                    &[0, 1, 2],
                    outcome(vec![
                        Removal {
                            reference: 0,
                            removed: 1,
                            distance: 0.0,
                        },
                        Removal {
                            reference: 0,
                            removed: 2,
                            distance: 0.125,
                        },
                    ]),
                ),
                PartitionReport::new("S01", &[], outcome(vec![])),
            ],
        )
    }

    #[test]
    fn totals() {
        let report = report();
        assert_eq!(BTreeSet::from([1, 2]), report.removed());
        assert_eq!(3, report.total_frames());
        assert_eq!(6, report.total_comparisons());
        assert_eq!(0, report.total_failed_removals());
        assert_eq!(None, report.partitions[1].first);
    }

    #[test]
    fn ron_round_trip() {
        let report = report();
        let mut buf = Vec::new();
        save_to(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.contains("RunReport"));
        assert_eq!(report, read_from(buf.as_slice()).unwrap());
    }
}
