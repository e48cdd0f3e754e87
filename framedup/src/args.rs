use std::time::Duration;

use framedup_common::args;

use crate::histogram::{Channel, Distance, Histogram};

args! {
    #[derive(Clone, Debug)]
    Sweep {
        "Frames closer than this histogram distance to an earlier kept frame are removed. \
         A distance of exactly this much is not a duplicate."
        similarity_threshold: Distance = Distance::DEFAULT_THRESHOLD;

        "Color channel the histograms are computed over"
        channel: Channel = Channel::DEFAULT;

        "Time between progress logs of each worker"
        progress_log_every: humantime::Duration = Duration::from_secs(10).into();
    }
}

args! {
    #[derive(Clone, Debug)]
    Frames {
        "File extension of the frames in the frame directory"
        frame_extension: String = "jpg".to_string();
    }
}

impl SweepArgs {
    pub fn is_duplicate(&self, dist: Distance) -> bool {
        dist < self.similarity_threshold
    }

    pub fn are_duplicates(&self, h1: &Histogram, h2: &Histogram) -> bool {
        self.is_duplicate(h1.distance_to(h2))
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        sweep: SweepCli,

        #[command(flatten)]
        frames: FramesCli,
    }

    fn just_below(dist: Distance) -> Distance {
        Distance::new(f64::from_bits(dist.as_f64().to_bits() - 1)).unwrap()
    }

    #[test]
    fn threshold_is_strict() {
        let args = SweepArgs::default();
        assert!(!args.is_duplicate(Distance::DEFAULT_THRESHOLD));
        assert!(args.is_duplicate(just_below(Distance::DEFAULT_THRESHOLD)));
        assert!(args.is_duplicate(Distance::ZERO));
        assert!(!args.is_duplicate(Distance::MAX));
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let args = SweepArgs::default().similarity_threshold(Distance::ZERO);
        assert!(!args.is_duplicate(Distance::ZERO));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["framedup"]).unwrap();
        let sweep = cli.sweep.to_args();
        assert_eq!(Distance::DEFAULT_THRESHOLD, sweep.similarity_threshold);
        assert_eq!(Channel::Red, sweep.channel);
        assert_eq!(Duration::from_secs(10), *sweep.progress_log_every);
        assert_eq!("jpg", cli.frames.to_args().frame_extension);
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from([
            "framedup",
            "--similarity-threshold",
            "0.25",
            "--channel",
            "blue",
            "--progress-log-every",
            "1m",
            "--frame-extension",
            "png",
        ])
        .unwrap();
        let sweep = cli.sweep.to_args();
        assert_eq!(Distance::new(0.25).unwrap(), sweep.similarity_threshold);
        assert_eq!(Channel::Blue, sweep.channel);
        assert_eq!(Duration::from_secs(60), *sweep.progress_log_every);
        assert_eq!("png", cli.frames.to_args().frame_extension);
    }

    #[test]
    fn cli_rejects_bad_threshold() {
        assert!(Cli::try_parse_from(["framedup", "--similarity-threshold", "1.5"]).is_err());
        assert!(Cli::try_parse_from(["framedup", "--channel", "alpha"]).is_err());
    }
}
