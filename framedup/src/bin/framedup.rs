use std::{
    ffi::OsString,
    fs::File,
    io::BufWriter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Instant,
};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use framedup::{
    args::{FramesCli, SweepArgs, SweepCli},
    frame_store::{DirStore, DryRun, FrameStore},
    partition::{default_workers, dedup, PartitionFailure, RunError},
    report::{self, RunReport},
};
use framedup_common::{
    bin_common::init::{init_eyre, init_logger},
    utils::fsutils::read_optional_file,
};

#[derive(Parser, Debug)]
#[command()]
/// Removes frames that are near duplicates of an earlier frame.
///
/// The frames are split evenly into one contiguous partition per worker, and duplicates
/// are only searched for within a partition.
struct Cli {
    #[command(flatten)]
    sweep_args: SweepCli,

    #[command(flatten)]
    frames_args: FramesCli,

    /// Number of workers, and thereby partitions. Defaults to the available parallelism
    #[arg(long, short = 'j')]
    workers: Option<NonZeroUsize>,

    /// Only report what would have been removed
    #[arg(long)]
    dry_run: bool,

    /// Write a report of what was removed to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value_t = log::LevelFilter::Info)]
    log_level: log::LevelFilter,

    /// The directory of frames, named like `<number>.<frame-extension>`
    frames_dir: PathBuf,
}

fn cli_arguments() -> eyre::Result<Cli> {
    const ARGS_FILE: &str = ".frameduprc";
    let mut args: Vec<OsString> = std::env::args_os().collect();

    if args.len() == 1 {
        if let Some(flags) = read_optional_file(ARGS_FILE)
            .wrap_err_with(|| format!("Could not read config file at: {ARGS_FILE}"))?
        {
            args.extend(
                flags
                    .split_whitespace()
                    .map(|s| std::ffi::OsStr::new(s).to_owned()),
            );
        }
    }

    Ok(Cli::parse_from(args))
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = cli_arguments()?;
    init_logger(cli.logfile.as_deref(), cli.log_level)?;

    log::debug!("CLI arguments: {cli:#?}");

    let sweep_args = cli.sweep_args.to_args();
    let frames_args = cli.frames_args.to_args();
    let workers = cli.workers.unwrap_or_else(default_workers);

    let store = DirStore::new(&cli.frames_dir, frames_args.frame_extension)
        .wrap_err("failed to open the frame directory")?;
    log::info!(
        "Deduplicating the frames in {} with {} workers",
        store.dir().display(),
        workers
    );

    let before = Instant::now();
    let report = if cli.dry_run {
        log::info!("Dry run, nothing will be removed");
        run(&DryRun::new(store), workers, &sweep_args, true)?
    } else {
        run(&store, workers, &sweep_args, false)?
    };

    log::info!(
        "Removed {} of {} frames in {}",
        report.removed().len(),
        report.total_frames(),
        humantime::Duration::from(before.elapsed())
    );
    if report.total_failed_removals() > 0 {
        log::warn!(
            "{} frames were duplicates but could not be removed",
            report.total_failed_removals()
        );
    }

    if let Some(path) = cli.report {
        write_report(&path, &report)
            .wrap_err_with(|| format!("failed to write the report to {}", path.display()))?;
        log::info!("Wrote the report to {}", path.display());
    }

    Ok(())
}

fn run<S: FrameStore>(
    store: &S,
    workers: NonZeroUsize,
    sweep_args: &SweepArgs,
    dry_run: bool,
) -> eyre::Result<RunReport> {
    match dedup(store, workers, sweep_args) {
        Ok(partitions) => Ok(RunReport::new(sweep_args, dry_run, partitions)),
        Err(RunError::Partitions(failures)) => Err(failure_summary(failures)),
        Err(e) => Err(e).wrap_err("the deduplication failed"),
    }
}

/// One report listing every failed partition together with its chain of causes
fn failure_summary(failures: Vec<PartitionFailure>) -> eyre::Report {
    let mut lines = vec!["Summary of partitions that failed:".to_string()];
    lines.extend(
        failures
            .into_iter()
            .map(|failure| format!("{:?}", eyre::Report::new(failure))),
    );
    eyre::eyre!(lines.join("\n"))
}

fn write_report(path: &Path, report: &RunReport) -> eyre::Result<()> {
    let file = File::create(path).wrap_err("could not create the file")?;
    report::save_to(BufWriter::new(file), report).wrap_err("could not serialize")?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::{io, path::PathBuf};

    use framedup::{histogram::DecodeError, sweeper::SweepError};

    use super::*;

    #[test]
    fn summary_keeps_the_causes() {
        let failures = vec![
            PartitionFailure::Errored {
                worker: "S00".to_string(),
                error: SweepError::Decode {
                    id: 4,
                    source: DecodeError {
                        path: PathBuf::from("4.jpg"),
                        source: image::ImageError::IoError(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "truncated jpeg",
                        )),
                    },
                },
            },
            PartitionFailure::Panicked {
                worker: "S01".to_string(),
                message: "oh no".to_string(),
            },
        ];

        let summary = format!("{:?}", failure_summary(failures));
        assert!(summary.contains("worker 'S00' returned an error"));
        assert!(summary.contains("failed to read frame 4"));
        assert!(summary.contains("truncated jpeg"));
        assert!(summary.contains("worker 'S01' panicked with: oh no"));
    }
}
