use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use framedup::{
    args::SweepCli,
    histogram::{compute_histogram, Distance},
};
use framedup_common::bin_common::init::init_eyre;

#[derive(Parser)]
#[command()]
/// Prints the histogram distance between a reference image and other images, and whether
/// they would be considered duplicates of it
struct Cli {
    #[command(flatten)]
    sweep_args: SweepCli,

    /// The image to compare against
    reference: PathBuf,

    /// The images to compare
    #[arg(required = true)]
    others: Vec<PathBuf>,
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = Cli::parse();
    let args = cli.sweep_args.to_args();

    let reference = compute_histogram(&cli.reference, args.channel)
        .wrap_err_with(|| format!("Could not open {:?}", cli.reference))?;

    for other in cli.others {
        let hist = compute_histogram(&other, args.channel)
            .wrap_err_with(|| format!("Could not open {:?}", other))?;

        let dist = reference.distance_to(&hist);
        println!("{}", comparison_line(&other, dist, args.is_duplicate(dist)));
    }

    Ok(())
}

fn comparison_line(other: &Path, dist: Distance, is_duplicate: bool) -> String {
    let other = other.display();
    format!("{other}: distance={dist} (duplicate={is_duplicate})")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn line_format() {
        let dist = Distance::new(0.25).unwrap();
        assert_eq!(
            "frames/7.jpg: distance=0.25 (duplicate=true)",
            comparison_line(Path::new("frames/7.jpg"), dist, true)
        );
    }
}
