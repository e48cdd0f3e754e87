use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use image::RgbImage;

pub const BINS: usize = 256;

/// Which color channel of the RGB decoding a histogram is computed over
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// The default, red. It is the third channel when a frame is decoded in BGR order,
    /// as video tooling usually does.
    pub const DEFAULT: Self = Channel::Red;

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        write!(f, "{name}")
    }
}

/// A distance between two histograms, always within `[0, 1]`. Zero means the same
/// distribution.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Distance(f64);

#[derive(thiserror::Error, Debug)]
#[error("not a valid distance, must be a number between 0 and 1")]
pub struct DistanceError;

impl Distance {
    pub const ZERO: Self = Distance(0.0);
    pub const MAX: Self = Distance(1.0);
    pub const DEFAULT_THRESHOLD: Self = Distance(0.3);

    pub fn new(float: f64) -> Result<Self, DistanceError> {
        if (0.0..=1.0).contains(&float) {
            Ok(Distance(float))
        } else {
            Err(DistanceError)
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl From<Distance> for f64 {
    fn from(value: Distance) -> Self {
        value.as_f64()
    }
}

impl TryFrom<f64> for Distance {
    type Error = DistanceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Distance {
    type Err = DistanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num: f64 = s.trim().parse().map_err(|_| DistanceError)?;
        Self::new(num)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("could not decode {path:?} as an image")]
pub struct DecodeError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Pixel counts per intensity of one color channel
#[derive(Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
}

impl Histogram {
    pub fn from_bins(bins: [u64; BINS]) -> Self {
        Self { bins }
    }

    pub fn from_image(img: &RgbImage, channel: Channel) -> Self {
        let channel = channel.index();
        let mut bins = [0; BINS];
        img.pixels().for_each(|pixel| {
            let i: usize = pixel[channel].into();
            bins[i] += 1;
        });
        Self { bins }
    }

    pub fn bins(&self) -> &[u64; BINS] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Bhattacharyya distance between the normalized distributions. Two empty histograms
    /// are considered the same, an empty one is as far away as possible from a non-empty
    /// one.
    pub fn distance_to(&self, other: &Histogram) -> Distance {
        let total_self = self.total() as f64;
        let total_other = other.total() as f64;

        match (total_self == 0.0, total_other == 0.0) {
            (true, true) => return Distance::ZERO,
            (true, false) | (false, true) => return Distance::MAX,
            (false, false) => (),
        }

        let coefficient: f64 = self
            .bins
            .iter()
            .zip(other.bins.iter())
            .map(|(&a, &b)| (a as f64 * b as f64).sqrt())
            .sum();

        let normalized = coefficient / (total_self * total_other).sqrt();
        let dist = (1.0 - normalized).max(0.0).sqrt();
        Distance(dist.min(1.0))
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NOTE: most bins are usually zero, no need to print all 256 of them
        let nonzero: Vec<(usize, u64)> = self
            .bins
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, count)| *count != 0)
            .collect();
        f.debug_struct("Histogram").field("nonzero", &nonzero).finish()
    }
}

pub fn open_rgb(path: &Path) -> Result<RgbImage, DecodeError> {
    match image::open(path) {
        Ok(img) => Ok(img.to_rgb8()),
        Err(source) => Err(DecodeError {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Opens the image at `path` and computes its histogram
pub fn compute_histogram(path: &Path, channel: Channel) -> Result<Histogram, DecodeError> {
    let img = open_rgb(path)?;
    Ok(Histogram::from_image(&img, channel))
}
