// NOTE: every test will complain about the functions it doesn't use
#![allow(unused)]

use std::path::{Path, PathBuf};

use framedup::frame_store::{DirStore, FrameId, FrameStore};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// Returns cargo's tmpdir
pub fn cargo_tmpdir() -> PathBuf {
    PathBuf::from(option_env!("CARGO_TARGET_TMPDIR").expect("no cargo tmpdir???"))
}

/// A fresh and empty frame directory inside cargo's tmpdir
pub fn frames_dir() -> TempDir {
    tempfile::tempdir_in(cargo_tmpdir()).expect("could not create a temporary directory")
}

/// Writes a solid color frame. Frames with the same red value are at distance zero from
/// each other, frames with very different red values are at distance one.
pub fn write_frame(dir: &Path, id: FrameId, red: u8, extension: &str) {
    let img = RgbImage::from_pixel(16, 16, Rgb([red, 80, 40]));
    img.save(dir.join(format!("{id}.{extension}")))
        .expect("could not save the frame");
}

/// Writes frames `0..reds.len()` with the given red values
pub fn write_frames(dir: &Path, reds: &[u8], extension: &str) {
    for (id, &red) in reds.iter().enumerate() {
        write_frame(dir, id as FrameId, red, extension);
    }
}

pub fn surviving(dir: &Path, extension: &str) -> Vec<FrameId> {
    DirStore::new(dir, extension)
        .expect("it is a dir")
        .list()
        .expect("it can be listed")
}
