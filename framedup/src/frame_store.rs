use std::{
    collections::BTreeSet,
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use framedup_common::utils::fsutils::{self, Removed};
use image::RgbImage;

use crate::histogram::{self, DecodeError};

/// The ordering key of a frame, it is also its filename.
pub type FrameId = u64;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("the frame directory {0:?} is not a directory")]
    NotADir(PathBuf),
    #[error("failed to list the frames in {dir:?}")]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Somewhere frames can be read from and removed from.
///
/// Removal must be idempotent: removing something that is already gone is a success.
/// Workers share a store, but never operate on the same frames.
pub trait FrameStore: Sync {
    /// All frames, sorted ascending
    fn list(&self) -> Result<Vec<FrameId>, StoreError>;

    fn path(&self, id: FrameId) -> PathBuf;

    fn load(&self, id: FrameId) -> Result<RgbImage, DecodeError> {
        histogram::open_rgb(&self.path(id))
    }

    fn remove(&self, id: FrameId) -> io::Result<Removed>;
}

/// A directory of frames named `<id>.<extension>`
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
    extension: String,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(StoreError::NotADir(dir));
        }
        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_string();
        Ok(Self { dir, extension })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parses a frame id from a path, if it looks like one of ours. Only the canonical
    /// spelling of the number is accepted, `007.jpg` is not frame 7.
    fn frame_id(&self, path: &Path) -> Option<FrameId> {
        let extension = path.extension().and_then(OsStr::to_str)?;
        if extension != self.extension {
            return None;
        }

        let stem = path.file_stem().and_then(OsStr::to_str)?;
        let id: FrameId = stem.parse().ok()?;
        (id.to_string() == stem).then_some(id)
    }
}

impl FrameStore for DirStore {
    fn list(&self) -> Result<Vec<FrameId>, StoreError> {
        let files: Vec<PathBuf> =
            fsutils::all_files(&self.dir).map_err(|source| StoreError::List {
                dir: self.dir.clone(),
                source,
            })?;

        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            match self.frame_id(&file) {
                Some(id) => ids.push(id),
                None => log::debug!("Ignoring non-frame file: {}", file.display()),
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    fn path(&self, id: FrameId) -> PathBuf {
        self.dir.join(format!("{id}.{}", self.extension))
    }

    fn remove(&self, id: FrameId) -> io::Result<Removed> {
        fsutils::remove_file_idempotent(self.path(id))
    }
}

/// Wraps a store and only pretends to remove frames
#[derive(Debug)]
pub struct DryRun<S> {
    inner: S,
    removed: Mutex<BTreeSet<FrameId>>,
}

impl<S> DryRun<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            removed: Mutex::new(BTreeSet::new()),
        }
    }

    /// The frames that would have been removed
    pub fn removed(&self) -> BTreeSet<FrameId> {
        self.lock().clone()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<FrameId>> {
        // NOTE: a poisoned set of numbers is still a perfectly fine set of numbers
        self.removed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: FrameStore> FrameStore for DryRun<S> {
    fn list(&self) -> Result<Vec<FrameId>, StoreError> {
        self.inner.list()
    }

    fn path(&self, id: FrameId) -> PathBuf {
        self.inner.path(id)
    }

    fn load(&self, id: FrameId) -> Result<RgbImage, DecodeError> {
        self.inner.load(id)
    }

    fn remove(&self, id: FrameId) -> io::Result<Removed> {
        if self.lock().insert(id) {
            Ok(Removed::Now)
        } else {
            Ok(Removed::AlreadyGone)
        }
    }
}
