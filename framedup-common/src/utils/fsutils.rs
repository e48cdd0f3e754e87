use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// What happened when trying to remove a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    Now,
    AlreadyGone,
}

/// Removes the file at path. A file that is already gone counts as success, so this can
/// be called any number of times on the same path.
pub fn remove_file_idempotent(path: impl AsRef<Path>) -> io::Result<Removed> {
    match fs::remove_file(path) {
        Ok(()) => Ok(Removed::Now),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removed::AlreadyGone),
        Err(e) => Err(e),
    }
}

/// Collects all regular files directly inside the given directory, does not walk it
/// recursively. Symlinks are followed.
pub fn all_files<R>(dir: impl AsRef<Path>) -> io::Result<R>
where
    R: FromIterator<PathBuf>,
{
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files.into_iter().collect())
}

/// Try to read the file, return None if it doesn't exist
pub fn read_optional_file(path: impl AsRef<Path>) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
        Ok(s) => Ok(Some(s)),
    }
}
