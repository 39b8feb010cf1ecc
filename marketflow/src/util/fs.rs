//! Filesystem helpers.

use std::io;
use std::path::{Path, PathBuf};

/// Creates a directory and all of its parents; succeeds if it already exists.
pub fn make_directory(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}
