//! Working-directory helpers for the shell.
//!
//! All failures here are recoverable: they come back as values and the
//! shell turns them into messages.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Absolute form of `path` against the current directory, or the path
/// itself if the current directory cannot be resolved.
pub fn absolute(path: &Path) -> PathBuf {
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Change the process working directory. `false` when the path does not
/// exist or is not a directory.
pub fn change_dir(path: &Path) -> bool {
    env::set_current_dir(path).is_ok()
}

/// Create `path` and any missing parents.
pub fn make_dir(path: &Path) -> bool {
    fs::create_dir_all(path).is_ok()
}

/// Directories and plain files of `dir`, each sorted by name.
#[derive(Debug, Default)]
pub struct DirListing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

pub fn list_dir(dir: &Path) -> io::Result<DirListing> {
    let mut listing = DirListing::default();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            listing.dirs.push(name);
        } else if file_type.is_file() {
            listing.files.push(name);
        }
    }
    listing.dirs.sort();
    listing.files.sort();
    Ok(listing)
}
