use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use crate::item::Attributes;

/// The four filesystem primitives a `FileService` is built on
pub trait Storage: Send + Sync {
    /// Immediate children of `dir` with their attributes, hidden entries excluded
    fn list(&self, dir: &Path) -> io::Result<Vec<(PathBuf, Attributes)>>;

    fn stat(&self, path: &Path) -> io::Result<Attributes>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Remove a file, or a directory with all of its contents
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Local filesystem storage
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn list(&self, dir: &Path) -> io::Result<Vec<(PathBuf, Attributes)>> {
        if !fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .skip_hidden(true)
            .follow_links(false)
            .sort(true)
            .parallelism(Parallelism::Serial);

        let mut children = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let message = e.to_string();
                e.into_io_error().unwrap_or_else(|| io::Error::other(message))
            })?;
            let path = entry.path();
            // Entries can vanish between readdir and stat
            match self.stat(&path) {
                Ok(attributes) => children.push((path, attributes)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping child that could not be stat'ed");
                }
            }
        }

        Ok(children)
    }

    fn stat(&self, path: &Path) -> io::Result<Attributes> {
        fs::metadata(path).map(|metadata| Attributes::from_metadata(&metadata))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}
