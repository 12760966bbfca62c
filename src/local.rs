//! A [`StorageClient`] over a directory of the local filesystem.

use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use crate::{FileStatus, IoReader, StorageClient};

/// Serves logical paths from files under a root directory.
///
/// Logical paths are absolute (`/a/b`) and resolve to `root/a/b`. Files on a
/// local disk are never partially written from the backend's point of view,
/// so every existing regular file reports as complete.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory logical paths resolve under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(name) => resolved.push(name),
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(io::Error::new(
                        ErrorKind::InvalidInput,
                        format!("path escapes storage root: {}", path.display()),
                    ));
                }
            }
        }
        Ok(resolved)
    }
}

impl StorageClient for LocalStorage {
    type Reader = IoReader<File>;

    fn open_file(&self, path: &Path) -> io::Result<Self::Reader> {
        let file = File::open(self.resolve(path)?)?;
        Ok(IoReader::new(file))
    }

    fn status(&self, path: &Path) -> io::Result<Option<FileStatus>> {
        let metadata = match std::fs::metadata(self.resolve(path)?) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        Ok(Some(FileStatus::completed(metadata.len())))
    }
}
