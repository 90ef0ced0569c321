//! Input file discovery
//!
//! Walks an input root recursively and collects the JSON files beneath
//! it. Paths are returned sorted so repeated runs visit files in the same
//! order and produce comparable logs.

use crate::constants::INPUT_EXTENSION;
use crate::error::{EtlError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component for one input root
#[derive(Debug)]
pub struct FileDiscovery {
    root: PathBuf,
    extension: String,
}

impl FileDiscovery {
    /// Discover `.json` files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: INPUT_EXTENSION.to_string(),
        }
    }

    /// Match a different file extension (without the dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect every matching file under the root, at any depth
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(EtlError::DirectoryNotFound {
                path: self.root.clone(),
            });
        }

        debug!(
            "Searching for .{} files in: {}",
            self.extension,
            self.root.display()
        );

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|source| EtlError::DirectoryTraversal {
                root: self.root.clone(),
                source,
            })?;

            if entry.file_type().is_file() && self.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }

        debug!("Found {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }
}
