//! The watch target: a directory subtree to monitor.

use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};

/// A directory subtree to watch.
///
/// Holds the directory path plus whether subdirectories are included. The
/// target is fixed when the notifier is constructed and immutable for the
/// notifier's lifetime.
///
/// # Examples
///
/// ```rust
/// use treewatch::target::WatchTarget;
///
/// // Recursive by default
/// let target = WatchTarget::new("/tmp/watched");
/// assert!(target.is_recursive());
///
/// // Direct children only
/// let shallow = WatchTarget::new("/tmp/watched").recursive(false);
/// assert!(!shallow.is_recursive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchTarget {
    path: PathBuf,
    recursive: bool,
}

impl WatchTarget {
    /// Create a target watching `path` and all of its subdirectories.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
        }
    }

    /// Set whether subdirectories are included in the watch.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// The watched directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether subdirectories are included.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Verify that the target names an existing directory.
    pub(crate) fn validate(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| WatchError::InvalidTarget {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if !metadata.is_dir() {
            return Err(WatchError::InvalidTarget {
                path: self.path.clone(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(())
    }
}
