//! The uniform change event type.

use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A normalized filesystem change event.
///
/// Watch providers translate their backend-specific notifications into this
/// single tagged type, so dispatch never depends on which mechanism
/// (inotify, FSEvents, polling) delivered the change. Each variant carries
/// the affected path(s) and whether the entry denotes a directory.
///
/// # Examples
///
/// ```rust
/// use treewatch::event::ChangeEvent;
/// use std::path::PathBuf;
///
/// let event = ChangeEvent::Created {
///     path: PathBuf::from("/watched/a.txt"),
///     is_dir: false,
/// };
/// assert_eq!(event.label(), "created");
/// assert!(!event.is_directory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeEvent {
    /// A new entry appeared under the watched tree.
    Created {
        /// The created path.
        path: PathBuf,
        /// Whether the path denotes a directory.
        is_dir: bool,
    },

    /// An entry was removed from the watched tree.
    Deleted {
        /// The removed path.
        path: PathBuf,
        /// Whether the path denoted a directory.
        is_dir: bool,
    },

    /// An entry's contents or metadata changed.
    Modified {
        /// The changed path.
        path: PathBuf,
        /// Whether the path denotes a directory.
        is_dir: bool,
    },

    /// An entry was renamed or moved within the watched tree.
    Moved {
        /// The path before the move.
        from: PathBuf,
        /// The path after the move.
        to: PathBuf,
        /// Whether the moved entry is a directory.
        is_dir: bool,
    },
}

impl ChangeEvent {
    /// The affected path.
    ///
    /// For [`ChangeEvent::Moved`] this is the pre-move path, matching how
    /// move notifications name the entry that left its old location.
    pub fn path(&self) -> &Path {
        match self {
            Self::Created { path, .. } | Self::Deleted { path, .. } | Self::Modified { path, .. } => {
                path
            }
            Self::Moved { from, .. } => from,
        }
    }

    /// Whether the affected entry is a directory.
    pub fn is_directory(&self) -> bool {
        match self {
            Self::Created { is_dir, .. }
            | Self::Deleted { is_dir, .. }
            | Self::Modified { is_dir, .. }
            | Self::Moved { is_dir, .. } => *is_dir,
        }
    }

    /// Short lowercase label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Deleted { .. } => "deleted",
            Self::Modified { .. } => "modified",
            Self::Moved { .. } => "moved",
        }
    }
}
