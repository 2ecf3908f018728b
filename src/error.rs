//! Error types for treewatch.

use std::path::PathBuf;

/// Result type alias for treewatch operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur when setting up or running a watch.
///
/// All variants carry owned data, so the error is `Clone` and a terminal
/// provider failure can be retrieved later via
/// [`ChangeNotifier::last_error`](crate::notifier::ChangeNotifier::last_error).
#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchError {
    /// The watch target does not exist or is not a directory.
    #[error("Invalid watch target {}: {reason}", .path.display())]
    InvalidTarget {
        /// The rejected path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// No filesystem watch provider is available on this platform.
    #[error("Watch provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider rejected the watch registration.
    #[error("Failed to start watch: {0}")]
    WatchStart(String),

    /// `start()` was called on a notifier that was already started.
    #[error("Notifier already started")]
    AlreadyStarted,

    /// The provider failed while the watch was running.
    #[error("Watch provider error: {0}")]
    Provider(String),
}
