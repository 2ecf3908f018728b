//! # treewatch
//!
//! Directory-tree change notification with a single serialized callback.
//!
//! ## Overview
//!
//! `treewatch` turns noisy platform filesystem events into one uniform
//! signal:
//! - One notifier per watched tree, one zero-argument callback
//! - Directory create/delete/modify churn suppressed, moves always reported
//! - Exactly one invocation per qualifying change, in order, never overlapping
//! - Pluggable watch backend (`notify`'s platform watcher by default)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treewatch::prelude::*;
//!
//! # async fn example() -> treewatch::error::Result<()> {
//! // Rebuild whenever anything under ./site changes
//! let notifier = ChangeNotifier::new(WatchTarget::new("./site"), || {
//!     println!("change detected, rebuilding");
//! })?;
//!
//! notifier.start().await?;
//! // ... run until shutdown ...
//! notifier.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Uniform signal**: creates, deletes, modifies, and moves all collapse into one callback
//! - **Directory suppression**: structural churn (mkdir, rmdir) stays silent
//! - **No coalescing**: three rapid saves mean three invocations
//! - **Serialized dispatch**: callbacks run one at a time, in event order
//! - **Panic containment**: a panicking callback is logged and the watch survives
//! - **Clean shutdown**: `stop()` cuts off queued events and is idempotent
//!
//! ## Feature Flags
//!
//! Enable optional features in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! treewatch = { version = "0.1", features = ["serde"] }
//! ```
//!
//! - `cli` (default): the `treewatch` binary with Ctrl-C handling and log output
//! - `serde`: `Serialize`/`Deserialize` for change events and watch targets

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod error;
pub mod event;
pub mod notifier;
pub mod provider;
pub mod target;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::error::{Result, WatchError};
    pub use crate::event::ChangeEvent;
    pub use crate::notifier::{ChangeNotifier, NotifierState};
    pub use crate::target::WatchTarget;
}

use error::Result;
use notifier::ChangeNotifier;
use target::WatchTarget;

/// Watch `target` and run `callback` on every qualifying change.
///
/// Constructs a [`notifier::ChangeNotifier`] and starts it in one call. The
/// returned notifier keeps the watch alive; stop it (or drop it) to end the
/// watch.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> treewatch::error::Result<()> {
/// use treewatch::target::WatchTarget;
///
/// let notifier = treewatch::watch(WatchTarget::new("./site"), || {
///     println!("change detected");
/// })
/// .await?;
/// # notifier.stop().await;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns any error [`ChangeNotifier::new`](notifier::ChangeNotifier::new)
/// or [`start`](notifier::ChangeNotifier::start) would return.
pub async fn watch<F>(target: WatchTarget, callback: F) -> Result<ChangeNotifier>
where
    F: Fn() + Send + Sync + 'static,
{
    let notifier = ChangeNotifier::new(target, callback)?;
    notifier.start().await?;
    Ok(notifier)
}
