//! Watch providers: the pluggable source of raw filesystem events.
//!
//! A [`WatchProvider`] registers interest in a directory subtree and delivers
//! an ordered stream of [`ProviderMessage`]s until its [`Subscription`] is
//! dropped. The default provider, [`NotifyProvider`], is backed by the
//! `notify` crate's recommended platform watcher (inotify, FSEvents,
//! ReadDirectoryChangesW, or polling).

use std::any::Any;
use std::path::Path;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Result, WatchError};
use crate::event::ChangeEvent;
use crate::target::WatchTarget;

/// A message delivered by a provider subscription.
#[derive(Debug)]
pub enum ProviderMessage {
    /// A normalized change under the watched tree.
    Change(ChangeEvent),
    /// The provider failed mid-run (e.g. the watch became invalid). The
    /// subscription delivers no further changes after this.
    Error(WatchError),
}

/// An active watch registration.
///
/// Yields provider messages in delivery order. Dropping the subscription
/// releases the underlying registration; providers attach their native
/// watcher handle as the guard so deregistration happens on drop.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ProviderMessage>,
    _guard: Box<dyn Any + Send>,
}

impl Subscription {
    /// Create a subscription from a message stream and a guard object.
    ///
    /// The guard is held for the subscription's lifetime; its `Drop`
    /// implementation is expected to deregister the watch.
    pub fn new(events: mpsc::UnboundedReceiver<ProviderMessage>, guard: Box<dyn Any + Send>) -> Self {
        Self {
            events,
            _guard: guard,
        }
    }

    /// Wait for the next message. Returns `None` once the provider side has
    /// shut down and all buffered messages have been drained.
    pub async fn next(&mut self) -> Option<ProviderMessage> {
        self.events.recv().await
    }
}

/// A source of raw filesystem change notifications for a directory subtree.
///
/// Implement this trait to plug in a different watch mechanism (or a
/// scripted one in tests). Providers may coalesce rapid successive changes
/// into fewer messages; consumers must not rely on one message per write.
pub trait WatchProvider: Send + Sync {
    /// Verify that the provider can deliver events on this platform.
    ///
    /// Called once at notifier construction so that a missing backend is
    /// reported up front rather than degrading to a watch that never fires.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::ProviderUnavailable`] if events cannot be
    /// delivered.
    fn probe(&self) -> Result<()>;

    /// Register interest in `target` and begin delivering messages.
    ///
    /// The watch must be active when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::WatchStart`] if registration fails (permission
    /// denied, watch limit exceeded, path vanished since validation).
    fn subscribe(&self, target: &WatchTarget) -> Result<Subscription>;
}

/// The default provider, backed by [`notify::RecommendedWatcher`].
///
/// # Examples
///
/// ```rust,no_run
/// use treewatch::provider::{NotifyProvider, WatchProvider};
/// use treewatch::target::WatchTarget;
///
/// # fn example() -> treewatch::error::Result<()> {
/// let provider = NotifyProvider::new();
/// provider.probe()?;
/// let subscription = provider.subscribe(&WatchTarget::new("/tmp/watched"))?;
/// # drop(subscription);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct NotifyProvider;

impl NotifyProvider {
    /// Create a new notify-backed provider.
    pub fn new() -> Self {
        Self
    }
}

impl WatchProvider for NotifyProvider {
    fn probe(&self) -> Result<()> {
        notify::recommended_watcher(|_: notify::Result<notify::Event>| {})
            .map(drop)
            .map_err(|e| WatchError::ProviderUnavailable(e.to_string()))
    }

    fn subscribe(&self, target: &WatchTarget) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for change in normalize(event) {
                        if tx.send(ProviderMessage::Change(change)).is_err() {
                            // Dispatch side gone; nothing left to deliver to.
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = tx.send(ProviderMessage::Error(WatchError::Provider(err.to_string())));
                }
            }
        })
        .map_err(|e| WatchError::WatchStart(e.to_string()))?;

        let mode = if target.is_recursive() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        watcher
            .watch(target.path(), mode)
            .map_err(|e| WatchError::WatchStart(e.to_string()))?;

        Ok(Subscription::new(rx, Box::new(watcher)))
    }
}

/// Translate one backend notification into normalized change events.
///
/// Access and unclassified events are dropped. Paired renames become a
/// single [`ChangeEvent::Moved`]; unpaired rename halves degrade to
/// [`ChangeEvent::Deleted`] / [`ChangeEvent::Created`], which is how the
/// underlying backends report moves across the watch boundary.
pub fn normalize(event: notify::Event) -> Vec<ChangeEvent> {
    match event.kind {
        EventKind::Create(kind) => {
            let hint = create_kind_hint(kind);
            event
                .paths
                .into_iter()
                .map(|path| {
                    let is_dir = entry_is_dir(&path, hint);
                    ChangeEvent::Created { path, is_dir }
                })
                .collect()
        }
        EventKind::Remove(kind) => {
            let hint = remove_kind_hint(kind);
            event
                .paths
                .into_iter()
                .map(|path| ChangeEvent::Deleted {
                    path,
                    // The entry is gone; without a kind hint it cannot be
                    // inspected, so treat it as a file.
                    is_dir: hint.unwrap_or(false),
                })
                .collect()
        }
        EventKind::Modify(ModifyKind::Name(mode)) => normalize_rename(mode, event.paths),
        EventKind::Modify(_) => event
            .paths
            .into_iter()
            .map(|path| {
                let is_dir = entry_is_dir(&path, None);
                ChangeEvent::Modified { path, is_dir }
            })
            .collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {
            trace!(kind = ?event.kind, "ignoring unclassified event");
            Vec::new()
        }
    }
}

fn normalize_rename(mode: RenameMode, paths: Vec<std::path::PathBuf>) -> Vec<ChangeEvent> {
    match mode {
        RenameMode::Both | RenameMode::Any | RenameMode::Other => {
            let mut paths = paths.into_iter();
            match (paths.next(), paths.next()) {
                // Both halves observed: a move within the watched tree.
                (Some(from), Some(to)) => {
                    let is_dir = entry_is_dir(&to, None);
                    vec![ChangeEvent::Moved { from, to, is_dir }]
                }
                // Single path with no direction: the backend could not pair
                // the rename. Report a modification of that path.
                (Some(path), None) => {
                    let is_dir = entry_is_dir(&path, None);
                    vec![ChangeEvent::Modified { path, is_dir }]
                }
                _ => Vec::new(),
            }
        }
        // The entry left the watched tree; the backend reports this the same
        // way as a removal.
        RenameMode::From => paths
            .into_iter()
            .map(|path| ChangeEvent::Deleted {
                path,
                is_dir: false,
            })
            .collect(),
        // The entry arrived from outside the watched tree.
        RenameMode::To => paths
            .into_iter()
            .map(|path| {
                let is_dir = entry_is_dir(&path, None);
                ChangeEvent::Created { path, is_dir }
            })
            .collect(),
    }
}

fn create_kind_hint(kind: CreateKind) -> Option<bool> {
    match kind {
        CreateKind::File => Some(false),
        CreateKind::Folder => Some(true),
        CreateKind::Any | CreateKind::Other => None,
    }
}

fn remove_kind_hint(kind: RemoveKind) -> Option<bool> {
    match kind {
        RemoveKind::File => Some(false),
        RemoveKind::Folder => Some(true),
        RemoveKind::Any | RemoveKind::Other => None,
    }
}

fn entry_is_dir(path: &Path, hint: Option<bool>) -> bool {
    hint.unwrap_or_else(|| path.is_dir())
}
