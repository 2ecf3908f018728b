//! The change notifier: one watch registration driving one callback.
//!
//! [`ChangeNotifier`] owns a [`WatchTarget`] and a zero-argument callback.
//! Once started, every qualifying filesystem change under the target invokes
//! the callback exactly once, serialized on a dedicated dispatch task.
//! Directory create, delete, and modify events are suppressed; moves always
//! notify, whatever kind of entry moved.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Result, WatchError};
use crate::event::ChangeEvent;
use crate::provider::{NotifyProvider, ProviderMessage, Subscription, WatchProvider};
use crate::target::WatchTarget;

/// Lifecycle state of a [`ChangeNotifier`].
///
/// States advance in one direction only: `Created` to `Started` to
/// `Stopped`. A stopped notifier cannot be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierState {
    /// Constructed but not yet watching.
    Created,
    /// Actively watching and dispatching callbacks.
    Started,
    /// No longer watching. Terminal.
    Stopped,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Running {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

struct Inner {
    state: NotifierState,
    running: Option<Running>,
    last_error: Option<WatchError>,
}

/// Watches one directory tree and invokes one callback on every qualifying
/// change.
///
/// The notifier validates its target and probes the watch provider at
/// construction, so a notifier that exists can be started. Callbacks run
/// strictly one at a time, in event order, with no coalescing: three rapid
/// saves mean three invocations.
///
/// Directory moves notify even though other directory-level changes are
/// suppressed. There is no timeout on an invocation: a slow callback delays
/// every event behind it. A panicking callback does not end the watch: the
/// panic is caught, logged at error level, and dispatch continues with the
/// next event. Dropping a started notifier signals its dispatch task to
/// shut down; use [`stop`](Self::stop) to wait for the shutdown to
/// complete.
///
/// # Examples
///
/// ```rust,no_run
/// use treewatch::prelude::*;
///
/// # async fn example() -> treewatch::error::Result<()> {
/// let notifier = ChangeNotifier::new(WatchTarget::new("./site"), || {
///     println!("site changed, rebuilding");
/// })?;
///
/// notifier.start().await?;
/// // ... run until shutdown ...
/// notifier.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct ChangeNotifier {
    target: WatchTarget,
    callback: Callback,
    provider: Arc<dyn WatchProvider>,
    inner: Arc<Mutex<Inner>>,
}

impl ChangeNotifier {
    /// Create a notifier for `target` backed by the platform watcher.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidTarget`] if the target does not exist or
    /// is not a directory, and [`WatchError::ProviderUnavailable`] if the
    /// platform cannot deliver filesystem events.
    pub fn new<F>(target: WatchTarget, callback: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_provider(target, NotifyProvider::new(), callback)
    }

    /// Create a notifier backed by a custom [`WatchProvider`].
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidTarget`] if the target does not exist or
    /// is not a directory, and [`WatchError::ProviderUnavailable`] if the
    /// provider's probe fails.
    pub fn with_provider<P, F>(target: WatchTarget, provider: P, callback: F) -> Result<Self>
    where
        P: WatchProvider + 'static,
        F: Fn() + Send + Sync + 'static,
    {
        target.validate()?;
        provider.probe()?;

        Ok(Self {
            target,
            callback: Arc::new(callback),
            provider: Arc::new(provider),
            inner: Arc::new(Mutex::new(Inner {
                state: NotifierState::Created,
                running: None,
                last_error: None,
            })),
        })
    }

    /// Begin watching and dispatching callbacks.
    ///
    /// Returns once the watch registration is active; changes made after
    /// this returns will be observed. Dispatch runs on a dedicated task
    /// until [`stop`](Self::stop) is called, the notifier is dropped, or the
    /// provider fails.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::AlreadyStarted`] if the notifier has ever been
    /// started, and [`WatchError::WatchStart`] if the provider cannot
    /// register the watch.
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != NotifierState::Created {
            return Err(WatchError::AlreadyStarted);
        }

        let subscription = self.provider.subscribe(&self.target)?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_dispatch(
            subscription,
            shutdown_rx,
            Arc::clone(&self.callback),
            Arc::clone(&self.inner),
        ));

        inner.state = NotifierState::Started;
        inner.running = Some(Running { shutdown_tx, task });
        info!(
            path = %self.target.path().display(),
            recursive = self.target.is_recursive(),
            "watch started"
        );
        Ok(())
    }

    /// Stop watching.
    ///
    /// The shutdown signal outranks queued events: changes the provider has
    /// already delivered but the dispatch task has not yet processed are
    /// discarded. Once this returns, the callback will not run again.
    ///
    /// Idempotent. Calling `stop` on a notifier that was never started
    /// leaves it in [`NotifierState::Created`].
    pub async fn stop(&self) {
        let running = {
            let mut inner = self.inner.lock().await;
            let running = inner.running.take();
            if running.is_some() {
                inner.state = NotifierState::Stopped;
            }
            running
        };

        let Some(Running { shutdown_tx, task }) = running else {
            return;
        };

        // A send failure means the dispatch task already exited on its own.
        let _ = shutdown_tx.send(());
        if let Err(err) = task.await {
            if err.is_panic() {
                error!("dispatch task panicked during shutdown");
            }
        }
        info!(path = %self.target.path().display(), "watch stopped");
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> NotifierState {
        self.inner.lock().await.state
    }

    /// The error that terminated the watch, if the provider failed mid-run.
    pub async fn last_error(&self) -> Option<WatchError> {
        self.inner.lock().await.last_error.clone()
    }

    /// The registration this notifier owns.
    pub fn target(&self) -> &WatchTarget {
        &self.target
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        // Best-effort shutdown without awaiting: signal the dispatch task
        // and let it release the subscription on its own. try_lock only
        // fails while the task is recording a terminal error, in which case
        // it is already on its way out.
        if let Ok(mut inner) = self.inner.try_lock() {
            if let Some(Running { shutdown_tx, .. }) = inner.running.take() {
                inner.state = NotifierState::Stopped;
                let _ = shutdown_tx.send(());
            }
        }
    }
}

/// Decide whether a normalized change reaches the callback.
///
/// Directory creation, deletion, and modification describe tree structure
/// rather than content and do not notify. Moves notify regardless of what
/// kind of entry moved.
pub fn should_notify(event: &ChangeEvent) -> bool {
    match event {
        ChangeEvent::Moved { .. } => true,
        ChangeEvent::Created { is_dir, .. }
        | ChangeEvent::Deleted { is_dir, .. }
        | ChangeEvent::Modified { is_dir, .. } => !is_dir,
    }
}

async fn run_dispatch(
    mut subscription: Subscription,
    mut shutdown_rx: oneshot::Receiver<()>,
    callback: Callback,
    inner: Arc<Mutex<Inner>>,
) {
    loop {
        tokio::select! {
            // Shutdown outranks delivery; events still queued at stop time
            // must not reach the callback.
            biased;

            _ = &mut shutdown_rx => {
                debug!("dispatch task shutting down");
                break;
            }

            message = subscription.next() => match message {
                Some(ProviderMessage::Change(event)) => {
                    if should_notify(&event) {
                        debug!(
                            change = event.label(),
                            path = %event.path().display(),
                            "dispatching change"
                        );
                        invoke(&callback);
                    } else {
                        trace!(
                            change = event.label(),
                            path = %event.path().display(),
                            "suppressing directory event"
                        );
                    }
                }
                Some(ProviderMessage::Error(err)) => {
                    error!(error = %err, "watch provider failed");
                    let mut inner = inner.lock().await;
                    inner.state = NotifierState::Stopped;
                    inner.last_error = Some(err);
                    inner.running = None;
                    break;
                }
                None => {
                    warn!("watch provider closed the event stream");
                    let mut inner = inner.lock().await;
                    inner.state = NotifierState::Stopped;
                    inner.running = None;
                    break;
                }
            },
        }
    }
}

/// Run the callback, containing any panic so one bad invocation does not
/// take down the watch.
fn invoke(callback: &Callback) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| (callback)())) {
        error!(panic = panic_message(payload.as_ref()), "change callback panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
