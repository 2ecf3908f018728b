//! Performance benchmarks for the event path.
//!
//! Covers the three costs a change pays on its way to the callback:
//! - The dispatch decision (notify or suppress)
//! - Normalizing a raw backend event
//! - The full scripted trip from provider channel to callback

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tempfile::TempDir;
use tokio::sync::mpsc;

use treewatch::notifier::should_notify;
use treewatch::prelude::*;
use treewatch::provider::{ProviderMessage, Subscription, WatchProvider, normalize};

struct ScriptedProvider {
    feed: std::sync::Mutex<Option<mpsc::UnboundedReceiver<ProviderMessage>>>,
}

impl ScriptedProvider {
    fn new() -> (Self, mpsc::UnboundedSender<ProviderMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let provider = Self {
            feed: std::sync::Mutex::new(Some(rx)),
        };
        (provider, tx)
    }
}

impl WatchProvider for ScriptedProvider {
    fn probe(&self) -> treewatch::error::Result<()> {
        Ok(())
    }

    fn subscribe(&self, _target: &WatchTarget) -> treewatch::error::Result<Subscription> {
        let feed = self.feed.lock().unwrap().take().unwrap();
        Ok(Subscription::new(feed, Box::new(())))
    }
}

/// Benchmark the notify-or-suppress decision.
fn benchmark_dispatch_decision(c: &mut Criterion) {
    let events = vec![
        ChangeEvent::Created {
            path: PathBuf::from("/watched/a.txt"),
            is_dir: false,
        },
        ChangeEvent::Created {
            path: PathBuf::from("/watched/sub"),
            is_dir: true,
        },
        ChangeEvent::Modified {
            path: PathBuf::from("/watched/a.txt"),
            is_dir: false,
        },
        ChangeEvent::Deleted {
            path: PathBuf::from("/watched/a.txt"),
            is_dir: false,
        },
        ChangeEvent::Moved {
            from: PathBuf::from("/watched/sub"),
            to: PathBuf::from("/watched/renamed"),
            is_dir: true,
        },
    ];

    let mut group = c.benchmark_group("dispatch_decision");
    group.bench_function("should_notify_mixed", |b| {
        b.iter(|| {
            for event in &events {
                black_box(should_notify(event));
            }
        });
    });
    group.finish();
}

/// Benchmark raw event normalization, including the metadata lookups that
/// hint-free events require.
fn benchmark_normalization(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.txt");
    std::fs::write(&file, "contents").unwrap();
    let renamed = temp_dir.path().join("b.txt");
    std::fs::write(&renamed, "contents").unwrap();

    let events = vec![
        Event::new(EventKind::Create(CreateKind::File)).add_path(file.clone()),
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(file.clone()),
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(file.clone())
            .add_path(renamed.clone()),
        Event::new(EventKind::Remove(RemoveKind::File)).add_path(file.clone()),
    ];

    let mut group = c.benchmark_group("normalization");
    group.bench_function("mixed_batch", |b| {
        b.iter(|| {
            for event in &events {
                black_box(normalize(event.clone()));
            }
        });
    });
    group.finish();
}

/// Benchmark the full trip: provider channel, dispatch decision, callback.
fn benchmark_end_to_end_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("end_to_end");
    group.sample_size(10); // Fewer samples since each run spins up a notifier

    group.bench_function("scripted_file_modifications", |b| {
        b.iter_custom(|iters| {
            runtime.block_on(async move {
                let temp_dir = TempDir::new().unwrap();
                let (provider, tx) = ScriptedProvider::new();
                let count = Arc::new(AtomicUsize::new(0));
                let from_callback = Arc::clone(&count);
                let notifier = ChangeNotifier::with_provider(
                    WatchTarget::new(temp_dir.path()),
                    provider,
                    move || {
                        from_callback.fetch_add(1, Ordering::Relaxed);
                    },
                )
                .unwrap();
                notifier.start().await.unwrap();

                let event = ChangeEvent::Modified {
                    path: PathBuf::from("/watched/a.txt"),
                    is_dir: false,
                };

                let start = Instant::now();
                for _ in 0..iters {
                    tx.send(ProviderMessage::Change(event.clone())).unwrap();
                }
                while (count.load(Ordering::Relaxed) as u64) < iters {
                    tokio::task::yield_now().await;
                }
                let elapsed = start.elapsed();

                notifier.stop().await;
                elapsed
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_dispatch_decision,
    benchmark_normalization,
    benchmark_end_to_end_dispatch,
);

criterion_main!(benches);
