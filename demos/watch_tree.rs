//! Example demonstrating directory-tree change notification.
//!
//! This example shows how to:
//! - Create a `ChangeNotifier` over a directory tree
//! - Receive one callback per qualifying change
//! - See directory churn suppressed while moves still notify
//!
//! Run with: cargo run --example watch_tree
//!
//! The example drives its own changes against a temporary directory, so it
//! runs to completion without any manual editing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use treewatch::prelude::{ChangeNotifier, WatchTarget};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tree Watch Example ===\n");

    let temp_dir = TempDir::new()?;
    println!("Watching: {}\n", temp_dir.path().display());

    let change_count = Arc::new(AtomicUsize::new(0));
    let change_count_clone = Arc::clone(&change_count);

    let notifier = ChangeNotifier::new(WatchTarget::new(temp_dir.path()), move || {
        let count = change_count_clone.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[Event] Change detected (#{count})");
    })?;

    notifier.start().await?;
    println!("Watch started (state: {:?})\n", notifier.state().await);

    // Let the platform watcher become active before driving changes.
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("--> Creating notes.txt (notifies)");
    std::fs::write(temp_dir.path().join("notes.txt"), "draft")?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    println!("--> Appending to notes.txt (notifies)");
    std::fs::write(temp_dir.path().join("notes.txt"), "draft, revised")?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    println!("--> Creating logs/ directory (suppressed)");
    std::fs::create_dir(temp_dir.path().join("logs"))?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    println!("--> Renaming notes.txt to journal.txt (notifies)");
    std::fs::rename(
        temp_dir.path().join("notes.txt"),
        temp_dir.path().join("journal.txt"),
    )?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    println!("--> Renaming logs/ to archive/ (directory move, still notifies)");
    std::fs::rename(
        temp_dir.path().join("logs"),
        temp_dir.path().join("archive"),
    )?;
    tokio::time::sleep(Duration::from_millis(400)).await;

    notifier.stop().await;
    println!("\nWatch stopped (state: {:?})", notifier.state().await);

    // Stopping again is a no-op.
    notifier.stop().await;

    let total = change_count.load(Ordering::SeqCst);
    println!("Total callback invocations: {total}");
    println!("(Platforms may report a single write as several raw events,");
    println!(" so the total can exceed the number of operations above.)");

    Ok(())
}
