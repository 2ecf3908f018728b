//! Command-line tree watcher built on the `treewatch` library.
//!
//! Watches one directory tree, prints a line per qualifying change, and
//! runs until interrupted. Ctrl-C stops the watch cleanly.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use treewatch::prelude::{ChangeNotifier, WatchTarget};

/// Watch a directory tree and report every file change.
///
/// Each qualifying change (a file created, deleted, or modified, or any
/// entry moved) is reported exactly once. Directory creation, deletion,
/// and modification are not reported.
#[derive(Parser, Debug)]
#[command(name = "treewatch", version, about, long_about = None)]
struct Cli {
    /// Directory to watch.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Watch only the directory's direct children, not the whole subtree.
    #[arg(long)]
    no_recursive: bool,

    /// Suppress the per-change stdout line. Log output still follows RUST_LOG.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("treewatch=info")),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("treewatch: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let target = WatchTarget::new(&cli.path).recursive(!cli.no_recursive);

    let count = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&count);
    let quiet = cli.quiet;
    let notifier = ChangeNotifier::new(target, move || {
        let nth = seen.fetch_add(1, Ordering::SeqCst) + 1;
        if !quiet {
            println!("change detected (#{nth})");
        }
    })?;

    notifier.start().await?;
    println!("watching {} (press Ctrl-C to stop)", cli.path.display());

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, stopping watch");
    notifier.stop().await;

    // A watch that died mid-run surfaces here rather than exiting cleanly.
    if let Some(err) = notifier.last_error().await {
        return Err(err.into());
    }

    println!("observed {} change(s)", count.load(Ordering::SeqCst));
    Ok(())
}
