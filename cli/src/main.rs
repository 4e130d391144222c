use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use wardscry_core::highlight::LoggingSink;
use wardscry_core::reader::{read_dump_file, tail_dump_file};
use wardscry_core::report::{Reporter, summary_lines};
use wardscry_core::snapshot_log::SnapshotLogger;
use wardscry_core::streak::StreakTracker;
use wardscry_core::{CoreError, MatchSession, Settings};

#[derive(Parser)]
#[command(version, about = "Infers which enemy hero is behind each anonymized kill-feed slot")]
struct Cli {
    /// Override the configured RNG seed for attribution tie-breaking.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a finished snapshot dump and print the final beliefs.
    Replay { path: PathBuf },
    /// Follow a snapshot dump that another process is appending to.
    Tail { path: PathBuf },
    /// Show the settings file path and current values.
    Config,
}

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    let cli = Cli::parse();
    let settings = Settings::load().unwrap_or_default();
    let _guard = init_logging(&settings.log_directory());

    let seed = cli.seed.or(settings.rng_seed);
    match cli.command {
        Commands::Replay { path } => replay(&path, seed, &settings),
        Commands::Tail { path } => tail(&path, seed, &settings).await,
        Commands::Config => show_config(&settings),
    }
}

fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if std::fs::create_dir_all(log_dir).is_ok() {
        let appender = tracing_appender::rolling::daily(log_dir, "wardscry.log");
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
            .init();
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    None
}

fn build_session(seed: Option<u64>, settings: &Settings) -> Result<MatchSession, CoreError> {
    let mut session = MatchSession::new(seed);
    session.add_handler(Box::new(Reporter::new()));
    if settings.highlights_enabled {
        session.add_handler(Box::new(StreakTracker::new(Box::new(LoggingSink))));
    }
    if let Some(dir) = &settings.snapshot_directory {
        session.set_snapshot_log(SnapshotLogger::new(dir)?);
    }
    Ok(session)
}

fn replay(path: &Path, seed: Option<u64>, settings: &Settings) -> Result<(), CoreError> {
    // Replaying an existing dump must not re-dump it
    let mut session = build_session(seed, &Settings {
        snapshot_directory: None,
        ..settings.clone()
    })?;

    let snapshots = read_dump_file(path)?;
    info!(count = snapshots.len(), path = %path.display(), "replaying dump");
    for snapshot in &snapshots {
        session.ingest(snapshot);
    }

    println!("final beliefs:");
    for line in summary_lines(session.cache()) {
        println!("  {line}");
    }
    Ok(())
}

async fn tail(path: &Path, seed: Option<u64>, settings: &Settings) -> Result<(), CoreError> {
    let mut session = build_session(seed, settings)?;

    let (tx, mut rx) = mpsc::channel(256);
    let owned = path.to_path_buf();
    let mut reader = tokio::spawn(async move { tail_dump_file(&owned, tx).await });
    info!(path = %path.display(), "tailing dump, ctrl-c to stop");

    loop {
        tokio::select! {
            snapshot = rx.recv() => match snapshot {
                Some(snapshot) => {
                    session.ingest(&snapshot);
                }
                // The channel only closes when the reader task ended, so
                // surface whatever it failed with.
                None => {
                    (&mut reader).await.unwrap_or(Ok(()))?;
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                reader.abort();
                break;
            }
        }
    }
    drop(rx);

    println!("final beliefs:");
    for line in summary_lines(session.cache()) {
        println!("  {line}");
    }
    Ok(())
}

fn show_config(settings: &Settings) -> Result<(), CoreError> {
    println!("settings file: {}", Settings::config_path()?.display());
    println!(
        "snapshot_directory = {}",
        settings
            .snapshot_directory
            .as_ref()
            .map_or("(disabled)".to_string(), |p| p.display().to_string())
    );
    println!("log_directory = {}", settings.log_directory().display());
    println!("highlights_enabled = {}", settings.highlights_enabled);
    println!(
        "rng_seed = {}",
        settings
            .rng_seed
            .map_or("(entropy)".to_string(), |s| s.to_string())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tail_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("wardscry-cli-no-such-dump.jsonl");
        let result = tail(&path, Some(1), &Settings::default()).await;
        assert!(matches!(result, Err(CoreError::Io { .. })));
    }
}
