use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kotoba_core::types::AppEvent;
use tokio::signal;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod events;
pub mod input;
pub mod output;
pub mod profile;
pub mod state;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::{AppState, RunOptions};

/// Search local Japanese dictionaries
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Query to run once; without it queries are read from stdin
    query: Vec<String>,

    /// JSON config file, takes precedence over --profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named profile under the config directory
    #[arg(long)]
    profile: Option<String>,

    /// Dictionary to search, by name
    #[arg(short, long)]
    dictionary: Option<String>,

    /// Keep only high relevance results
    #[arg(long)]
    exact: bool,

    /// Scan without a worker thread and print all results at the end
    #[arg(long)]
    foreground: bool,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Store the effective config under this profile name and continue
    #[arg(long)]
    save_profile: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();

    let args = Args::parse();

    let mut config = profile::load(args.config.as_deref(), args.profile.as_deref())?;
    if args.exact {
        config.search.exact = true;
    }
    if let Some(name) = &args.save_profile {
        let path = profile::save_profile(name, &config)?;
        eprintln!("Saved profile to {}", path.display());
    }
    if config.dictionaries.is_empty() {
        tracing::warn!("No dictionaries configured, set KOTOBA_DICTIONARY_DIR or use --config");
    }
    for dictionary in config.dictionaries.iter().filter(|d| !d.path.is_file()) {
        tracing::warn!(path = %dictionary.path.display(), "Dictionary {} has no file", dictionary.name);
    }

    let options = RunOptions {
        foreground: args.foreground,
        json: args.json,
    };
    let state = Arc::new(AppState::new(config, options));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    let input_tx = controller.input();
    if let Some(name) = args.dictionary {
        input_tx.send(AppEvent::SelectDictionary(name)).await?;
    }
    if args.query.is_empty() {
        input::spawn_stdin_reader(input_tx)?;
    } else {
        input_tx.send(AppEvent::TextInput(args.query.join(" "))).await?;
        input_tx.send(AppEvent::Shutdown).await?;
    }

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            controller.shutdown();
        }
        _ = join_all(&mut tasks) => return Ok(()),
    }

    join_all(&mut tasks).await;
    Ok(())
}

async fn join_all(tasks: &mut JoinSet<anyhow::Result<()>>) {
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task exited: {e}"),
            Err(e) => tracing::error!("task panicked: {e}"),
        }
    }
}
