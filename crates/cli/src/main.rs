use crate::{commands::Commands, error::CliError};
use clap::Parser;
use connectors::{Optimizer, ShrinkClient};
use engine_runtime::{optimize::OptimizeRun, reconcile::MoveReconciler, worklist};
use model::settings::{EngineSettings, ReconcilerSettings};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{Level, info};

mod commands;
mod error;

#[derive(Parser)]
#[command(name = "optipress", version = "0.1.0", about = "Bulk image optimizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            root,
            api_key,
            batch_size,
            check_interval_ms,
            deadline_ms,
        } => {
            let root = resolve_root(root)?;
            let settings = EngineSettings {
                batch_size,
                check_interval: Duration::from_millis(check_interval_ms),
                iteration_deadline: Duration::from_millis(deadline_ms),
            };

            let worklist = worklist::discover(&root)?;
            if worklist.is_empty() {
                info!(root = %root.display(), "no eligible images found; nothing to do");
                return Ok(());
            }

            let optimizer: Arc<dyn Optimizer> = Arc::new(ShrinkClient::new(api_key));
            let run = OptimizeRun::new(&root, optimizer, settings);
            let summary = run.execute(worklist).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Relocate {
            root,
            output,
            batch_size,
            poll_interval_ms,
        } => {
            let root = resolve_root(root)?;
            let settings = ReconcilerSettings {
                batch_size,
                poll_interval: Duration::from_millis(poll_interval_ms),
            };

            let reconciler = MoveReconciler::new(&root, &output, settings);
            let summary = reconciler.execute().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Usage { api_key } => {
            let client = ShrinkClient::new(api_key);
            let count = client.compression_count().await?;
            println!("{count} images optimized this month");
        }
    }

    Ok(())
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    root.canonicalize()
        .map_err(|source| CliError::InvalidRoot { root, source })
}
