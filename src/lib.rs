pub mod cli;
pub mod cluster;
pub mod elasticsearch;
pub mod error;
pub mod reindex;
pub mod report;
pub mod rollover;

use serde_json::Value;

use crate::cli::{Cli, Operation};
use crate::error::Result;

/// Parse the command line, run the requested operation and return the
/// process exit code.
pub async fn run() -> i32 {
    use clap::Parser;

    let args = Cli::parse();

    // Configure logger based on debug flag
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
        log::debug!("Debug logging enabled");
    } else {
        env_logger::init();
    }

    // Enable colors if not in quiet mode
    if !args.quiet {
        console::set_colors_enabled(true);
        console::set_colors_enabled_stderr(true);
        log::debug!("Console colors enabled");
    }

    let result = execute(&args).await;
    report::report(&result)
}

/// Resolve, connect and dispatch. Validation happens before the client is
/// built, so missing arguments never reach the network.
pub async fn execute(args: &Cli) -> Result<Value> {
    let request = cli::resolve(args)?;
    let config = args.cluster_config()?;

    log::info!(
        "Running {:?} for {} -> {} at {}",
        request.mode,
        request.alias_name,
        request.target_index,
        config.node_uri.as_str()
    );

    let cluster = elasticsearch::connect(&config)?;

    match request.mode {
        Operation::Alias => {
            let summary = rollover::roll_over(&cluster, &request, args.quiet).await?;
            report::outcome_detail(&summary)
        }
        Operation::Reindex => {
            reindex::reindex(&cluster, &request.alias_name, &request.target_index).await
        }
    }
}
