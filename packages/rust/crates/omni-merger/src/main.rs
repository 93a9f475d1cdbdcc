//! omni-merger CLI: stdio dispatcher, replay, usage and config inspection.
//!
//! Settings come from the layered `message_merger.yaml` files unless `--config <path>` is given.
//!
//! Logging: set `RUST_LOG=omni_merger=info` (or `warn`, `debug`) to see merger logs on stderr.

mod cli;
mod nodes;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use omni_merger::set_config_home_override;

use crate::cli::{Cli, Command};
use crate::nodes::{load_config, run_config_mode, run_replay_mode, run_stdio_mode, run_usage_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // Initialize tracing: RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "omni_merger=debug"
        } else {
            "omni_merger=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Command::Stdio {
            session_id,
            separator,
            sweep_every_secs,
        } => {
            let config = load_config(cli.config.as_deref());
            run_stdio_mode(config, session_id, separator, sweep_every_secs).await
        }
        Command::Replay { file } => {
            let config = load_config(cli.config.as_deref());
            run_replay_mode(config, &file)
        }
        Command::Usage => {
            run_usage_mode(&load_config(cli.config.as_deref()));
            Ok(())
        }
        Command::Config { check } => run_config_mode(cli.config.as_deref(), check),
    }
}
