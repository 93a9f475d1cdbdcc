use std::path::PathBuf;

use clap::{Parser, Subcommand};

use omni_merger::DEFAULT_STDIO_SEPARATOR;

#[derive(Parser)]
#[command(name = "omni-merger")]
#[command(about = "Merge bursts of chat messages per session before they reach the model.")]
pub(crate) struct Cli {
    /// Override config home directory (takes precedence over `PRJ_CONFIG_HOME`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Load merger settings from this file only (.json / .yaml), skipping layered lookup.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Log every state transition (debug level).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Read `<session><TAB><text>` lines from stdin; print forwarded messages as JSON lines.
    Stdio {
        /// Treat every line as text for this session id (no framing).
        #[arg(long)]
        session_id: Option<String>,

        /// Separator between session id and text.
        #[arg(long, default_value = DEFAULT_STDIO_SEPARATOR)]
        separator: String,

        /// Idle sweep period in seconds (only used when idle eviction is configured).
        #[arg(long, default_value_t = 60)]
        sweep_every_secs: u64,
    },
    /// Replay a JSON array of recorded events and print every decision.
    Replay {
        /// Path to the events file.
        file: PathBuf,
    },
    /// Print the user-facing usage text with the configured triggers.
    Usage,
    /// Print the effective merger configuration as YAML.
    Config {
        /// Fail on unreadable or malformed settings instead of falling back to defaults.
        #[arg(long)]
        check: bool,
    },
}
