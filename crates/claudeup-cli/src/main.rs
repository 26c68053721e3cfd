//! claudeup CLI - profile manager for Claude Code
//!
//! Provides `claudeup profile`, `claudeup plugin`, `claudeup mcp` and
//! `claudeup ext`.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use commands::ext::ExtCommands;
use commands::mcp::McpCommands;
use commands::plugin::PluginCommands;
use commands::profile::ProfileCommands;

/// Env var holding a tracing filter directive, e.g. `claudeup_core=debug`
const LOG_ENV: &str = "CLAUDEUP_LOG";

#[derive(Parser)]
#[command(name = "claudeup")]
#[command(about = "claudeup - profile manager for Claude Code")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Inspect installed plugins
    Plugin {
        #[command(subcommand)]
        action: PluginCommands,
    },
    /// Inspect MCP servers
    Mcp {
        #[command(subcommand)]
        action: McpCommands,
    },
    /// Manage local extensions
    Ext {
        #[command(subcommand)]
        action: ExtCommands,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Profile { action } => commands::profile::execute(action),
        Commands::Plugin { action } => commands::plugin::execute(action),
        Commands::Mcp { action } => commands::mcp::execute(action),
        Commands::Ext { action } => commands::ext::execute(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
