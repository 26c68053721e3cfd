//! MCP server CLI commands
//!
//! Handles: claudeup mcp list

use super::Context;
use clap::Subcommand;
use claudeup_core::inventory::mcp_rows;
use claudeup_core::EnabledFilter;
use claudeup_host::Scope;

/// MCP server commands
#[derive(Subcommand)]
pub enum McpCommands {
    /// List MCP servers by scope
    List {
        /// Only enabled servers
        #[arg(long)]
        enabled: bool,
        /// Only disabled servers
        #[arg(long)]
        disabled: bool,
    },
}

/// Execute MCP command
pub fn execute(cmd: McpCommands) -> anyhow::Result<()> {
    match cmd {
        McpCommands::List { enabled, disabled } => {
            let filter = EnabledFilter::from_flags(enabled, disabled)?;
            let ctx = Context::from_env()?;
            let project = ctx.project_root()?;
            let rows = mcp_rows(ctx.paths(), Some(&project), filter)?;

            if rows.is_empty() {
                println!("No MCP servers found.");
                return Ok(());
            }
            for scope in Scope::ALL {
                let mut servers = rows.iter().filter(|r| r.scope == scope).peekable();
                if servers.peek().is_none() {
                    continue;
                }
                println!("[{scope}]");
                for server in servers {
                    let state = if server.enabled { "" } else { " (disabled)" };
                    println!("  {} - {}{state}", server.name, server.target);
                }
            }
            Ok(())
        }
    }
}
