//! Plugin CLI commands
//!
//! Handles: claudeup plugin list

use super::Context;
use clap::Subcommand;
use claudeup_core::inventory::{plugin_rows, PluginRow, PluginSummary};
use claudeup_core::EnabledFilter;
use serde_json::json;

/// Plugin commands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List installed plugins with their status
    List {
        /// Only enabled plugins
        #[arg(long)]
        enabled: bool,
        /// Only disabled plugins
        #[arg(long)]
        disabled: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute plugin command
pub fn execute(cmd: PluginCommands) -> anyhow::Result<()> {
    match cmd {
        PluginCommands::List {
            enabled,
            disabled,
            json,
        } => {
            let filter = EnabledFilter::from_flags(enabled, disabled)?;
            let ctx = Context::from_env()?;
            let project = ctx.project_root()?;
            let rows = plugin_rows(ctx.paths(), Some(&project), filter)?;
            execute_list(&rows, json)
        }
    }
}

fn execute_list(rows: &[PluginRow], json: bool) -> anyhow::Result<()> {
    let summary = PluginSummary::from_rows(rows);
    if json {
        let output = json!({
            "plugins": rows,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }
    for row in rows {
        let version = if row.version.is_empty() {
            String::new()
        } else {
            format!(" v{}", row.version)
        };
        println!("  {:<9} {}{version} ({})", row.status, row.id, row.scope);
    }
    println!("\n{summary}");
    Ok(())
}
