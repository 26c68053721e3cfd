//! Local extension CLI commands
//!
//! Handles: claudeup ext list/enable/disable

use super::Context;
use anyhow::bail;
use clap::Subcommand;
use claudeup_core::extensions::LocalExtensions;
use claudeup_core::{Category, EnabledFilter, EnabledRegistry};

/// Extension commands
#[derive(Subcommand)]
pub enum ExtCommands {
    /// List local extensions
    List {
        /// Category: agents, rules, skills, commands, hooks or output-styles
        category: Option<String>,
        /// Only enabled items
        #[arg(long)]
        enabled: bool,
        /// Only disabled items
        #[arg(long)]
        disabled: bool,
    },
    /// Enable a local extension
    Enable {
        /// Extension category
        category: String,
        /// Item name
        item: String,
    },
    /// Disable a local extension
    Disable {
        /// Extension category
        category: String,
        /// Item name
        item: String,
    },
}

fn parse_category(value: &str) -> anyhow::Result<Category> {
    let category: Category = value.parse()?;
    if !category.is_extension() {
        bail!(
            "'{category}' is not an extension category. Valid categories: {}",
            Category::EXTENSIONS.map(Category::as_str).join(", ")
        );
    }
    Ok(category)
}

/// Execute extension command
pub fn execute(cmd: ExtCommands) -> anyhow::Result<()> {
    match cmd {
        ExtCommands::List {
            category,
            enabled,
            disabled,
        } => {
            let filter = EnabledFilter::from_flags(enabled, disabled)?;
            let categories = match category.as_deref() {
                Some(value) => vec![parse_category(value)?],
                None => Category::EXTENSIONS.to_vec(),
            };
            let ctx = Context::from_env()?;
            let registry = EnabledRegistry::load(&ctx.paths().enabled_file())?;
            let rows = LocalExtensions::new(ctx.paths()).rows(&categories, &registry, filter)?;

            if rows.is_empty() {
                println!("No extensions found.");
                return Ok(());
            }
            for category in categories {
                let mut items = rows.iter().filter(|r| r.category == category).peekable();
                if items.peek().is_none() {
                    continue;
                }
                println!("[{category}]");
                for item in items {
                    let mark = if item.enabled { "on " } else { "off" };
                    match &item.description {
                        Some(description) => println!("  {mark} {} - {description}", item.name),
                        None => println!("  {mark} {}", item.name),
                    }
                }
            }
            Ok(())
        }
        ExtCommands::Enable { category, item } => toggle(&category, &item, true),
        ExtCommands::Disable { category, item } => toggle(&category, &item, false),
    }
}

fn toggle(category: &str, item: &str, enable: bool) -> anyhow::Result<()> {
    let category = parse_category(category)?;
    let ctx = Context::from_env()?;
    let path = ctx.paths().enabled_file();
    let mut registry = EnabledRegistry::load(&path)?;
    let extensions = LocalExtensions::new(ctx.paths());

    let changed = if enable {
        extensions.enable(&mut registry, category, item)?
    } else {
        extensions.disable(&mut registry, category, item)?
    };
    registry.save(&path)?;

    let state = if enable { "enabled" } else { "disabled" };
    if changed {
        println!("{category} '{item}' {state}");
    } else {
        println!("{category} '{item}' already {state}");
    }
    Ok(())
}
