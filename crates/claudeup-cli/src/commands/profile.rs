//! Profile CLI commands
//!
//! Handles: claudeup profile list/show/apply/save/delete/restore/status

use super::Context;
use anyhow::bail;
use clap::Subcommand;
use claudeup_core::apply::display::format_result_terminal;
use claudeup_core::presentation::{ProfileListing, ProfileSummary};
use claudeup_core::profile::snapshot;
use claudeup_core::resolver::{parse_scope, ScopeLookup};
use claudeup_core::{
    ApplyEngine, ApplyOptions, ClaudeCli, Profile, ProfileRepository, ScopeResolver,
};
use claudeup_host::Scope;
use std::path::PathBuf;

/// Env var naming the `claude` executable used for installs
const CLAUDE_BIN_ENV: &str = "CLAUDEUP_CLAUDE_BIN";

/// Profile commands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List available profiles
    List {
        /// Include hidden profiles (names with a segment starting with '_')
        #[arg(short, long)]
        all: bool,
    },
    /// Show a profile's contents
    Show {
        /// Profile name, or 'current' for the profile in effect here
        name: String,
    },
    /// Apply a profile at a scope
    Apply {
        /// Profile name, or 'current' to re-apply the profile in effect
        name: String,
        /// Target scope: user, project or local
        #[arg(short, long)]
        scope: Option<String>,
        /// Preview changes without applying
        #[arg(long)]
        dry_run: bool,
        /// Also disable and remove what the profile does not declare
        #[arg(long)]
        replace: bool,
    },
    /// Save the current configuration as a profile
    Save {
        /// Profile name
        name: String,
        /// Profile description
        #[arg(short, long)]
        description: Option<String>,
        /// Scope to capture: user, project or local
        #[arg(short, long)]
        scope: Option<String>,
        /// Overwrite an existing profile
        #[arg(short, long)]
        force: bool,
    },
    /// Delete a user profile
    Delete {
        /// Profile name
        name: String,
    },
    /// Drop customizations of a built-in profile
    Restore {
        /// Profile name
        name: String,
    },
    /// Show the active profile per scope
    Status {
        /// Only report this scope
        #[arg(short, long)]
        scope: Option<String>,
    },
}

/// Execute profile command
pub fn execute(cmd: ProfileCommands) -> anyhow::Result<()> {
    let mut ctx = Context::from_env()?;
    let repo = ProfileRepository::new(ctx.paths().profiles_dir())?;

    match cmd {
        ProfileCommands::List { all } => execute_list(&ctx, &repo, all),
        ProfileCommands::Show { name } => execute_show(&ctx, &repo, &name),
        ProfileCommands::Apply {
            name,
            scope,
            dry_run,
            replace,
        } => execute_apply(&mut ctx, &repo, &name, scope.as_deref(), dry_run, replace),
        ProfileCommands::Save {
            name,
            description,
            scope,
            force,
        } => execute_save(&ctx, &repo, &name, description, scope.as_deref(), force),
        ProfileCommands::Delete { name } => {
            let working_dir = ctx.working_dir.clone();
            let cleared = repo.delete(&name, &mut ctx.store, Some(&working_dir))?;
            println!("Deleted profile '{name}'");
            for scope in cleared {
                println!("  Cleared active {scope} profile");
            }
            Ok(())
        }
        ProfileCommands::Restore { name } => {
            repo.restore(&name)?;
            println!("Restored built-in profile '{name}'");
            Ok(())
        }
        ProfileCommands::Status { scope } => execute_status(&ctx, scope.as_deref()),
    }
}

fn target_scope(ctx: &Context, scope: Option<&str>) -> anyhow::Result<Scope> {
    Ok(match scope {
        Some(s) => parse_scope(s)?,
        None => ctx.store.preferences().default_scope,
    })
}

fn execute_list(ctx: &Context, repo: &ProfileRepository, all: bool) -> anyhow::Result<()> {
    let listing = repo.list(all)?;
    let effective = ScopeResolver::new(&ctx.store).effective(&ctx.working_dir)?;
    print!("{}", render_listing(&listing, effective.as_deref()));
    Ok(())
}

fn render_listing(listing: &ProfileListing, effective: Option<&str>) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if listing.is_empty() {
        out.push_str("No profiles found.\n");
    }
    for section in &listing.sections {
        let _ = writeln!(out, "{}:", section.section.title());
        for group in &section.groups {
            let indent = match &group.prefix {
                Some(prefix) => {
                    let _ = writeln!(out, "  {prefix}/");
                    "    "
                }
                None => "  ",
            };
            for profile in &group.profiles {
                let _ = writeln!(out, "{indent}{}", summary_line(profile, effective));
            }
        }
        out.push('\n');
    }
    if let Some(hint) = listing.hidden_hint() {
        let _ = writeln!(out, "{hint}");
    }
    out
}

fn summary_line(profile: &ProfileSummary, effective: Option<&str>) -> String {
    let marker = if effective == Some(profile.name.as_str()) {
        "* "
    } else {
        ""
    };
    let mut line = format!("{marker}{}", profile.name);
    if profile.customized {
        line.push_str(" (customized)");
    }
    if !profile.description.is_empty() {
        line.push_str(" - ");
        line.push_str(&profile.description);
    }
    line
}

fn execute_show(ctx: &Context, repo: &ProfileRepository, name: &str) -> anyhow::Result<()> {
    let name = ScopeResolver::new(&ctx.store).resolve_name(name, &ctx.working_dir)?;
    let profile = repo.get(&name)?;
    let origin = match (repo.is_builtin(&name), repo.is_customized(&name)) {
        (true, true) => "built-in, customized",
        (true, false) => "built-in",
        _ => "user",
    };
    print!("{}", render_profile(&profile, origin));
    Ok(())
}

fn render_profile(profile: &Profile, origin: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Profile: {} ({origin})", profile.name);
    if !profile.description.is_empty() {
        let _ = writeln!(out, "Description: {}", profile.description);
    }
    if profile.is_empty() {
        let _ = writeln!(out, "\nThis profile declares nothing.");
        return out;
    }

    if !profile.marketplaces.is_empty() {
        let _ = writeln!(out, "\nMarketplaces:");
        for source in &profile.marketplaces {
            let _ = writeln!(out, "  {source}");
        }
    }
    for scope in Scope::ALL {
        let Some(settings) = profile.scope(scope).filter(|s| !s.is_empty()) else {
            continue;
        };
        let _ = writeln!(out, "\n[{scope}]");
        for plugin in &settings.plugins {
            let _ = writeln!(out, "  plugin: {plugin}");
        }
        for server in &settings.mcp_servers {
            let mut command = server.command.clone();
            for arg in &server.args {
                command.push(' ');
                command.push_str(arg);
            }
            let _ = writeln!(out, "  mcp: {} ({command})", server.name);
            for env in server.secrets.keys() {
                let _ = writeln!(out, "    secret: {env}");
            }
        }
    }
    if !profile.extensions.is_empty() {
        let _ = writeln!(out, "\nExtensions:");
        for (category, items) in &profile.extensions {
            let items: Vec<&str> = items.iter().map(String::as_str).collect();
            let _ = writeln!(out, "  {category}: {}", items.join(", "));
        }
    }
    out
}

fn execute_apply(
    ctx: &mut Context,
    repo: &ProfileRepository,
    name: &str,
    scope: Option<&str>,
    dry_run: bool,
    replace: bool,
) -> anyhow::Result<()> {
    let scope = target_scope(ctx, scope)?;
    let options = ApplyOptions {
        replace: replace || ctx.store.preferences().replace,
    };
    let installer = match std::env::var_os(CLAUDE_BIN_ENV).filter(|v| !v.is_empty()) {
        Some(program) => ClaudeCli::new(PathBuf::from(program)),
        None => ClaudeCli::default(),
    };
    let working_dir = ctx.working_dir.clone();
    let mut engine = ApplyEngine::new(&mut ctx.store, repo, &installer);

    if dry_run {
        let result = engine.plan(name, scope, &working_dir, options)?;
        print!("{}", format_result_terminal(&result, true));
        println!("\nDry run - no changes made.");
        return Ok(());
    }

    let result = engine.apply(name, scope, &working_dir, options)?;
    print!("{}", format_result_terminal(&result, false));
    if !result.failures.is_empty() {
        bail!(
            "{} install action(s) failed. Settings were written; fix the cause and run 'claudeup profile apply {}' again",
            result.failures.len(),
            result.profile
        );
    }
    Ok(())
}

fn execute_save(
    ctx: &Context,
    repo: &ProfileRepository,
    name: &str,
    description: Option<String>,
    scope: Option<&str>,
    force: bool,
) -> anyhow::Result<()> {
    let scope = target_scope(ctx, scope)?;
    let project = if scope.needs_project() {
        Some(ctx.project_root()?)
    } else {
        None
    };

    let mut profile = snapshot(name, scope, project.as_deref(), ctx.paths())?;
    if let Some(description) = description {
        profile.description = description;
    }
    let path = if force {
        repo.replace(&profile)?
    } else {
        repo.save(&profile)?
    };
    println!("Saved profile '{name}' from {scope} scope to {}", path.display());
    Ok(())
}

fn execute_status(ctx: &Context, scope: Option<&str>) -> anyhow::Result<()> {
    let resolver = ScopeResolver::new(&ctx.store);

    if let Some(scope) = scope {
        let scope = parse_scope(scope)?;
        match resolver.lookup(&ctx.working_dir, scope)? {
            ScopeLookup::Active(name) => println!("{scope}: {name}"),
            ScopeLookup::NotFound(message) => println!("{message}"),
        }
        return Ok(());
    }

    let active = resolver.resolve_active(&ctx.working_dir)?;
    println!("Active profiles:");
    for scope in Scope::ALL {
        let name = active.get(scope).unwrap_or("(none)");
        let location = match scope {
            Scope::Project => active.project_root.as_ref(),
            Scope::Local => active.local_root.as_ref(),
            Scope::User => None,
        };
        match location {
            Some(dir) => println!("  {scope:<8} {name} ({})", dir.display()),
            None => println!("  {scope:<8} {name}"),
        }
    }
    match active.effective() {
        Some((scope, name)) => println!("\nEffective: {name} (from {scope} scope)"),
        None => println!("\nNo profile is active here."),
    }
    Ok(())
}
