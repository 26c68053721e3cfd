//! Apply engine
//!
//! Order of an apply: installer actions first, then live state is reloaded
//! (the installer may have touched it) and the settings, MCP table and
//! registry are written. The scope's active pointer moves last, whether or
//! not anything changed.

use super::display::unified_diff;
use super::installer::Installer;
use super::plan::{build_plan, LiveState, Plan};
use super::{Action, ActionFailure, ApplyOptions, ApplyResult, DocumentDiff};
use crate::error::ProfileResult;
use crate::paths::PROJECT_CONFIG_FILE;
use crate::profile::{Profile, ProfileRepository};
use crate::registry::EnabledRegistry;
use crate::resolver::ScopeResolver;
use crate::store::ConfigStore;
use claudeup_host::{JsonDocument, Scope};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Target of one apply, resolved before any diffing
struct Target {
    profile: Profile,
    scope: Scope,
    project: Option<PathBuf>,
    previous: Option<String>,
    warnings: Vec<String>,
}

/// Reconciles profiles into live state
pub struct ApplyEngine<'a> {
    store: &'a mut ConfigStore,
    repository: &'a ProfileRepository,
    installer: &'a dyn Installer,
}

impl<'a> ApplyEngine<'a> {
    pub fn new(
        store: &'a mut ConfigStore,
        repository: &'a ProfileRepository,
        installer: &'a dyn Installer,
    ) -> Self {
        Self {
            store,
            repository,
            installer,
        }
    }

    fn target(&self, name: &str, scope: Scope, working_dir: &Path) -> ProfileResult<Target> {
        let resolver = ScopeResolver::new(&*self.store);
        let name = resolver.resolve_name(name, working_dir)?;
        let profile = self.repository.get(&name)?;
        let project = if scope.needs_project() {
            Some(self.store.project_root(working_dir)?)
        } else {
            None
        };
        let active = resolver.resolve_active(working_dir)?;
        let previous = active.get(scope).map(str::to_string);

        let mut warnings = Vec::new();
        if scope == Scope::Local {
            if let Some(root) = &active.project_root {
                let shadowing = root.join(PROJECT_CONFIG_FILE);
                warn!(path = %shadowing.display(), "local profile is shadowed by project config");
                warnings.push(format!(
                    "{} sets the project profile here, so the local profile stays inactive until it is removed",
                    shadowing.display()
                ));
            }
        }
        Ok(Target {
            profile,
            scope,
            project,
            previous,
            warnings,
        })
    }

    fn result(target: Target, plan: Plan) -> ApplyResult {
        let mut warnings = target.warnings;
        warnings.extend(plan.warnings);
        ApplyResult {
            secrets: target.profile.secret_requirements(target.scope),
            profile: target.profile.name,
            scope: target.scope,
            project: target.project,
            previous: target.previous,
            changed: !plan.actions.is_empty(),
            actions: plan.actions,
            failures: Vec::new(),
            warnings,
            diffs: Vec::new(),
        }
    }

    /// Compute what `apply` would do, writing nothing
    pub fn plan(
        &self,
        name: &str,
        scope: Scope,
        working_dir: &Path,
        options: ApplyOptions,
    ) -> ProfileResult<ApplyResult> {
        let target = self.target(name, scope, working_dir)?;
        let project = target.project.as_deref();
        let mut live = LiveState::load(self.store.paths(), scope, project)?;
        let plan = build_plan(&target.profile, scope, project, &mut live, options.replace)?;

        let mut diffs = Vec::new();
        push_document_diff(&mut diffs, live.settings.document());
        push_document_diff(&mut diffs, live.mcp.document());
        push_registry_diff(
            &mut diffs,
            &self.store.paths().enabled_file(),
            &live.registry_baseline,
            &live.registry,
        );

        let mut result = Self::result(target, plan);
        result.diffs = diffs;
        Ok(result)
    }

    /// Apply a profile at `scope`. `name` may be `current`.
    pub fn apply(
        &mut self,
        name: &str,
        scope: Scope,
        working_dir: &Path,
        options: ApplyOptions,
    ) -> ProfileResult<ApplyResult> {
        let target = self.target(name, scope, working_dir)?;
        let paths = self.store.paths().clone();
        let project = target.project.clone();
        let project = project.as_deref();

        let mut live = LiveState::load(&paths, scope, project)?;
        let plan = build_plan(&target.profile, scope, project, &mut live, options.replace)?;

        let mut failures = Vec::new();
        let install_actions: Vec<&Action> =
            plan.actions.iter().filter(|a| a.needs_installer()).collect();
        for action in &install_actions {
            if let Err(e) = self.run_installer(action, project) {
                warn!(%action, error = %e, "installer action failed");
                failures.push(ActionFailure {
                    action: (*action).clone(),
                    message: e.to_string(),
                });
            }
        }
        if !install_actions.is_empty() {
            live = LiveState::load(&paths, scope, project)?;
            build_plan(&target.profile, scope, project, &mut live, options.replace)?;
        }

        live.settings.save()?;
        live.mcp.save()?;
        for action in &plan.actions {
            match action {
                Action::EnableExtension { category, item } => {
                    let local = live.extensions.find(*category, item)?;
                    live.extensions.link(&local)?;
                }
                Action::DisableExtension { category, item } => {
                    if let Ok(local) = live.extensions.find(*category, item) {
                        live.extensions.unlink(&local)?;
                    }
                }
                _ => {}
            }
        }
        if live.registry != live.registry_baseline {
            live.registry.save(&paths.enabled_file())?;
        }

        self.store
            .set_active(scope, project, Some(&target.profile.name))?;
        info!(
            profile = %target.profile.name,
            %scope,
            actions = plan.actions.len(),
            failures = failures.len(),
            "applied profile"
        );

        let mut result = Self::result(target, plan);
        result.failures = failures;
        Ok(result)
    }

    fn run_installer(
        &self,
        action: &Action,
        project: Option<&Path>,
    ) -> Result<(), super::InstallError> {
        match action {
            Action::AddMarketplace { source } => self.installer.add_marketplace(source),
            Action::InstallPlugin { plugin, scope } => {
                self.installer.install_plugin(plugin, *scope, project)
            }
            _ => Ok(()),
        }
    }
}

fn push_document_diff(diffs: &mut Vec<DocumentDiff>, document: &JsonDocument) {
    if !document.is_modified() {
        return;
    }
    diffs.push(DocumentDiff {
        path: document.path().to_path_buf(),
        diff: unified_diff(
            document.path(),
            &document.original_text(),
            &document.current_text(),
        ),
    });
}

fn push_registry_diff(
    diffs: &mut Vec<DocumentDiff>,
    path: &Path,
    before: &EnabledRegistry,
    after: &EnabledRegistry,
) {
    if before == after {
        return;
    }
    let render = |registry: &EnabledRegistry| {
        serde_json::to_string_pretty(registry)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .unwrap_or_default()
    };
    diffs.push(DocumentDiff {
        path: path.to_path_buf(),
        diff: unified_diff(path, &render(before), &render(after)),
    });
}
