//! Apply result formatting for terminal display

use super::ApplyResult;
use similar::TextDiff;
use std::fmt::Write;
use std::path::Path;

const DIFF_CONTEXT: usize = 3;

/// Unified line diff between two versions of a file
#[must_use]
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let name = path.display().to_string();
    let diff = TextDiff::from_lines(old, new);
    let mut unified = diff.unified_diff();
    unified.context_radius(DIFF_CONTEXT).header(&name, &name);
    unified.to_string()
}

/// Format an apply (or dry-run) result for the terminal
#[must_use]
pub fn format_result_terminal(result: &ApplyResult, dry_run: bool) -> String {
    let mut output = String::new();
    let target = match &result.project {
        Some(project) => format!("{} scope, {}", result.scope, project.display()),
        None => format!("{} scope", result.scope),
    };

    if result.actions.is_empty() {
        let _ = writeln!(output, "No changes needed for '{}' ({target})", result.profile);
    } else {
        let verb = if dry_run { "Would apply" } else { "Applied" };
        let _ = writeln!(output, "{verb} '{}' ({target}):", result.profile);
        for action in &result.actions {
            let failed = result.failures.iter().any(|f| &f.action == action);
            let marker = if failed { "!" } else { "+" };
            let _ = writeln!(output, "  {marker} {action}");
        }
    }

    if !result.failures.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Failed:");
        for failure in &result.failures {
            let _ = writeln!(output, "  {}: {}", failure.action, failure.message);
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(output);
        for warning in &result.warnings {
            let _ = writeln!(output, "[WARN] {warning}");
        }
    }

    if !result.secrets.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Secrets required:");
        for secret in &result.secrets {
            let sources: Vec<String> = secret
                .sources
                .iter()
                .map(|s| format!("{}:{}", s.kind, s.key))
                .collect();
            let _ = write!(output, "  {} ({})", secret.env, secret.server);
            if !secret.description.is_empty() {
                let _ = write!(output, " - {}", secret.description);
            }
            let _ = writeln!(output);
            if !sources.is_empty() {
                let _ = writeln!(output, "    sources: {}", sources.join(", "));
            }
        }
    }

    if dry_run {
        for diff in &result.diffs {
            let _ = writeln!(output);
            let _ = writeln!(output, "MODIFY: {}", diff.path.display());
            for line in diff.diff.lines() {
                let _ = writeln!(output, "  {line}");
            }
        }
    } else if let Some(previous) = result.previous.as_deref().filter(|p| *p != result.profile) {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Active {} profile: {previous} -> {}",
            result.scope, result.profile
        );
    }

    output
}
