//! Enabled-item registry (`~/.claudeup/enabled.json`)
//!
//! Maps a category to item identifiers and their enabled state. A missing
//! entry means enabled for plugins and MCP servers, but not enabled for
//! file-based extensions.

use crate::error::{ProfileError, ProfileResult};
use claudeup_host::document::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A kind of item tracked by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Plugins,
    McpServers,
    Agents,
    Rules,
    Skills,
    Commands,
    Hooks,
    OutputStyles,
}

impl Category {
    /// File-based extension categories, in display order
    pub const EXTENSIONS: [Category; 6] = [
        Category::Agents,
        Category::Rules,
        Category::Skills,
        Category::Commands,
        Category::Hooks,
        Category::OutputStyles,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plugins => "plugins",
            Self::McpServers => "mcp-servers",
            Self::Agents => "agents",
            Self::Rules => "rules",
            Self::Skills => "skills",
            Self::Commands => "commands",
            Self::Hooks => "hooks",
            Self::OutputStyles => "output-styles",
        }
    }

    /// Whether items of this category are files in local storage
    #[must_use]
    pub fn is_extension(self) -> bool {
        !matches!(self, Self::Plugins | Self::McpServers)
    }

    /// State assumed for an item the registry does not mention
    #[must_use]
    pub fn default_enabled(self) -> bool {
        !self.is_extension()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plugins" => Ok(Self::Plugins),
            "mcp-servers" | "mcpServers" | "mcp" => Ok(Self::McpServers),
            "agents" => Ok(Self::Agents),
            "rules" => Ok(Self::Rules),
            "skills" => Ok(Self::Skills),
            "commands" => Ok(Self::Commands),
            "hooks" => Ok(Self::Hooks),
            "output-styles" | "outputStyles" => Ok(Self::OutputStyles),
            _ => Err(ProfileError::ItemNotFound {
                kind: "Category".to_string(),
                name: s.to_string(),
            }),
        }
    }
}

/// Totals for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub enabled: usize,
}

impl Counts {
    #[must_use]
    pub fn disabled(&self) -> usize {
        self.total - self.enabled
    }
}

/// `--enabled` / `--disabled` listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnabledFilter {
    #[default]
    All,
    Enabled,
    Disabled,
}

impl EnabledFilter {
    /// Build the filter from the two flags; both together is an error
    pub fn from_flags(enabled: bool, disabled: bool) -> ProfileResult<Self> {
        match (enabled, disabled) {
            (true, true) => Err(ProfileError::MutuallyExclusiveFlags {
                first: "enabled",
                second: "disabled",
            }),
            (true, false) => Ok(Self::Enabled),
            (false, true) => Ok(Self::Disabled),
            (false, false) => Ok(Self::All),
        }
    }

    #[must_use]
    pub fn matches(self, enabled: bool) -> bool {
        match self {
            Self::All => true,
            Self::Enabled => enabled,
            Self::Disabled => !enabled,
        }
    }
}

/// Persisted enabled/disabled state per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledRegistry {
    categories: BTreeMap<String, BTreeMap<String, bool>>,
}

impl EnabledRegistry {
    pub fn load(path: &Path) -> ProfileResult<Self> {
        Ok(read_json::<Self>(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> ProfileResult<bool> {
        Ok(write_json_atomic(path, self)?)
    }

    /// Explicit state, `None` when the item is not tracked
    #[must_use]
    pub fn state(&self, category: Category, item: &str) -> Option<bool> {
        self.categories
            .get(category.as_str())
            .and_then(|items| items.get(item))
            .copied()
    }

    /// Effective state, applying the category's default for untracked items
    #[must_use]
    pub fn is_enabled(&self, category: Category, item: &str) -> bool {
        self.state(category, item)
            .unwrap_or_else(|| category.default_enabled())
    }

    /// Record an item's state; returns whether the registry changed
    pub fn set_enabled(&mut self, category: Category, item: &str, enabled: bool) -> bool {
        let items = self
            .categories
            .entry(category.as_str().to_string())
            .or_default();
        items.insert(item.to_string(), enabled) != Some(enabled)
    }

    /// Tracked items of a category
    #[must_use]
    pub fn items(&self, category: Category) -> BTreeMap<String, bool> {
        self.categories
            .get(category.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Tracked items explicitly enabled, sorted
    #[must_use]
    pub fn enabled_items(&self, category: Category) -> Vec<String> {
        self.items(category)
            .into_iter()
            .filter_map(|(item, enabled)| enabled.then_some(item))
            .collect()
    }

    #[must_use]
    pub fn counts(&self, category: Category) -> Counts {
        let items = self.items(category);
        Counts {
            total: items.len(),
            enabled: items.values().filter(|e| **e).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_policy_by_category() {
        let registry = EnabledRegistry::default();
        assert!(registry.is_enabled(Category::Plugins, "lint@tools"));
        assert!(registry.is_enabled(Category::McpServers, "github"));
        assert!(!registry.is_enabled(Category::Rules, "style"));
        assert_eq!(registry.state(Category::Rules, "style"), None);
    }

    #[test]
    fn test_set_enabled_and_counts() {
        let mut registry = EnabledRegistry::default();
        assert!(registry.set_enabled(Category::Skills, "deploy", true));
        assert!(!registry.set_enabled(Category::Skills, "deploy", true));
        assert!(registry.set_enabled(Category::Skills, "review", false));

        let counts = registry.counts(Category::Skills);
        assert_eq!(counts, Counts { total: 2, enabled: 1 });
        assert_eq!(counts.disabled(), 1);
        assert_eq!(registry.enabled_items(Category::Skills), vec!["deploy"]);
    }

    #[test]
    fn test_unknown_categories_survive_save() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("enabled.json");
        fs::write(&path, r#"{"statuslines": {"fancy": true}, "rules": {"a": false}}"#).unwrap();

        let mut registry = EnabledRegistry::load(&path).unwrap();
        assert_eq!(registry.state(Category::Rules, "a"), Some(false));
        registry.set_enabled(Category::Rules, "a", true);
        registry.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("statuslines"));
    }

    #[test]
    fn test_filter_flags_are_mutually_exclusive() {
        let err = EnabledFilter::from_flags(true, true).unwrap_err();
        assert_eq!(err.code(), "MUTUALLY_EXCLUSIVE_FLAGS");
        assert_eq!(EnabledFilter::from_flags(false, true).unwrap(), EnabledFilter::Disabled);
        assert!(EnabledFilter::All.matches(false));
        assert!(!EnabledFilter::Enabled.matches(false));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("output-styles".parse::<Category>().unwrap(), Category::OutputStyles);
        assert_eq!("mcp".parse::<Category>().unwrap(), Category::McpServers);
        assert!("widgets".parse::<Category>().is_err());
        assert!(Category::Hooks.is_extension());
        assert!(!Category::Plugins.is_extension());
    }
}
