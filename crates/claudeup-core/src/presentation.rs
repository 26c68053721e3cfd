//! Grouping of profile listings for display
//!
//! Pure functions over repository summaries: sections, path-prefix groups
//! and hidden-profile filtering.

use crate::profile::name::{group_prefix, is_hidden};
use serde::Serialize;
use std::collections::BTreeMap;

/// One profile as the repository reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub description: String,
    /// A built-in definition exists
    pub builtin: bool,
    /// A built-in definition exists and a user overlay shadows it
    pub customized: bool,
}

/// Listing section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    BuiltIn,
    User,
}

impl Section {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::BuiltIn => "Built-in profiles",
            Self::User => "Your profiles",
        }
    }
}

/// Profiles sharing a path prefix; `prefix` is `None` for ungrouped names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileGroup {
    pub prefix: Option<String>,
    pub profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingSection {
    pub section: Section,
    pub groups: Vec<ProfileGroup>,
}

/// A grouped listing ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileListing {
    pub sections: Vec<ListingSection>,
    /// Hidden profiles left out of this listing
    pub hidden_count: usize,
}

impl ProfileListing {
    /// Every listed name, in display order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| &s.groups)
            .flat_map(|g| &g.profiles)
            .map(|p| p.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Hint shown when hidden profiles were filtered out
    #[must_use]
    pub fn hidden_hint(&self) -> Option<String> {
        let count = self.hidden_count;
        (count > 0).then(|| format!("{count} hidden (use --all to show)"))
    }
}

/// Partition summaries into sections and prefix groups.
///
/// Section placement follows `builtin` only: a customized built-in stays in
/// the built-in section. Ungrouped names come first; groups sort by their
/// top-level segment, then by full prefix.
#[must_use]
pub fn build_listing(summaries: Vec<ProfileSummary>, include_hidden: bool) -> ProfileListing {
    let mut hidden_count = 0;
    let mut by_section: BTreeMap<u8, Vec<ProfileSummary>> = BTreeMap::new();

    for summary in summaries {
        if !include_hidden && is_hidden(&summary.name) {
            hidden_count += 1;
            continue;
        }
        let key = u8::from(!summary.builtin);
        by_section.entry(key).or_default().push(summary);
    }

    let sections = by_section
        .into_iter()
        .map(|(key, profiles)| ListingSection {
            section: if key == 0 { Section::BuiltIn } else { Section::User },
            groups: group_profiles(profiles),
        })
        .collect();

    ProfileListing {
        sections,
        hidden_count,
    }
}

fn group_profiles(profiles: Vec<ProfileSummary>) -> Vec<ProfileGroup> {
    let mut groups: BTreeMap<(u8, String, String), Vec<ProfileSummary>> = BTreeMap::new();
    for profile in profiles {
        let key = match group_prefix(&profile.name) {
            None => (0, String::new(), String::new()),
            Some(prefix) => {
                let top = prefix.split('/').next().unwrap_or(prefix);
                (1, top.to_string(), prefix.to_string())
            }
        };
        groups.entry(key).or_default().push(profile);
    }

    groups
        .into_iter()
        .map(|((kind, _, prefix), mut profiles)| {
            profiles.sort_by(|a, b| a.name.cmp(&b.name));
            ProfileGroup {
                prefix: (kind == 1).then_some(prefix),
                profiles,
            }
        })
        .collect()
}
