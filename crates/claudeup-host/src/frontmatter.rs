//! YAML frontmatter of markdown extensions (agents, rules, skills, commands)

use crate::error::{HostError, HostResult};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct ExtensionFrontmatter {
    name: Option<String>,
    description: Option<String>,
}

/// Display metadata of a markdown extension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Parse the frontmatter of a markdown document.
///
/// Documents without frontmatter yield empty metadata.
pub fn parse_meta(content: &str) -> HostResult<ExtensionMeta> {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(content);
    let Some(data) = parsed.data else {
        return Ok(ExtensionMeta::default());
    };
    let fm: ExtensionFrontmatter = data
        .deserialize()
        .map_err(|e| HostError::Frontmatter(e.to_string()))?;
    Ok(ExtensionMeta {
        name: fm.name,
        description: fm.description.map(|d| d.trim().to_string()),
    })
}

/// Read metadata for an extension item, which is either a markdown file or
/// a directory holding `SKILL.md` / `README.md`
pub fn read_meta(path: &Path) -> HostResult<ExtensionMeta> {
    let file = if path.is_dir() {
        ["SKILL.md", "README.md"]
            .iter()
            .map(|name| path.join(name))
            .find(|p| p.is_file())
    } else if path.extension().is_some_and(|ext| ext == "md") {
        Some(path.to_path_buf())
    } else {
        None
    };
    let Some(file) = file else {
        return Ok(ExtensionMeta::default());
    };
    let content = fs::read_to_string(&file).map_err(|e| HostError::io(&file, e))?;
    parse_meta(&content)
}
