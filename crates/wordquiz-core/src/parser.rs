//! TOML catalog parser.
//!
//! Loads category catalogs from TOML files and directories, and offers an
//! opt-in validation pass. The engine itself never validates catalogs.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{default_locale, Catalog, GameConstants, GameItem, NarrationScript};

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    category: TomlCategoryHeader,
    #[serde(default)]
    constants: GameConstants,
    #[serde(default)]
    script: NarrationScript,
    #[serde(default)]
    pronunciations: HashMap<String, String>,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlCategoryHeader {
    id: String,
    name: String,
    #[serde(default = "default_locale")]
    locale: String,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    name: String,
    #[serde(default)]
    display_text: Option<String>,
    #[serde(default)]
    alt_text: Option<String>,
    #[serde(default)]
    visual_tag: String,
    #[serde(default)]
    pronunciation: Option<String>,
}

/// Parse a single TOML file into a `Catalog`.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a `Catalog` (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let items = parsed
        .items
        .into_iter()
        .map(|item| {
            let display_text = item.display_text.unwrap_or_else(|| capitalize(&item.name));
            GameItem {
                alt_text: item.alt_text.unwrap_or_else(|| display_text.clone()),
                display_text,
                name: item.name,
                visual_tag: item.visual_tag,
                pronunciation_override: item.pronunciation,
            }
        })
        .collect();

    Ok(Catalog {
        id: parsed.category.id,
        name: parsed.category.name,
        locale: parsed.category.locale,
        items,
        pronunciations: parsed.pronunciations,
        constants: parsed.constants,
        script: parsed.script,
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Recursively load all `.toml` catalog files from a directory.
///
/// Files that fail to parse are skipped with a warning. Results are sorted
/// by catalog id.
pub fn load_catalog_directory(dir: &Path) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            catalogs.extend(load_catalog_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_catalog(&path) {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    catalogs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(catalogs)
}

/// Find a catalog by id in `dir`.
pub fn find_catalog(dir: &Path, id: &str) -> Result<Catalog> {
    let catalogs = load_catalog_directory(dir)?;
    let known: Vec<String> = catalogs.iter().map(|c| c.id.clone()).collect();
    catalogs
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "category '{}' not found in {}. Available: {:?}",
                id,
                dir.display(),
                known
            )
        })
}

/// A validation warning for a catalog.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item name (if applicable).
    pub item: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for common issues.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings: Vec<ValidationWarning> = catalog
        .constants
        .problems()
        .into_iter()
        .map(|problem| ValidationWarning {
            item: None,
            message: format!("{problem}; the game refuses to start"),
        })
        .collect();

    if catalog.items.is_empty() {
        warnings.push(ValidationWarning {
            item: None,
            message: "catalog has no items".into(),
        });
        return warnings;
    }

    let mut seen = HashSet::new();
    for item in &catalog.items {
        if !seen.insert(item.name.as_str()) {
            warnings.push(ValidationWarning {
                item: Some(item.name.clone()),
                message: format!("duplicate item name: {}", item.name),
            });
        }
        if item.display_text.trim().is_empty() {
            warnings.push(ValidationWarning {
                item: Some(item.name.clone()),
                message: "display_text is empty".into(),
            });
        }
    }

    let constants = &catalog.constants;
    if constants.options_count > catalog.items.len() {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "options_count {} exceeds catalog size {}",
                constants.options_count,
                catalog.items.len()
            ),
        });
    }
    if constants.base_count > catalog.items.len() {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "base_count {} exceeds catalog size {}",
                constants.base_count,
                catalog.items.len()
            ),
        });
    }
    if constants.base_count < constants.options_count {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "level 1 unlocks {} items but shows {} options",
                constants.base_count, constants.options_count
            ),
        });
    }

    let mut unknown: Vec<&String> = catalog
        .pronunciations
        .keys()
        .filter(|name| !seen.contains(name.as_str()))
        .collect();
    unknown.sort();
    for name in unknown {
        warnings.push(ValidationWarning {
            item: Some(name.clone()),
            message: format!("pronunciation given for unknown item: {name}"),
        });
    }

    warnings
}
