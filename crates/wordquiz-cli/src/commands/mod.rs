pub mod init;
pub mod list_categories;
pub mod list_voices;
pub mod play;
pub mod simulate;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use wordquiz_core::parser::{find_catalog, parse_catalog};
use wordquiz_core::Catalog;
use wordquiz_voices::WordquizConfig;

/// Load the catalog named on the command line: an explicit file wins over a
/// category id looked up in the configured catalog directory.
pub fn load_catalog(
    category: Option<&str>,
    catalog: Option<&Path>,
    config: &WordquizConfig,
) -> Result<Catalog> {
    match (catalog, category) {
        (Some(path), _) => parse_catalog(path),
        (None, Some(id)) => find_catalog(&config.catalog_dir, id),
        (None, None) => anyhow::bail!("pass --category <id> or --catalog <file>"),
    }
}

/// The directory `list-categories` scans.
pub fn catalog_dir(explicit: Option<PathBuf>, config: &WordquizConfig) -> PathBuf {
    explicit.unwrap_or_else(|| config.catalog_dir.clone())
}
