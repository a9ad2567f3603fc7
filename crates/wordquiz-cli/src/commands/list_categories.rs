//! The `wordquiz list-categories` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordquiz_core::parser::load_catalog_directory;
use wordquiz_voices::config::load_config_from;

use super::catalog_dir;

pub fn execute(explicit_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dir = catalog_dir(explicit_dir, &config);
    let catalogs = load_catalog_directory(&dir)?;

    if catalogs.is_empty() {
        println!("No categories found in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Locale", "Items", "Options"]);
    for catalog in &catalogs {
        table.add_row(vec![
            Cell::new(&catalog.id),
            Cell::new(&catalog.name),
            Cell::new(&catalog.locale),
            Cell::new(catalog.items.len()),
            Cell::new(catalog.constants.options_count),
        ]);
    }
    println!("{table}");

    Ok(())
}
