//! The `wordquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalogs = if catalog_path.is_dir() {
        wordquiz_core::parser::load_catalog_directory(&catalog_path)?
    } else {
        vec![wordquiz_core::parser::parse_catalog(&catalog_path)?]
    };

    let mut total_warnings = 0;

    for catalog in &catalogs {
        println!(
            "Category: {} [{}] ({} items, {})",
            catalog.name,
            catalog.id,
            catalog.items.len(),
            catalog.locale
        );

        let warnings = wordquiz_core::parser::validate_catalog(catalog);
        for w in &warnings {
            let prefix = w
                .item
                .as_ref()
                .map(|name| format!("  [{name}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All catalogs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
