//! The `wordquiz list-voices` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordquiz_voices::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    if config.voices.is_empty() {
        println!("No voices configured. Run `wordquiz init` to create a config file.");
    } else {
        let mut names: Vec<&String> = config.voices.keys().collect();
        names.sort();

        let mut table = Table::new();
        table.set_header(vec!["Name", "Type", "Target", "Default"]);
        for name in names {
            let voice = &config.voices[name];
            let is_default = config.default_voice.as_deref() == Some(name.as_str());
            table.add_row(vec![
                Cell::new(name),
                Cell::new(voice.kind()),
                Cell::new(voice.target()),
                Cell::new(if is_default { "*" } else { "" }),
            ]);
        }
        println!("{table}");
    }

    println!("Built-in voices: espeak, say, silent");
    if !config.narration_enabled {
        println!("Narration is switched off.");
    }

    Ok(())
}
