//! The `wordquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create wordquiz.toml
    if std::path::Path::new("wordquiz.toml").exists() {
        println!("wordquiz.toml already exists, skipping.");
    } else {
        std::fs::write("wordquiz.toml", SAMPLE_CONFIG)?;
        println!("Created wordquiz.toml");
    }

    // Create example catalog
    std::fs::create_dir_all("catalogs")?;
    let example_path = std::path::Path::new("catalogs/example.toml");
    if example_path.exists() {
        println!("catalogs/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalogs/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit wordquiz.toml to pick a voice");
    println!("  2. Run: wordquiz validate --catalog catalogs/example.toml");
    println!("  3. Run: wordquiz play --category pets");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordquiz configuration

default_voice = "espeak"
narration_enabled = true
narration_timeout_ms = 4000
success_cue = "bell"
catalog_dir = "./catalogs"

[voices.espeak]
type = "command"
program = "espeak-ng"
args = ["-v", "{locale}", "-s", "130", "{text}"]

[voices.daemon]
type = "http"
base_url = "http://localhost:5002"
api_key = "${WORDQUIZ_TTS_KEY}"
"#;

const EXAMPLE_CATALOG: &str = r#"[category]
id = "pets"
name = "Pets"
locale = "en-US"

[constants]
base_count = 3
increment = 1
level_threshold = 2
options_count = 3

[script]
start_cue = "Let's find some pets!"
prompt_template = "Where is the {item}?"

[[items]]
name = "cat"
visual_tag = "🐱"

[[items]]
name = "dog"
visual_tag = "🐶"

[[items]]
name = "fish"
visual_tag = "🐟"

[[items]]
name = "rabbit"
visual_tag = "🐰"

[[items]]
name = "hamster"
visual_tag = "🐹"
"#;
