//! wordquiz CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wordquiz", version, about = "Listen-and-pick vocabulary quiz for kids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a category in the terminal
    Play {
        /// Category id, looked up in the configured catalog directory
        #[arg(long, conflicts_with = "catalog")]
        category: Option<String>,

        /// Path to a catalog .toml file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Voice to narrate with (a configured name, or espeak/say/silent)
        #[arg(long)]
        voice: Option<String>,

        /// Start with narration switched off
        #[arg(long)]
        mute: bool,

        /// Seed for reproducible challenges
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Autoplay a category without delays or sound and print a summary
    Simulate {
        /// Category id, looked up in the configured catalog directory
        #[arg(long, conflicts_with = "catalog")]
        category: Option<String>,

        /// Path to a catalog .toml file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Number of clicks to make
        #[arg(long, default_value = "50")]
        rounds: u32,

        /// Probability that a click picks the right answer
        #[arg(long, default_value = "0.8")]
        accuracy: f64,

        /// Seed for challenges and simulated clicks
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate catalog TOML files
    Validate {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// List the categories in a catalog directory
    ListCategories {
        /// Directory to scan (defaults to `catalog_dir` from the config)
        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List configured voices
    ListVoices {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "wordquiz=warn".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            category,
            catalog,
            voice,
            mute,
            seed,
            config,
        } => commands::play::execute(category, catalog, voice, mute, seed, config).await,
        Commands::Simulate {
            category,
            catalog,
            rounds,
            accuracy,
            seed,
            config,
        } => commands::simulate::execute(category, catalog, rounds, accuracy, seed, config).await,
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::ListCategories {
            catalog_dir,
            config,
        } => commands::list_categories::execute(catalog_dir, config),
        Commands::ListVoices { config } => commands::list_voices::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
