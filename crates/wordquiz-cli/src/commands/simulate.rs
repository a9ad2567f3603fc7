//! The `wordquiz simulate` command.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use wordquiz_core::pool::pool_size;
use wordquiz_core::{EngineConfig, GameEngine, Verdict};
use wordquiz_voices::config::load_config_from;

use super::load_catalog;

#[derive(Debug, Default)]
struct Summary {
    correct: u32,
    wrong: u32,
    ignored: u32,
    targets: HashSet<String>,
}

pub async fn execute(
    category: Option<String>,
    catalog_path: Option<PathBuf>,
    rounds: u32,
    accuracy: f64,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if !(0.0..=1.0).contains(&accuracy) {
        anyhow::bail!("--accuracy must be between 0 and 1, got {accuracy}");
    }

    let config = load_config_from(config_path.as_deref())?;
    let mut catalog = load_catalog(category.as_deref(), catalog_path.as_deref(), &config)?;
    catalog.constants = catalog.constants.clone().without_delays();

    let engine = GameEngine::new(
        Arc::new(catalog),
        None,
        None,
        EngineConfig {
            narration_enabled: false,
            seed,
            ..Default::default()
        },
    )?;
    let mut clicker = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    engine.start_game().await?;

    let mut summary = Summary::default();
    for _ in 0..rounds {
        let state = engine.state();
        let Some(target) = state.current_challenge.clone() else {
            break;
        };
        summary.targets.insert(target.name.clone());

        let wrong: Vec<_> = state
            .options
            .iter()
            .filter(|o| o.name != target.name)
            .collect();
        let pick = if clicker.gen_bool(accuracy) {
            &target
        } else {
            wrong.choose(&mut clicker).copied().unwrap_or(&target)
        };

        match engine.handle_item_click(pick).await {
            Verdict::Correct => summary.correct += 1,
            Verdict::Wrong => summary.wrong += 1,
            Verdict::Ignored => summary.ignored += 1,
        }
    }

    let state = engine.state();
    let catalog = engine.catalog();
    let unlocked = pool_size(state.level, &catalog.constants, catalog.items.len());
    tracing::debug!(?summary, "simulation finished");

    print_summary(
        &catalog.name,
        rounds,
        &summary,
        state.score,
        state.level,
        unlocked,
        catalog.items.len(),
    );
    Ok(())
}

fn print_summary(
    category: &str,
    rounds: u32,
    summary: &Summary,
    score: u32,
    level: u32,
    unlocked: usize,
    total: usize,
) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Category", category.to_string()),
        ("Rounds", rounds.to_string()),
        ("Correct", summary.correct.to_string()),
        ("Wrong", summary.wrong.to_string()),
        ("Final score", score.to_string()),
        ("Final level", level.to_string()),
        ("Unlocked items", format!("{unlocked}/{total}")),
        ("Distinct targets", summary.targets.len().to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }
    if summary.ignored > 0 {
        table.add_row(vec![Cell::new("Ignored"), Cell::new(summary.ignored)]);
    }

    println!("{table}");
}
