//! The `wordquiz play` command.
//!
//! A line-based terminal front end. Every state the engine publishes is
//! rendered; keyboard input is read concurrently with whatever the engine is
//! waiting on, so clicks can land mid-celebration or mid-narration exactly as
//! they would on a touch screen.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};

use wordquiz_core::{Catalog, EngineConfig, GameEngine, Phase, SessionState};
use wordquiz_voices::config::{create_cue, load_config_from, resolve_voice};

use super::load_catalog;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Pick(usize),
    Start,
    Reset,
    Repeat,
    ToggleMute,
    Quit,
    Help,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return Input::Pick(n);
    }
    match line.to_ascii_lowercase().as_str() {
        "s" | "start" => Input::Start,
        "r" | "reset" => Input::Reset,
        "p" | "repeat" => Input::Repeat,
        "m" | "mute" => Input::ToggleMute,
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Help,
    }
}

pub async fn execute(
    category: Option<String>,
    catalog_path: Option<PathBuf>,
    voice: Option<String>,
    mute: bool,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = load_catalog(category.as_deref(), catalog_path.as_deref(), &config)?;

    let voice = if mute {
        None
    } else {
        resolve_voice(&config, voice.as_deref())?
    };
    if let Some(voice) = &voice {
        tracing::info!(voice = voice.name(), "narrating");
    }

    let engine = GameEngine::new(
        Arc::new(catalog),
        voice,
        Some(create_cue(config.success_cue)),
        EngineConfig {
            narration_enabled: config.narration_enabled && !mute,
            narration_timeout: config.narration_timeout(),
            seed,
        },
    )?;
    let engine = &engine;

    println!(
        "{} ({} items). Keys: s start, 1-9 pick, p repeat, m mute, r reset, q quit.",
        engine.catalog().name,
        engine.catalog().items.len()
    );

    let mut updates = engine.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: FuturesUnordered<LocalBoxFuture<'_, ()>> = FuturesUnordered::new();
    let mut shown = updates.borrow_and_update().clone();
    render(&shown, engine);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                shown = updates.borrow_and_update().clone();
                render(&shown, engine);
            }
            Some(()) = pending.next(), if !pending.is_empty() => {}
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Start => pending.push(start(engine)),
                    Input::Reset => engine.reset_game(),
                    Input::Pick(n) => {
                        let state = engine.state();
                        match n.checked_sub(1).and_then(|i| state.options.get(i)).cloned() {
                            Some(item) => pending.push(
                                async move {
                                    engine.handle_item_click(&item).await;
                                }
                                .boxed_local(),
                            ),
                            None if state.is_playing => {
                                println!("Pick a number from 1 to {}.", state.options.len())
                            }
                            None => println!("Press s to start."),
                        }
                    }
                    Input::Repeat => {
                        if let Some(item) = engine.state().current_challenge {
                            pending.push(
                                async move {
                                    engine.narrate_item(&item).await;
                                }
                                .boxed_local(),
                            );
                        }
                    }
                    Input::ToggleMute => {
                        let narrator = engine.narrator();
                        narrator.set_enabled(!narrator.is_enabled());
                        println!(
                            "Narration {}.",
                            if narrator.is_enabled() { "on" } else { "off" }
                        );
                        render(&shown, engine);
                    }
                    Input::Help => println!("Keys: s start, 1-9 pick, p repeat, m mute, r reset, q quit."),
                }
            }
        }
    }

    let state = engine.state();
    println!("Bye! Final score {} at level {}.", state.score, state.level);
    Ok(())
}

fn start(engine: &GameEngine) -> LocalBoxFuture<'_, ()> {
    async move {
        if let Err(e) = engine.start_game().await {
            println!("Cannot start: {e}");
        }
    }
    .boxed_local()
}

fn render(state: &SessionState, engine: &GameEngine) {
    match state.phase {
        Phase::Idle => println!("Press s to start."),
        Phase::Starting => println!("Get ready..."),
        Phase::Celebrating => println!("  *** Well done! *** score {}", state.score),
        Phase::AwaitingAnswer => {
            println!();
            println!("Score {}  Level {}", state.score, state.level);
            // Without a voice the learner needs the word in writing.
            if !engine.narrator().is_enabled() {
                if let Some(target) = &state.current_challenge {
                    println!("{}", prompt_line(engine.catalog(), target));
                }
            }
            println!("{}", options_line(state));
        }
    }
}

fn prompt_line(catalog: &Catalog, target: &wordquiz_core::GameItem) -> String {
    catalog.script.prompt_for(&target.display_text)
}

fn options_line(state: &SessionState) -> String {
    state
        .options
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if item.visual_tag.is_empty() {
                format!("{}) {}", i + 1, item.display_text)
            } else {
                format!("{}) {} {}", i + 1, item.visual_tag, item.display_text)
            }
        })
        .collect::<Vec<_>>()
        .join("   ")
}
