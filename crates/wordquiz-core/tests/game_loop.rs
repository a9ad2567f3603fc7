//! Game loop integration tests.
//!
//! Drives a full engine over a ten-animal catalog with a paused tokio clock,
//! a recording voice and a counting cue.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use wordquiz_core::model::NarrationRequest;
use wordquiz_core::pool::pool_size;
use wordquiz_core::traits::{CueBackend, VoiceBackend};
use wordquiz_core::{
    Catalog, EngineConfig, GameConstants, GameEngine, GameItem, Phase, SessionState, Verdict,
};

const ANIMALS: [&str; 10] = [
    "cat", "dog", "cow", "pig", "hen", "owl", "fox", "bee", "ant", "yak",
];

#[derive(Debug, Clone)]
struct Utterance {
    text: String,
    /// Display text of the challenge on screen when speech began.
    visible: Option<String>,
}

#[derive(Default)]
struct RecordingVoice {
    log: Mutex<Vec<Utterance>>,
    view: Mutex<Option<watch::Receiver<SessionState>>>,
    latency: Duration,
    fail: bool,
}

impl RecordingVoice {
    fn watch(&self, engine: &GameEngine) {
        *self.view.lock().unwrap() = Some(engine.subscribe());
    }

    fn texts(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|u| u.text.clone()).collect()
    }
}

#[async_trait]
impl VoiceBackend for RecordingVoice {
    fn name(&self) -> &str {
        "recording"
    }

    async fn speak(&self, request: &NarrationRequest) -> anyhow::Result<()> {
        let visible = self.view.lock().unwrap().as_ref().and_then(|rx| {
            rx.borrow()
                .current_challenge
                .as_ref()
                .map(|c| c.display_text.clone())
        });
        self.log.lock().unwrap().push(Utterance {
            text: request.text.clone(),
            visible,
        });
        tokio::time::sleep(self.latency).await;
        if self.fail {
            anyhow::bail!("speaker unplugged");
        }
        Ok(())
    }
}

#[derive(Default)]
struct CountingCue(AtomicU32);

impl CueBackend for CountingCue {
    fn name(&self) -> &str {
        "counting"
    }

    fn play_success_cue(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn scenario_constants() -> GameConstants {
    GameConstants {
        base_count: 4,
        increment: 1,
        level_threshold: 3,
        options_count: 4,
        score_increment: 10,
        level_up_every: 1,
        ..Default::default()
    }
}

fn animals(constants: GameConstants) -> Arc<Catalog> {
    let items = ANIMALS
        .iter()
        .map(|name| GameItem::new(*name, name.to_uppercase()))
        .collect();
    Arc::new(Catalog::new("animals", "Animals", items).with_constants(constants))
}

struct Harness {
    engine: Arc<GameEngine>,
    voice: Arc<RecordingVoice>,
    cue: Arc<CountingCue>,
}

fn harness_with(constants: GameConstants, voice: RecordingVoice, seed: u64) -> Harness {
    let voice = Arc::new(voice);
    let cue = Arc::new(CountingCue::default());
    let voice_dyn: Arc<dyn VoiceBackend> = voice.clone();
    let cue_dyn: Arc<dyn CueBackend> = cue.clone();
    let engine = GameEngine::new(
        animals(constants),
        Some(voice_dyn),
        Some(cue_dyn),
        EngineConfig {
            seed: Some(seed),
            ..Default::default()
        },
    )
    .unwrap();
    voice.watch(&engine);
    Harness {
        engine: Arc::new(engine),
        voice,
        cue,
    }
}

fn harness(seed: u64) -> Harness {
    harness_with(scenario_constants(), RecordingVoice::default(), seed)
}

fn target_of(state: &SessionState) -> GameItem {
    state.current_challenge.clone().expect("no challenge on screen")
}

fn assert_invariants(state: &SessionState, constants: &GameConstants) {
    let pool = pool_size(state.level, constants, ANIMALS.len());
    assert_eq!(state.options.len(), constants.options_count.min(pool));
    let target = target_of(state);
    assert_eq!(
        state.options.iter().filter(|o| o.name == target.name).count(),
        1
    );
    let names: HashSet<&str> = state.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names.len(), state.options.len());
    for option in &state.options {
        let index = ANIMALS.iter().position(|a| *a == option.name).unwrap();
        assert!(index < pool, "{} is locked at level {}", option.name, state.level);
    }
}

#[tokio::test(start_paused = true)]
async fn start_installs_first_challenge_and_narrates() {
    let h = harness(1);
    h.engine.start_game().await.unwrap();

    let state = h.engine.state();
    assert!(state.is_playing);
    assert_eq!(state.phase, Phase::AwaitingAnswer);
    assert_eq!(state.score, 0);
    assert_eq!(state.level, 1);
    assert_invariants(&state, &scenario_constants());

    let target = target_of(&state);
    assert_eq!(
        h.voice.texts(),
        vec!["Let's play!".to_string(), target.display_text.clone()]
    );
}

#[tokio::test(start_paused = true)]
async fn click_before_start_is_ignored() {
    let h = harness(2);
    let verdict = h
        .engine
        .handle_item_click(&GameItem::new("cat", "CAT"))
        .await;
    assert_eq!(verdict, Verdict::Ignored);
    assert_eq!(h.engine.state(), SessionState::idle());
    assert!(h.voice.texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn wrong_click_only_repeats_narration() {
    let h = harness(3);
    h.engine.start_game().await.unwrap();
    let before = h.engine.state();
    let target = target_of(&before);

    // catalog[9] is locked at level 1, so it can never be the challenge.
    let yak = GameItem::new("yak", "YAK");
    assert_eq!(h.engine.handle_item_click(&yak).await, Verdict::Wrong);

    assert_eq!(h.engine.state(), before);
    assert_eq!(h.cue.0.load(Ordering::Relaxed), 0);
    let texts = h.voice.texts();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[1], target.display_text);
    assert_eq!(texts[2], target.display_text);
}

#[tokio::test(start_paused = true)]
async fn correct_click_celebrates_then_moves_on() {
    let h = harness(4);
    h.engine.start_game().await.unwrap();
    let target = target_of(&h.engine.state());

    let task = tokio::spawn({
        let engine = h.engine.clone();
        let target = target.clone();
        async move { engine.handle_item_click(&target).await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    let mid = h.engine.state();
    assert!(mid.show_celebration);
    assert_eq!(mid.phase, Phase::Celebrating);
    assert_eq!(mid.score, 10);
    assert_eq!(target_of(&mid), target, "old challenge stays during celebration");
    assert_eq!(h.cue.0.load(Ordering::Relaxed), 1);

    assert_eq!(task.await.unwrap(), Verdict::Correct);
    let after = h.engine.state();
    assert!(!after.show_celebration);
    assert_eq!(after.phase, Phase::AwaitingAnswer);
    assert_eq!(after.score, 10);
    assert_eq!(after.level, 2);
    assert_ne!(target_of(&after).name, target.name);
    assert_invariants(&after, &scenario_constants());
    assert_eq!(
        h.voice.texts().last().unwrap(),
        &target_of(&after).display_text
    );
}

#[tokio::test(start_paused = true)]
async fn correct_click_waits_dwell_and_repaint() {
    let h = harness(5);
    h.engine.start_game().await.unwrap();
    let target = target_of(&h.engine.state());

    let started = tokio::time::Instant::now();
    h.engine.handle_item_click(&target).await;
    let constants = scenario_constants();
    let minimum =
        Duration::from_millis(constants.next_item_delay_ms + constants.repaint_delay_ms);
    assert!(started.elapsed() >= minimum);
}

#[tokio::test(start_paused = true)]
async fn double_click_awards_once() {
    let h = harness(6);
    h.engine.start_game().await.unwrap();
    let target = target_of(&h.engine.state());

    let first = tokio::spawn({
        let engine = h.engine.clone();
        let target = target.clone();
        async move { engine.handle_item_click(&target).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(h.engine.handle_item_click(&target).await, Verdict::Ignored);
    assert_eq!(first.await.unwrap(), Verdict::Correct);
    assert_eq!(h.engine.state().score, 10);
    assert_eq!(h.cue.0.load(Ordering::Relaxed), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_during_celebration_stays_idle() {
    let h = harness(7);
    h.engine.start_game().await.unwrap();
    let target = target_of(&h.engine.state());

    let click = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.handle_item_click(&target).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.engine.reset_game();

    assert_eq!(click.await.unwrap(), Verdict::Correct);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.engine.state(), SessionState::idle());
}

#[tokio::test(start_paused = true)]
async fn reset_during_start_cue_drops_first_challenge() {
    let voice = RecordingVoice {
        latency: Duration::from_millis(800),
        ..Default::default()
    };
    let h = harness_with(scenario_constants(), voice, 8);

    let start = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.start_game().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.engine.state().phase, Phase::Starting);
    h.engine.reset_game();

    start.await.unwrap().unwrap();
    assert_eq!(h.engine.state(), SessionState::idle());
    assert_eq!(h.voice.texts(), vec!["Let's play!".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn hung_start_cue_does_not_hold_back_first_challenge() {
    let voice = RecordingVoice {
        latency: Duration::from_secs(3600),
        ..Default::default()
    };
    let h = harness_with(scenario_constants(), voice, 16);

    let start = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.start_game().await }
    });
    let deadline = scenario_constants().start_delay_ms + 50;
    tokio::time::sleep(Duration::from_millis(deadline)).await;

    let state = h.engine.state();
    assert_eq!(state.phase, Phase::AwaitingAnswer);
    assert_invariants(&state, &scenario_constants());
    let target = target_of(&state);
    assert_eq!(h.engine.handle_item_click(&target).await, Verdict::Correct);

    start.await.unwrap().unwrap();
    assert_eq!(h.engine.state().score, 10);
    // The next prompt hit the busy slot and the first one went stale.
    assert_eq!(h.voice.texts(), vec!["Let's play!".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn reset_from_any_phase_yields_idle_record() {
    let h = harness(9);
    h.engine.reset_game();
    assert_eq!(h.engine.state(), SessionState::idle());

    h.engine.start_game().await.unwrap();
    h.engine.reset_game();
    assert_eq!(h.engine.state(), SessionState::idle());

    h.engine.start_game().await.unwrap();
    for _ in 0..4 {
        let target = target_of(&h.engine.state());
        h.engine.handle_item_click(&target).await;
    }
    assert!(h.engine.state().score > 0);
    h.engine.reset_game();
    assert_eq!(h.engine.state(), SessionState::idle());
}

#[tokio::test(start_paused = true)]
async fn restart_clears_score_and_level() {
    let h = harness(10);
    h.engine.start_game().await.unwrap();
    for _ in 0..3 {
        let target = target_of(&h.engine.state());
        h.engine.handle_item_click(&target).await;
    }
    assert_eq!(h.engine.state().level, 4);

    h.engine.start_game().await.unwrap();
    let state = h.engine.state();
    assert_eq!(state.score, 0);
    assert_eq!(state.level, 1);
    assert_eq!(state.correct_answers, 0);
    assert_invariants(&state, &scenario_constants());
}

#[tokio::test(start_paused = true)]
async fn long_run_keeps_invariants_and_unlocks_items() {
    let constants = scenario_constants().without_delays();
    let h = harness_with(constants.clone(), RecordingVoice::default(), 11);
    h.engine.start_game().await.unwrap();

    let mut seen = HashSet::new();
    let mut previous = h.engine.state();
    for round in 0..120 {
        let target = target_of(&previous);
        if round % 4 == 3 {
            let wrong = previous
                .options
                .iter()
                .find(|o| o.name != target.name)
                .cloned()
                .unwrap();
            assert_eq!(h.engine.handle_item_click(&wrong).await, Verdict::Wrong);
            assert_eq!(h.engine.state(), previous);
            continue;
        }

        assert_eq!(h.engine.handle_item_click(&target).await, Verdict::Correct);
        let state = h.engine.state();
        assert_eq!(state.score, previous.score + constants.score_increment);
        assert!(state.level >= previous.level);
        assert_ne!(target_of(&state).name, target.name);
        assert_invariants(&state, &constants);
        seen.extend(state.options.iter().map(|o| o.name.clone()));
        previous = state;
    }

    assert_eq!(previous.correct_answers, 90);
    assert_eq!(previous.level, 91);
    assert_eq!(seen.len(), ANIMALS.len(), "every item should unlock eventually");
}

#[tokio::test(start_paused = true)]
async fn narration_follows_visible_challenge() {
    let h = harness(12);
    h.engine.start_game().await.unwrap();
    for round in 0..10 {
        let state = h.engine.state();
        let target = target_of(&state);
        if round % 3 == 0 {
            let wrong = state
                .options
                .iter()
                .find(|o| o.name != target.name)
                .cloned()
                .unwrap();
            h.engine.handle_item_click(&wrong).await;
        }
        h.engine.handle_item_click(&target).await;
    }

    let log = h.voice.log.lock().unwrap().clone();
    assert_eq!(log[0].text, "Let's play!");
    assert_eq!(log[0].visible, None);
    for utterance in &log[1..] {
        assert_eq!(
            utterance.visible.as_deref(),
            Some(utterance.text.as_str()),
            "narrated an item that was not on screen"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn narration_failures_never_alter_state() {
    let failing = harness_with(
        scenario_constants(),
        RecordingVoice {
            fail: true,
            ..Default::default()
        },
        13,
    );
    let silent = Arc::new(
        GameEngine::new(
            animals(scenario_constants()),
            None,
            None,
            EngineConfig {
                seed: Some(13),
                ..Default::default()
            },
        )
        .unwrap(),
    );

    failing.engine.start_game().await.unwrap();
    silent.start_game().await.unwrap();
    assert_eq!(failing.engine.state(), silent.state());

    for round in 0..15 {
        let state = silent.state();
        let target = target_of(&state);
        let pick = if round % 2 == 0 {
            target
        } else {
            state
                .options
                .iter()
                .find(|o| o.name != target.name)
                .cloned()
                .unwrap()
        };
        let a = failing.engine.handle_item_click(&pick).await;
        let b = silent.handle_item_click(&pick).await;
        assert_eq!(a, b);
        assert_eq!(failing.engine.state(), silent.state());
    }
    assert!(!failing.voice.texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn muted_engine_still_plays() {
    let h = harness(14);
    h.engine.narrator().set_enabled(false);
    h.engine.start_game().await.unwrap();
    let target = target_of(&h.engine.state());
    assert_eq!(h.engine.handle_item_click(&target).await, Verdict::Correct);
    assert!(h.voice.texts().is_empty());
    assert_eq!(h.cue.0.load(Ordering::Relaxed), 1);
    assert_eq!(h.engine.state().score, 10);
}

#[tokio::test(start_paused = true)]
async fn click_during_slow_narration_is_handled() {
    let voice = RecordingVoice {
        latency: Duration::from_secs(2),
        ..Default::default()
    };
    let h = harness_with(scenario_constants(), voice, 15);

    let start = tokio::spawn({
        let engine = h.engine.clone();
        async move { engine.start_game().await }
    });

    // Wait for the first challenge to appear while its narration is still running.
    let mut rx = h.engine.subscribe();
    let target = loop {
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        if let Some(target) = state.current_challenge {
            break target;
        }
    };

    assert_eq!(h.engine.handle_item_click(&target).await, Verdict::Correct);
    start.await.unwrap().unwrap();
    assert_eq!(h.engine.state().score, 10);
}
