//! Core data model types for wordquiz.
//!
//! These are the fundamental types shared by the engine, the catalog parser
//! and every front end: vocabulary items, per-category constants, catalogs
//! and the session record that renderers draw from.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single learnable vocabulary item.
///
/// `name` is the stable identity key; two items are "the same answer" iff
/// their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameItem {
    /// Stable identity key (e.g. "lion").
    pub name: String,
    /// Text shown on the option tile (e.g. "Lion").
    pub display_text: String,
    /// Accessible description of the visual.
    #[serde(default)]
    pub alt_text: String,
    /// Visual handle the renderer resolves (emoji, icon id, ...).
    #[serde(default)]
    pub visual_tag: String,
    /// Spoken text used instead of `display_text`.
    #[serde(default)]
    pub pronunciation_override: Option<String>,
}

impl GameItem {
    pub fn new(name: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_text: display_text.into(),
            alt_text: String::new(),
            visual_tag: String::new(),
            pronunciation_override: None,
        }
    }

    pub fn with_visual(mut self, visual_tag: impl Into<String>) -> Self {
        self.visual_tag = visual_tag.into();
        self
    }

    pub fn with_pronunciation(mut self, spoken: impl Into<String>) -> Self {
        self.pronunciation_override = Some(spoken.into());
        self
    }
}

/// Tuning knobs for one category. Immutable for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConstants {
    /// Items unlocked at level 1.
    #[serde(default = "default_base_count")]
    pub base_count: usize,
    /// Items unlocked per level step.
    #[serde(default = "default_increment")]
    pub increment: usize,
    /// Levels per unlock step.
    #[serde(default = "default_level_threshold")]
    pub level_threshold: u32,
    /// Option tiles per challenge.
    #[serde(default = "default_options_count")]
    pub options_count: usize,
    /// Pause between starting a run and showing the first challenge. The
    /// start cue plays during it but does not extend it.
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
    /// Celebration dwell before the next challenge is installed.
    #[serde(default = "default_next_item_delay_ms")]
    pub next_item_delay_ms: u64,
    /// Pause between publishing a challenge and narrating it.
    #[serde(default = "default_repaint_delay_ms")]
    pub repaint_delay_ms: u64,
    /// Points awarded per correct answer.
    #[serde(default = "default_score_increment")]
    pub score_increment: u32,
    /// Correct answers needed per level-up.
    #[serde(default = "default_level_up_every")]
    pub level_up_every: u32,
}

fn default_base_count() -> usize {
    4
}
fn default_increment() -> usize {
    1
}
fn default_level_threshold() -> u32 {
    3
}
fn default_options_count() -> usize {
    4
}
fn default_start_delay_ms() -> u64 {
    600
}
fn default_next_item_delay_ms() -> u64 {
    1500
}
fn default_repaint_delay_ms() -> u64 {
    150
}
fn default_score_increment() -> u32 {
    10
}
fn default_level_up_every() -> u32 {
    1
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            base_count: default_base_count(),
            increment: default_increment(),
            level_threshold: default_level_threshold(),
            options_count: default_options_count(),
            start_delay_ms: default_start_delay_ms(),
            next_item_delay_ms: default_next_item_delay_ms(),
            repaint_delay_ms: default_repaint_delay_ms(),
            score_increment: default_score_increment(),
            level_up_every: default_level_up_every(),
        }
    }
}

impl GameConstants {
    /// Same constants with every delay set to zero (simulation, tests).
    pub fn without_delays(mut self) -> Self {
        self.start_delay_ms = 0;
        self.next_item_delay_ms = 0;
        self.repaint_delay_ms = 0;
        self
    }

    /// Settings the engine cannot run with, in field order.
    pub fn problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.base_count == 0 {
            problems.push("base_count must be at least 1");
        }
        if self.level_threshold == 0 {
            problems.push("level_threshold must be at least 1");
        }
        if self.options_count == 0 {
            problems.push("options_count must be at least 1");
        }
        if self.level_up_every == 0 {
            problems.push("level_up_every must be at least 1");
        }
        problems
    }
}

/// Spoken lines a category uses around the game loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationScript {
    /// Spoken once when a game starts.
    #[serde(default = "default_start_cue")]
    pub start_cue: String,
    /// Challenge prompt; `{item}` is replaced by the spoken item text.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
}

fn default_start_cue() -> String {
    "Let's play!".to_string()
}

fn default_prompt_template() -> String {
    "{item}".to_string()
}

impl Default for NarrationScript {
    fn default() -> Self {
        Self {
            start_cue: default_start_cue(),
            prompt_template: default_prompt_template(),
        }
    }
}

impl NarrationScript {
    pub fn prompt_for(&self, spoken_item: &str) -> String {
        self.prompt_template.replace("{item}", spoken_item)
    }
}

/// One quiz category: ordered items plus everything the engine is
/// parameterized over.
///
/// Item order is unlock order: the pool at any level is a prefix of `items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Unique identifier (e.g. "animals").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// BCP 47 locale narration is spoken in.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Items in unlock order.
    #[serde(default)]
    pub items: Vec<GameItem>,
    /// `name` → spoken text. Takes precedence over per-item overrides.
    #[serde(default)]
    pub pronunciations: HashMap<String, String>,
    #[serde(default)]
    pub constants: GameConstants,
    #[serde(default)]
    pub script: NarrationScript,
}

pub fn default_locale() -> String {
    "en-US".to_string()
}

impl Catalog {
    pub fn new(id: impl Into<String>, name: impl Into<String>, items: Vec<GameItem>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            locale: default_locale(),
            items,
            pronunciations: HashMap::new(),
            constants: GameConstants::default(),
            script: NarrationScript::default(),
        }
    }

    pub fn with_constants(mut self, constants: GameConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Text narration should speak for `item`.
    ///
    /// Lookup order: catalog pronunciation map, the item's own override,
    /// then its display text.
    pub fn spoken_text<'a>(&'a self, item: &'a GameItem) -> &'a str {
        self.pronunciations
            .get(&item.name)
            .map(String::as_str)
            .or(item.pronunciation_override.as_deref())
            .unwrap_or(&item.display_text)
    }
}

/// Where a session sits in the game loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Starting,
    AwaitingAnswer,
    Celebrating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Starting => write!(f, "starting"),
            Phase::AwaitingAnswer => write!(f, "awaiting-answer"),
            Phase::Celebrating => write!(f, "celebrating"),
        }
    }
}

/// The session record renderers draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_playing: bool,
    pub current_challenge: Option<GameItem>,
    pub options: Vec<GameItem>,
    pub score: u32,
    pub level: u32,
    pub show_celebration: bool,
    /// Correct answers since the last start.
    pub correct_answers: u32,
    pub phase: Phase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

impl SessionState {
    /// The record a fresh or reset session holds.
    pub fn idle() -> Self {
        Self {
            is_playing: false,
            current_challenge: None,
            options: Vec::new(),
            score: 0,
            level: 1,
            show_celebration: false,
            correct_answers: 0,
            phase: Phase::Idle,
        }
    }
}

/// A spoken-word request handed to a voice backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationRequest {
    pub text: String,
    pub locale: String,
}
