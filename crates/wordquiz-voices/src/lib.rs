//! wordquiz-voices — Speech and cue backends.
//!
//! Implements the `VoiceBackend` and `CueBackend` traits for external TTS
//! programs, HTTP speech daemons and silent/bell fallbacks, and loads the
//! user configuration that picks between them.

pub mod command;
pub mod config;
pub mod cue;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{
    create_cue, create_voice, load_config, load_config_from, resolve_voice, CueKind, VoiceConfig,
    WordquizConfig,
};
pub use error::VoiceError;
