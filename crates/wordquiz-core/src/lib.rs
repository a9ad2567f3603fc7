//! wordquiz-core — Adaptive vocabulary quiz engine.
//!
//! This crate defines the data model, the pure selection rules (pool sizing,
//! challenge and distractor picking, answer evaluation), the session state
//! machine, and the async engine that sequences narration around them. A
//! category is nothing but data: one [`model::Catalog`] per quiz.

pub mod answer;
pub mod engine;
pub mod error;
pub mod model;
pub mod narration;
pub mod options;
pub mod parser;
pub mod pool;
pub mod session;
pub mod traits;

pub use answer::Verdict;
pub use engine::{EngineConfig, GameEngine};
pub use error::GameError;
pub use model::{Catalog, GameConstants, GameItem, Phase, SessionState};
pub use narration::{NarrationOutcome, Narrator, SkipReason};
