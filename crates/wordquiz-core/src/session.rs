//! Session state machine.
//!
//! `Session` owns the one mutable [`SessionState`] and is the only code that
//! changes it. Transitions are synchronous; the engine supplies challenges
//! and decides when each transition fires.
//!
//! ```text
//! Idle ─start─▶ Starting ─install_first─▶ AwaitingAnswer ◀─install_next─ Celebrating
//!                                             │  ▲                          ▲
//!                                             │  └── wrong (no mutation)    │
//!                                             └────────── award ────────────┘
//! any ─reset─▶ Idle
//! ```
//!
//! Every `begin_start`/`reset` advances an epoch. Delayed transitions carry
//! the epoch they were scheduled under and are refused once it is stale.

use uuid::Uuid;

use crate::model::{GameConstants, Phase, SessionState};
use crate::options::Challenge;

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    epoch: u64,
    id: Uuid,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::idle(),
            epoch: 0,
            id: Uuid::nil(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Identifier of the current run; nil until the first start.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Clear everything and enter `Starting`. Returns the new epoch.
    pub fn begin_start(&mut self) -> u64 {
        self.epoch += 1;
        self.id = Uuid::new_v4();
        self.state = SessionState {
            is_playing: true,
            phase: Phase::Starting,
            ..SessionState::idle()
        };
        self.epoch
    }

    /// Install the first challenge of a run started under `epoch`.
    pub fn install_first(&mut self, epoch: u64, challenge: Challenge) -> bool {
        if epoch != self.epoch || self.state.phase != Phase::Starting {
            return false;
        }
        self.state.current_challenge = Some(challenge.target);
        self.state.options = challenge.options;
        self.state.phase = Phase::AwaitingAnswer;
        true
    }

    /// Credit a correct answer and enter `Celebrating`.
    ///
    /// The current challenge stays on screen until [`Session::install_next`].
    pub fn award(&mut self, constants: &GameConstants) {
        self.state.score = self.state.score.saturating_add(constants.score_increment);
        self.state.correct_answers = self.state.correct_answers.saturating_add(1);
        let every = constants.level_up_every.max(1);
        if self.state.correct_answers % every == 0 {
            self.state.level = self.state.level.saturating_add(1);
        }
        self.state.show_celebration = true;
        self.state.phase = Phase::Celebrating;
    }

    /// Leave `Celebrating` with `next` on screen.
    ///
    /// With `next == None` the previous challenge is kept. Returns `false`
    /// (and changes nothing) when `epoch` is stale or no celebration is
    /// pending.
    pub fn install_next(&mut self, epoch: u64, next: Option<Challenge>) -> bool {
        if epoch != self.epoch || self.state.phase != Phase::Celebrating {
            return false;
        }
        if let Some(challenge) = next {
            self.state.current_challenge = Some(challenge.target);
            self.state.options = challenge.options;
        }
        self.state.show_celebration = false;
        self.state.phase = Phase::AwaitingAnswer;
        true
    }

    /// Return to the idle record from any phase.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.state = SessionState::idle();
    }
}
