//! Answer evaluation.

use crate::model::{GameItem, Phase, SessionState};

/// What a click on an option tile means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Selection names the current challenge.
    Correct,
    /// Selection names something else; the challenge stays.
    Wrong,
    /// No challenge is on screen, or a transition is already under way.
    Ignored,
}

/// Compare `selected` against the challenge in `state` by identity key.
pub fn evaluate(state: &SessionState, selected: &GameItem) -> Verdict {
    let Some(challenge) = &state.current_challenge else {
        return Verdict::Ignored;
    };
    // A correct answer is already being celebrated.
    if state.phase == Phase::Celebrating {
        return Verdict::Ignored;
    }
    if selected.name == challenge.name {
        Verdict::Correct
    } else {
        Verdict::Wrong
    }
}
