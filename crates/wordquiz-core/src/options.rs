//! Challenge and distractor selection.
//!
//! All randomness flows through a caller-supplied [`Rng`], so seeded runs
//! replay exactly.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{GameConstants, GameItem};
use crate::pool::unlocked_pool;

/// A target item together with the option tiles shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub target: GameItem,
    pub options: Vec<GameItem>,
}

/// Build the option set for `correct` from `pool`.
///
/// Returns `correct` plus up to `options_count - 1` distinct other pool
/// members drawn uniformly without replacement, with the whole set shuffled.
/// When the pool is smaller than `options_count` every pool member is
/// returned.
pub fn select_options<R: Rng + ?Sized>(
    correct: &GameItem,
    pool: &[GameItem],
    options_count: usize,
    rng: &mut R,
) -> Vec<GameItem> {
    let others: Vec<&GameItem> = pool.iter().filter(|i| i.name != correct.name).collect();
    let wanted = options_count.saturating_sub(1).min(others.len());

    let mut options: Vec<GameItem> = others
        .choose_multiple(rng, wanted)
        .map(|item| (*item).clone())
        .collect();
    options.push(correct.clone());
    options.shuffle(rng);
    options
}

/// Draw the next target from `pool`.
///
/// The previous target is excluded whenever the pool has anything else to
/// offer, so a challenge only repeats when the pool holds a single item.
pub fn pick_target<R: Rng + ?Sized>(
    pool: &[GameItem],
    previous: Option<&GameItem>,
    rng: &mut R,
) -> Option<GameItem> {
    let candidates: Vec<&GameItem> = pool
        .iter()
        .filter(|item| previous.map_or(true, |p| p.name != item.name))
        .collect();

    match candidates.choose(rng) {
        Some(item) => Some((*item).clone()),
        None => pool.choose(rng).cloned(),
    }
}

/// Compute a full challenge for `level`: unlocked pool, target, options.
pub fn build_challenge<R: Rng + ?Sized>(
    items: &[GameItem],
    level: u32,
    constants: &GameConstants,
    previous: Option<&GameItem>,
    rng: &mut R,
) -> Option<Challenge> {
    let pool = unlocked_pool(items, level, constants);
    let target = pick_target(pool, previous, rng)?;
    let options = select_options(&target, pool, constants.options_count, rng);
    Some(Challenge { target, options })
}
