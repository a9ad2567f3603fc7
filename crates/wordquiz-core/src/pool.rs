//! Pool sizing: how much of a catalog is unlocked at a given level.

use crate::model::{GameConstants, GameItem};

/// Number of catalog items unlocked at `level`.
///
/// `min(base_count + floor((level - 1) / level_threshold) * increment, catalog_size)`
///
/// Levels below 1 are treated as 1. Arithmetic saturates, so absurd levels
/// still yield `catalog_size`.
pub fn pool_size(level: u32, constants: &GameConstants, catalog_size: usize) -> usize {
    let threshold = constants.level_threshold.max(1);
    let steps = (level.max(1) - 1) / threshold;
    let unlocked = constants
        .base_count
        .saturating_add((steps as usize).saturating_mul(constants.increment));
    unlocked.min(catalog_size)
}

/// The unlocked prefix of `items` at `level`.
pub fn unlocked_pool<'a>(
    items: &'a [GameItem],
    level: u32,
    constants: &GameConstants,
) -> &'a [GameItem] {
    &items[..pool_size(level, constants, items.len())]
}
