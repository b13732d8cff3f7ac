//! Queue shuffling
//!
//! Fisher-Yates over every entry except the one that is playing, which keeps
//! its slot so the "now playing" row does not jump when shuffle is enabled.

use mediacore_core::MediaItem;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `items` in place, leaving the entry at `pinned` where it is
///
/// `pinned` outside the slice is treated as "nothing pinned".
pub fn shuffle_pinned<R: Rng + ?Sized>(items: &mut Vec<MediaItem>, pinned: Option<usize>, rng: &mut R) {
    match pinned.filter(|&index| index < items.len()) {
        Some(index) => {
            let current = items.remove(index);
            items.shuffle(rng);
            items.insert(index, current);
        }
        None => items.shuffle(rng),
    }
}

/// Slot of `current` in `queue`
///
/// Prefers `cursor` when it already points at `current`, so duplicate
/// entries of the same track pin the one actually being played.
pub fn pinned_slot(queue: &[MediaItem], cursor: Option<usize>, current: Option<&MediaItem>) -> Option<usize> {
    let current = current?;
    cursor
        .filter(|&index| queue.get(index).is_some_and(|item| item.same_item(current)))
        .or_else(|| queue.iter().position(|item| item.same_item(current)))
}
