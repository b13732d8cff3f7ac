//! Playback queue with cursor
//!
//! Holds the play order, the pre-shuffle order and a cursor into the play
//! order. Every operation keeps the cursor inside the queue (`None` only when
//! the queue is empty), and where possible keeps it on the same logical track.

use crate::shuffle::{pinned_slot, shuffle_pinned};
use mediacore_core::MediaItem;
use rand::Rng;

/// Ordered queue plus the cursor of the current entry
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Play order
    items: Vec<MediaItem>,

    /// Order before shuffle (for restoring)
    original: Vec<MediaItem>,

    /// Cursor into `items`
    index: Option<usize>,

    is_shuffled: bool,
}

/// Whether both lists hold the same ids with the same multiplicity
fn same_entries(a: &[MediaItem], b: &[MediaItem]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(|item| item.id.as_str()).collect();
    let mut b: Vec<&str> = b.iter().map(|item| item.id.as_str()).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted parts
    ///
    /// The cursor is not persisted: it lands on `current` if the queue
    /// contains it, otherwise on the first entry. An original order that is
    /// not a permutation of `items` is replaced by `items` and the shuffle
    /// flag dropped, since the pre-shuffle order is lost.
    pub fn restore(
        items: Vec<MediaItem>,
        original: Vec<MediaItem>,
        is_shuffled: bool,
        current: Option<&MediaItem>,
    ) -> Self {
        let index = pinned_slot(&items, None, current).or(if items.is_empty() { None } else { Some(0) });
        let (original, is_shuffled) = if same_entries(&items, &original) {
            (original, is_shuffled)
        } else {
            (items.clone(), false)
        };
        Self {
            items,
            original,
            index,
            is_shuffled,
        }
    }

    /// Replace both orders; cursor goes to the first entry
    pub fn set(&mut self, items: Vec<MediaItem>) {
        self.original.clone_from(&items);
        self.index = if items.is_empty() { None } else { Some(0) };
        self.items = items;
        self.is_shuffled = false;
    }

    /// Append to the end of both orders
    pub fn push_back(&mut self, track: MediaItem) {
        self.original.push(track.clone());
        self.items.push(track);
        self.settle_empty_cursor();
    }

    /// Insert right after the cursor (at the front of an empty queue)
    ///
    /// In the original order the track goes right after the current entry,
    /// so un-shuffling keeps it next in line.
    pub fn insert_next(&mut self, track: MediaItem) {
        let at = self.index.map_or(0, |index| index + 1);

        if self.is_shuffled {
            let at_original = self
                .current()
                .and_then(|current| self.original.iter().position(|item| item.same_item(current)))
                .map_or(self.original.len(), |position| position + 1);
            self.original.insert(at_original, track.clone());
        } else {
            self.original.insert(at.min(self.original.len()), track.clone());
        }

        self.items.insert(at, track);
        self.settle_empty_cursor();
    }

    /// Remove every entry with `id` from both orders
    ///
    /// The cursor moves back by the number of removed entries that sat before
    /// it. Returns how many entries left the play order.
    pub fn remove_id(&mut self, id: &str) -> usize {
        let removed_before = self.index.map_or(0, |index| {
            self.items[..index].iter().filter(|item| item.id == id).count()
        });
        let len_before = self.items.len();

        self.items.retain(|item| item.id != id);
        self.original.retain(|item| item.id != id);

        self.index = match self.index {
            _ if self.items.is_empty() => None,
            Some(index) => Some(index.saturating_sub(removed_before).min(self.items.len() - 1)),
            None => Some(0),
        };

        len_before - self.items.len()
    }

    /// Move one entry from `from` to `to`
    ///
    /// `from` out of range is a no-op; `to` is clamped to the last slot.
    /// Returns `false` when nothing moved.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() {
            return false;
        }
        let to = to.min(self.items.len() - 1);
        if from == to {
            return false;
        }

        let track = self.items.remove(from);
        self.items.insert(to, track);

        if let Some(index) = self.index {
            self.index = Some(if from == index {
                to
            } else if from < index && to >= index {
                index - 1
            } else if from > index && to <= index {
                index + 1
            } else {
                index
            });
        }

        // A manual reorder becomes the new "original" unless shuffled
        if !self.is_shuffled {
            self.original.clone_from(&self.items);
        }
        true
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.items.clear();
        self.original.clear();
        self.index = None;
        self.is_shuffled = false;
    }

    /// Move the cursor forward
    ///
    /// At the end, wraps to the first entry when `wrap` is set, otherwise
    /// returns `None` and leaves the cursor alone.
    pub fn advance(&mut self, wrap: bool) -> Option<&MediaItem> {
        let index = self.index?;
        let next = if index + 1 < self.items.len() {
            index + 1
        } else if wrap {
            0
        } else {
            return None;
        };
        self.index = Some(next);
        self.items.get(next)
    }

    /// Move the cursor back
    ///
    /// At the start, wraps to the last entry when `wrap` is set, otherwise
    /// stays on the first entry.
    pub fn retreat(&mut self, wrap: bool) -> Option<&MediaItem> {
        let index = self.index?;
        let previous = match index {
            0 if wrap => self.items.len() - 1,
            0 => 0,
            _ => index - 1,
        };
        self.index = Some(previous);
        self.items.get(previous)
    }

    /// Put the cursor on `index`; `None` if out of range
    pub fn jump(&mut self, index: usize) -> Option<&MediaItem> {
        let track = self.items.get(index)?;
        self.index = Some(index);
        Some(track)
    }

    /// Shuffle the play order, keeping `current` in its slot
    pub fn shuffle<R: Rng + ?Sized>(&mut self, current: Option<&MediaItem>, rng: &mut R) {
        if !self.is_shuffled {
            self.original.clone_from(&self.items);
        }
        let pinned = pinned_slot(&self.items, self.index, current);
        shuffle_pinned(&mut self.items, pinned, rng);
        self.is_shuffled = true;
    }

    /// Restore the pre-shuffle order
    ///
    /// The cursor follows `current` into the restored order, or falls back
    /// to the first entry if `current` is no longer queued.
    pub fn unshuffle(&mut self, current: Option<&MediaItem>) {
        self.items.clone_from(&self.original);
        self.is_shuffled = false;
        self.index = if self.items.is_empty() {
            None
        } else {
            Some(pinned_slot(&self.items, None, current).unwrap_or(0))
        };
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&MediaItem> {
        self.index.and_then(|index| self.items.get(index))
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn original(&self) -> &[MediaItem] {
        &self.original
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn settle_empty_cursor(&mut self) {
        if self.index.is_none() && !self.items.is_empty() {
            self.index = Some(0);
        }
    }
}
