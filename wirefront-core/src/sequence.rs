//! Ordered sequence container
//!
//! A doubly linked list stored in a slot arena. Entries are addressed through
//! [`Cursor`] values that stay valid until their entry is removed or the
//! sequence is cleared. Every sequence carries a unique id, so a cursor taken
//! from one sequence is rejected by every other sequence.
//!
//! The container is used as the growable buffer behind tokenizing and
//! parsing: characters of the token being assembled, parsed vertices and
//! edge indices all live in a `Sequence` until they are flushed.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

/// Hook invoked with every payload that leaves a sequence
pub type Cleanup<T> = Box<dyn FnMut(T) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotRef {
    index: usize,
    generation: u32,
}

/// Position handle into a [`Sequence`]
///
/// A cursor is a plain value. Holding one does not borrow the sequence, and a
/// cursor whose entry has been removed is simply rejected afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    owner: u64,
    slot: Option<SlotRef>,
}

impl Cursor {
    /// The "no position" cursor.
    ///
    /// Returned for empty sequences and when moving past either end.
    /// Inserting after it inserts at the head.
    pub const NONE: Cursor = Cursor {
        owner: 0,
        slot: None,
    };

    /// Check whether this cursor is the "no position" value
    pub fn is_none(&self) -> bool {
        self.slot.is_none()
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::NONE
    }
}

struct Entry<T> {
    payload: T,
    prev: Option<usize>,
    next: Option<usize>,
}

enum SlotState<T> {
    Occupied(Entry<T>),
    Vacant { next_free: Option<usize> },
}

struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// An ordered, cursor-addressable sequence of payloads
pub struct Sequence<T> {
    id: u64,
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    first: Option<usize>,
    last: Option<usize>,
    len: usize,
    cleanup: Option<Cleanup<T>>,
}

impl<T> Sequence<T> {
    /// Create a new empty sequence; removed payloads are dropped
    pub fn new() -> Self {
        Self {
            id: NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free_head: None,
            first: None,
            last: None,
            len: 0,
            cleanup: None,
        }
    }

    /// Create a new empty sequence that hands every removed payload to `cleanup`
    pub fn with_cleanup<F>(cleanup: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let mut sequence = Self::new();
        sequence.cleanup = Some(Box::new(cleanup));
        sequence
    }

    /// Get the number of live entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reserve storage for at least `additional` more entries
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let vacant = self.slots.len() - self.len;
        self.slots.try_reserve(additional.saturating_sub(vacant))?;
        Ok(())
    }

    /// Remove every entry, running the cleanup hook on each payload.
    ///
    /// All cursors handed out before the call become stale.
    pub fn clear(&mut self) {
        let mut current = self.first.take();
        self.last = None;
        self.len = 0;
        while let Some(index) = current {
            match self.release(index) {
                Some(entry) => {
                    current = entry.next;
                    self.dispose(entry.payload);
                }
                None => break,
            }
        }
    }

    /// Clear the sequence and release it
    pub fn destroy(mut self) {
        self.clear();
    }

    /// Cursor to the first entry, or [`Cursor::NONE`] when empty
    pub fn begin(&self) -> Cursor {
        self.cursor_for(self.first)
    }

    /// Cursor to the last entry, or [`Cursor::NONE`] when empty
    pub fn end(&self) -> Cursor {
        self.cursor_for(self.last)
    }

    /// Cursor to the entry at `index`, or [`Cursor::NONE`] when out of range.
    ///
    /// Walks from whichever end is closer, so a lookup costs at most
    /// `len / 2` steps.
    pub fn cursor_at(&self, index: usize) -> Cursor {
        if index >= self.len {
            return Cursor::NONE;
        }

        let found = if self.len / 2 < index {
            let mut current = self.last;
            for _ in index + 1..self.len {
                current = current.and_then(|i| self.entry(i)).and_then(|e| e.prev);
            }
            current
        } else {
            let mut current = self.first;
            for _ in 0..index {
                current = current.and_then(|i| self.entry(i)).and_then(|e| e.next);
            }
            current
        };

        self.cursor_for(found)
    }

    /// Insert `payload` directly after `at` and return a cursor to it.
    ///
    /// Inserting after [`Cursor::NONE`] puts the payload at the head.
    pub fn insert_after(&mut self, at: Cursor, payload: T) -> Result<Cursor> {
        let anchor = self.resolve(at)?;
        let next = match anchor {
            Some(index) => self.entry(index).and_then(|e| e.next),
            None => self.first,
        };

        let index = self.allocate(Entry {
            payload,
            prev: anchor,
            next,
        })?;

        match anchor.and_then(|a| self.entry_mut(a)) {
            Some(entry) => entry.next = Some(index),
            None => self.first = Some(index),
        }
        match next.and_then(|n| self.entry_mut(n)) {
            Some(entry) => entry.prev = Some(index),
            None => self.last = Some(index),
        }
        self.len += 1;

        Ok(self.cursor_for(Some(index)))
    }

    /// Append `payload` at the tail
    pub fn push_back(&mut self, payload: T) -> Result<Cursor> {
        self.insert_after(self.end(), payload)
    }

    /// Prepend `payload` at the head
    pub fn push_front(&mut self, payload: T) -> Result<Cursor> {
        self.insert_after(Cursor::NONE, payload)
    }

    /// Remove the entry at `at`, running the cleanup hook on its payload.
    ///
    /// Returns `false` when the cursor is [`Cursor::NONE`], stale, or taken
    /// from another sequence.
    pub fn remove(&mut self, at: Cursor) -> bool {
        let Some(entry) = self.live(at).and_then(|index| self.release(index)) else {
            return false;
        };

        match entry.prev.and_then(|p| self.entry_mut(p)) {
            Some(prev) => prev.next = entry.next,
            None => self.first = entry.next,
        }
        match entry.next.and_then(|n| self.entry_mut(n)) {
            Some(next) => next.prev = entry.prev,
            None => self.last = entry.prev,
        }
        self.len -= 1;

        self.dispose(entry.payload);
        true
    }

    /// Get the payload at `at`
    pub fn get(&self, at: Cursor) -> Option<&T> {
        self.live(at)
            .and_then(|index| self.entry(index))
            .map(|entry| &entry.payload)
    }

    /// Get the payload at `at` mutably
    pub fn get_mut(&mut self, at: Cursor) -> Option<&mut T> {
        self.live(at)
            .and_then(|index| self.entry_mut(index))
            .map(|entry| &mut entry.payload)
    }

    /// Advance `cursor` to the following entry.
    ///
    /// Returns whether the cursor still denotes a live entry. Moving past the
    /// tail leaves [`Cursor::NONE`].
    pub fn move_next(&self, cursor: &mut Cursor) -> bool {
        let next = self
            .live(*cursor)
            .and_then(|index| self.entry(index))
            .and_then(|entry| entry.next);
        *cursor = self.cursor_for(next);
        !cursor.is_none()
    }

    /// Rewind `cursor` to the preceding entry.
    ///
    /// Returns whether the cursor still denotes a live entry. Moving past the
    /// head leaves [`Cursor::NONE`].
    pub fn move_previous(&self, cursor: &mut Cursor) -> bool {
        let prev = self
            .live(*cursor)
            .and_then(|index| self.entry(index))
            .and_then(|entry| entry.prev);
        *cursor = self.cursor_for(prev);
        !cursor.is_none()
    }

    /// True for the head entry and for any cursor that denotes no live entry
    pub fn is_first(&self, cursor: Cursor) -> bool {
        match self.live(cursor).and_then(|index| self.entry(index)) {
            Some(entry) => entry.prev.is_none(),
            None => true,
        }
    }

    /// True for the tail entry and for any cursor that denotes no live entry
    pub fn is_last(&self, cursor: Cursor) -> bool {
        match self.live(cursor).and_then(|index| self.entry(index)) {
            Some(entry) => entry.next.is_none(),
            None => true,
        }
    }

    /// Iterate over the payloads from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            sequence: self,
            front: self.first,
            back: self.last,
            remaining: self.len,
        }
    }

    fn resolve(&self, cursor: Cursor) -> Result<Option<usize>> {
        let Some(slot_ref) = cursor.slot else {
            return Ok(None);
        };
        if cursor.owner != self.id {
            return Err(Error::ForeignCursor);
        }
        match self.slots.get(slot_ref.index) {
            Some(Slot {
                generation,
                state: SlotState::Occupied(_),
            }) if *generation == slot_ref.generation => Ok(Some(slot_ref.index)),
            _ => Err(Error::StaleCursor),
        }
    }

    fn live(&self, cursor: Cursor) -> Option<usize> {
        self.resolve(cursor).ok().flatten()
    }

    fn cursor_for(&self, index: Option<usize>) -> Cursor {
        let slot = index.and_then(|index| {
            self.slots.get(index).map(|slot| SlotRef {
                index,
                generation: slot.generation,
            })
        });
        match slot {
            Some(slot) => Cursor {
                owner: self.id,
                slot: Some(slot),
            },
            None => Cursor::NONE,
        }
    }

    fn entry(&self, index: usize) -> Option<&Entry<T>> {
        match self.slots.get(index).map(|slot| &slot.state) {
            Some(SlotState::Occupied(entry)) => Some(entry),
            _ => None,
        }
    }

    fn entry_mut(&mut self, index: usize) -> Option<&mut Entry<T>> {
        match self.slots.get_mut(index).map(|slot| &mut slot.state) {
            Some(SlotState::Occupied(entry)) => Some(entry),
            _ => None,
        }
    }

    fn allocate(&mut self, entry: Entry<T>) -> Result<usize> {
        if let Some(index) = self.free_head {
            if let Some(slot) = self.slots.get_mut(index) {
                if let SlotState::Vacant { next_free } = slot.state {
                    self.free_head = next_free;
                    slot.state = SlotState::Occupied(entry);
                    return Ok(index);
                }
            }
        }

        self.slots.try_reserve(1)?;
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Occupied(entry),
        });
        Ok(self.slots.len() - 1)
    }

    // Vacates the slot and bumps its generation so old cursors go stale.
    fn release(&mut self, index: usize) -> Option<Entry<T>> {
        let slot = self.slots.get_mut(index)?;
        if !matches!(slot.state, SlotState::Occupied(_)) {
            return None;
        }

        let state = std::mem::replace(
            &mut slot.state,
            SlotState::Vacant {
                next_free: self.free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(index);

        match state {
            SlotState::Occupied(entry) => Some(entry),
            SlotState::Vacant { .. } => None,
        }
    }

    fn dispose(&mut self, payload: T) {
        match self.cleanup.as_mut() {
            Some(cleanup) => cleanup(payload),
            None => drop(payload),
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Sequence<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over the payloads of a [`Sequence`]
pub struct Iter<'a, T> {
    sequence: &'a Sequence<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.sequence.entry(self.front?)?;
        self.front = entry.next;
        self.remaining -= 1;
        Some(&entry.payload)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.sequence.entry(self.back?)?;
        self.back = entry.prev;
        self.remaining -= 1;
        Some(&entry.payload)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
