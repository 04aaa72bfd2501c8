//! # Cursor — Weakly-Consistent Traversal
//!
//! A [`Cursor`] walks the registry's slots in index order and yields the live
//! ones. It only remembers a position and a count, never a borrow, so the
//! registry can be mutated between steps:
//!
//! ```
//! use slotreg::registry::Registry;
//!
//! let mut reg: Registry<u32> = Registry::new(8);
//! for i in 0..4 {
//!     *reg.create().0 = i;
//! }
//!
//! let mut cursor = reg.cursor();
//! while let Some(handle) = cursor.next_handle(&reg) {
//!     if reg[handle] % 2 == 0 {
//!         reg.free(handle);
//!     }
//! }
//! assert_eq!(reg.len(), 2);
//! ```
//!
//! ## Guarantees Under Mutation
//!
//! The cursor snapshots the live count when it is created and never yields
//! more than that. It checks each slot's alive flag at the moment it reaches
//! it, so an object freed before the cursor gets to it is never returned.
//! Objects created after the cursor may or may not be seen, in place of older
//! ones, but the total stays within the snapshot. If the scan reaches the end
//! of the slots before the count runs out, the registry shrank and the cursor
//! finishes early.
//!
//! ## `is_done` Lookahead
//!
//! [`is_done`](Cursor::is_done) stays `false` right after the last item is
//! returned and only turns `true` on the following step. This keeps the
//! step-then-test loop shape correct:
//!
//! ```text
//! let mut item = cursor.next(&reg);
//! while !cursor.is_done() {
//!     // item is Some(..) here, including the last one
//!     item = cursor.next(&reg);
//! }
//! ```
//!
//! A cursor created over an empty registry reports `is_done` immediately.
//!
//! For plain read-only traversal, [`Registry::iter`] wraps a cursor in a std
//! [`Iterator`].

use std::iter::FusedIterator;

use crate::handle::{Handle, HandleFlags};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Next slot to inspect.
    Scanning(usize),
    Done,
}

/// A restartable position in a [`Registry`], created by [`Registry::cursor`].
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Items still allowed to be yielded.
    remaining: usize,
    position: Position,
}

impl Cursor {
    pub(crate) fn new(alive: usize) -> Self {
        let position = if alive == 0 {
            Position::Done
        } else {
            Position::Scanning(0)
        };
        Self {
            remaining: alive,
            position,
        }
    }

    /// Advance to the next live object.
    ///
    /// Returns `None` once the cursor is done; after that every call returns
    /// `None`.
    pub fn next<'r, T>(&mut self, registry: &'r Registry<T>) -> Option<(Handle, &'r T)> {
        let index = self.advance(registry.handles())?;
        Some((registry.handles()[index], registry.item_at(index)))
    }

    /// Mutable version of [`next`](Self::next).
    pub fn next_mut<'r, T>(
        &mut self,
        registry: &'r mut Registry<T>,
    ) -> Option<(Handle, &'r mut T)> {
        let index = self.advance(registry.handles())?;
        let handle = registry.handles()[index];
        Some((handle, registry.item_at_mut(index)))
    }

    /// Advance and return only the handle, leaving the registry unborrowed.
    pub fn next_handle<T>(&mut self, registry: &Registry<T>) -> Option<Handle> {
        let index = self.advance(registry.handles())?;
        Some(registry.handles()[index])
    }

    /// True once no further item can be produced. See the module docs for
    /// the lookahead rule.
    pub fn is_done(&self) -> bool {
        self.position == Position::Done
    }

    /// Upper bound on the items this cursor will still yield.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn advance(&mut self, handles: &[Handle]) -> Option<usize> {
        let Position::Scanning(start) = self.position else {
            return None;
        };

        // Checked apart from the scan so the step after the last item flips
        // the cursor to done.
        if self.remaining == 0 {
            self.position = Position::Done;
            return None;
        }

        let found = handles
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, h)| h.has_flag(HandleFlags::ALIVE))
            .map(|(index, _)| index);

        match found {
            Some(index) => {
                self.remaining -= 1;
                self.position = Position::Scanning(index + 1);
                Some(index)
            }
            None => {
                log::debug!(
                    "cursor reached the end of {} slots with {} items unaccounted for; registry shrank",
                    handles.len(),
                    self.remaining
                );
                self.remaining = 0;
                self.position = Position::Done;
                None
            }
        }
    }
}

/// Borrowing iterator over `(handle, &item)`, from [`Registry::iter`].
pub struct Iter<'a, T> {
    registry: &'a Registry<T>,
    cursor: Cursor,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(registry: &'a Registry<T>) -> Self {
        Self {
            registry,
            cursor: registry.cursor(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.registry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // The registry is borrowed, so the snapshot count is exact.
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Borrowing iterator over `(handle, &mut item)`, from [`Registry::iter_mut`].
pub struct IterMut<'a, T> {
    slots: std::iter::Zip<std::slice::Iter<'a, Handle>, std::slice::IterMut<'a, T>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(handles: &'a [Handle], items: &'a mut [T], alive: usize) -> Self {
        Self {
            slots: handles.iter().zip(items.iter_mut()),
            remaining: alive,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (Handle, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (handle, item) = self
            .slots
            .by_ref()
            .find(|(h, _)| h.has_flag(HandleFlags::ALIVE))?;
        self.remaining -= 1;
        Some((*handle, item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = (Handle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Registry<T> {
    type Item = (Handle, &'a mut T);
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
