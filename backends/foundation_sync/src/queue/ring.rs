//! Fixed-size ring of item slots.
//!
//! `head` points at the oldest live item and `tail` at the next free slot.
//! Both wrap at `capacity`; `len` disambiguates the full and empty cases where
//! `head == tail`.

use crate::errors::QueueResult;

pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Allocates `capacity` empty slots.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Allocation` if the slots cannot be reserved.
    pub(crate) fn with_capacity(capacity: usize) -> QueueResult<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Writes `item` at the tail.
    ///
    /// Callers wait for `!is_full()` first; writing into a full ring is a bug.
    pub(crate) fn push_back(&mut self, item: T) {
        debug_assert!(!self.is_full(), "push into a full ring");

        let previous = self.slots[self.tail].replace(item);
        debug_assert!(previous.is_none(), "overwrote a live slot");

        self.tail = self.advance(self.tail);
        self.len += 1;
    }

    /// Takes the item at the head, `None` when the ring is empty.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = self.advance(self.head);
        self.len -= 1;
        item
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() {
            0
        } else {
            next
        }
    }
}
