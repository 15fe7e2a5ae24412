//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Fixed capacity circular buffer

/// Fixed-capacity circular buffer with insertion and removal cursors.
///
/// The buffer never grows. What happens when it is full is left to the
/// caller: [`push`](Self::push) refuses the item while
/// [`push_overwrite`](Self::push_overwrite) evicts the oldest unread one.
///
/// Items that have been read are not erased. They stay in place as history
/// until newer items overwrite them, and [`rewind`](Self::rewind) makes that
/// whole history readable again.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Box<[T]>,
    insert: usize,
    remove: usize,
    pending: usize,
    retained: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity.max(1)].into_boxed_slice(),
            insert: 0,
            remove: 0,
            pending: 0,
            retained: 0,
        }
    }

    /// Maximum number of items held.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of unread items (available to read).
    pub fn len(&self) -> usize {
        self.pending
    }

    /// Returns `true` when nothing is waiting to be read.
    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Free slots (available to write) before unread items would be lost.
    pub fn available(&self) -> usize {
        self.capacity() - self.pending
    }

    /// Returns `true` when every slot holds an unread item.
    pub fn is_full(&self) -> bool {
        self.pending == self.capacity()
    }

    /// Items still present in the buffer, read or unread.
    pub fn retained(&self) -> usize {
        self.retained
    }

    /// Append an item. Returns `false`, leaving the buffer untouched, when full.
    pub fn push(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.store(item);
        true
    }

    /// Append an item, evicting the oldest unread item when full.
    ///
    /// Returns the evicted item, if any.
    pub fn push_overwrite(&mut self, item: T) -> Option<T> {
        let evicted = if self.is_full() { self.pop() } else { None };
        self.store(item);
        evicted
    }

    /// Insert `items` ahead of every unread item, so they are read first.
    ///
    /// Room is made by evicting the oldest unread items; the number evicted
    /// is returned. When `items` alone exceeds the capacity only its tail is
    /// kept.
    pub fn prepend(&mut self, items: &[T]) -> usize {
        let capacity = self.capacity();
        let items = &items[items.len().saturating_sub(capacity)..];
        let evicted = (self.pending + items.len()).saturating_sub(capacity);
        self.advance(evicted);
        self.remove = (self.remove + capacity - items.len()) % capacity;
        for (offset, item) in items.iter().enumerate() {
            self.slots[(self.remove + offset) % capacity] = *item;
        }
        self.pending += items.len();
        self.retained = self.pending;
        evicted
    }

    /// Remove and return the oldest unread item.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.remove];
        self.remove = (self.remove + 1) % self.capacity();
        self.pending -= 1;
        Some(item)
    }

    /// Oldest unread item without removing it.
    pub fn peek(&self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.slots[self.remove])
        }
    }

    /// Unread items as two contiguous slices, oldest first.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        if self.is_empty() {
            return (&[], &[]);
        }
        let end = self.remove + self.pending;
        if end <= self.capacity() {
            (&self.slots[self.remove..end], &[])
        } else {
            (
                &self.slots[self.remove..],
                &self.slots[..end - self.capacity()],
            )
        }
    }

    /// Unread items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let (head, tail) = self.as_slices();
        head.iter().chain(tail.iter()).copied()
    }

    /// Mark up to `count` unread items as read. Returns how many were.
    pub fn advance(&mut self, count: usize) -> usize {
        let count = count.min(self.pending);
        self.remove = (self.remove + count) % self.capacity();
        self.pending -= count;
        count
    }

    /// Make the whole retained history unread again.
    pub fn rewind(&mut self) {
        let capacity = self.capacity();
        self.pending = self.retained;
        self.remove = (self.insert + capacity - self.retained) % capacity;
    }

    /// Forget all items, read and unread.
    pub fn clear(&mut self) {
        self.insert = 0;
        self.remove = 0;
        self.pending = 0;
        self.retained = 0;
    }

    fn store(&mut self, item: T) {
        self.slots[self.insert] = item;
        self.insert = (self.insert + 1) % self.capacity();
        self.pending += 1;
        self.retained = (self.retained + 1).min(self.capacity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, items: &[u8]) -> RingBuffer<u8> {
        let mut ring = RingBuffer::new(capacity);
        for &item in items {
            ring.push_overwrite(item);
        }
        ring
    }

    #[test]
    fn push_pop_in_order() {
        let mut ring = RingBuffer::new(4);
        assert!(ring.push(1u8));
        assert!(ring.push(2));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.available(), 2);
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn push_refuses_when_full() {
        let mut ring = filled(3, b"abc");
        assert!(ring.is_full());
        assert!(!ring.push(b'd'));
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"abc");
    }

    #[test]
    fn push_overwrite_evicts_oldest() {
        let mut ring = filled(3, b"abc");
        assert_eq!(ring.push_overwrite(b'd'), Some(b'a'));
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"bcd");
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn slices_wrap() {
        let mut ring = filled(4, b"abcd");
        ring.advance(3);
        ring.push(b'e');
        ring.push(b'f');
        let (head, tail) = ring.as_slices();
        assert_eq!(head, b"d");
        assert_eq!(tail, b"ef");
    }

    #[test]
    fn advance_is_bounded() {
        let mut ring = filled(4, b"ab");
        assert_eq!(ring.advance(10), 2);
        assert!(ring.is_empty());
    }

    #[test]
    fn rewind_replays_history() {
        let mut ring = filled(4, b"abcdef");
        while ring.pop().is_some() {}
        ring.rewind();
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"cdef");
    }

    #[test]
    fn rewind_before_wrap_replays_everything_written() {
        let mut ring = filled(8, b"xyz");
        ring.advance(2);
        ring.rewind();
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"xyz");
    }

    #[test]
    fn prepend_into_empty() {
        let mut ring: RingBuffer<u8> = RingBuffer::new(8);
        assert_eq!(ring.prepend(b"hi"), 0);
        ring.push(b'!');
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"hi!");
    }

    #[test]
    fn prepend_goes_ahead_of_unread() {
        let mut ring = filled(8, b"data");
        assert_eq!(ring.prepend(b">>"), 0);
        assert_eq!(ring.iter().collect::<Vec<_>>(), b">>data");
    }

    #[test]
    fn prepend_evicts_oldest_when_full() {
        let mut ring = filled(5, b"12345");
        assert_eq!(ring.prepend(b"AB"), 2);
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"AB345");
    }

    #[test]
    fn prepend_longer_than_capacity_keeps_tail() {
        let mut ring: RingBuffer<u8> = RingBuffer::new(3);
        ring.prepend(b"abcde");
        assert_eq!(ring.iter().collect::<Vec<_>>(), b"cde");
    }

    #[test]
    fn clear_forgets_history() {
        let mut ring = filled(4, b"abc");
        ring.clear();
        ring.rewind();
        assert!(ring.is_empty());
        assert_eq!(ring.retained(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let ring: RingBuffer<u8> = RingBuffer::new(0);
        assert_eq!(ring.capacity(), 1);
    }
}
