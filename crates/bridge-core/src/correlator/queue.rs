//! Fixed-capacity FIFO of outstanding transaction directions.

use crate::Direction;

/// Push attempted on a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueFull;

/// Ring buffer holding one [`Direction`] per outstanding transaction, in
/// admission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQueue {
    slots: Box<[Direction]>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl PendingQueue {
    /// Creates an empty queue holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Direction::Read; capacity].into_boxed_slice(),
            capacity,
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no entries are held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when no capacity remains.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Oldest entry, if any.
    #[must_use]
    pub fn head(&self) -> Option<Direction> {
        if self.is_empty() {
            None
        } else {
            Some(self.slots[self.head])
        }
    }

    /// Appends an entry at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`QueueFull`] when the queue is at capacity.
    pub fn push(&mut self, direction: Direction) -> Result<(), QueueFull> {
        if self.is_full() {
            return Err(QueueFull);
        }
        let tail = (self.head + self.len) % self.capacity;
        self.slots[tail] = direction;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest entry.
    pub fn pop(&mut self) -> Option<Direction> {
        let direction = self.head()?;
        self.head = (self.head + 1) % self.capacity;
        self.len -= 1;
        Some(direction)
    }

    /// Drops every entry.
    pub const fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        (0..self.len).map(move |offset| self.slots[(self.head + offset) % self.capacity])
    }
}

#[cfg(test)]
mod tests {
    use super::{PendingQueue, QueueFull};
    use crate::Direction;

    #[test]
    fn capacity_helpers_are_consistent() {
        let mut queue = PendingQueue::new(2);
        assert!(queue.is_empty());
        assert!(!queue.is_full());

        queue.push(Direction::Read).expect("room for first entry");
        queue.push(Direction::Write).expect("room for second entry");
        assert!(queue.is_full());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.push(Direction::Read), Err(QueueFull));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn entries_leave_in_admission_order_across_wraparound() {
        let mut queue = PendingQueue::new(3);
        let pattern = [
            Direction::Read,
            Direction::Write,
            Direction::Write,
            Direction::Read,
            Direction::Write,
        ];

        let mut popped = Vec::new();
        for direction in pattern {
            if queue.is_full() {
                popped.extend(queue.pop());
            }
            queue.push(direction).expect("room after pop");
        }
        while let Some(direction) = queue.pop() {
            popped.push(direction);
        }

        assert_eq!(popped, pattern);
    }

    #[test]
    fn iter_reports_oldest_first() {
        let mut queue = PendingQueue::new(2);
        queue.push(Direction::Write).expect("room");
        queue.pop();
        queue.push(Direction::Read).expect("room");
        queue.push(Direction::Write).expect("room");

        let entries: Vec<_> = queue.iter().collect();
        assert_eq!(entries, [Direction::Read, Direction::Write]);
        assert_eq!(queue.head(), Some(Direction::Read));
    }

    #[test]
    fn clear_empties_queue() {
        let mut queue = PendingQueue::new(1);
        queue.push(Direction::Write).expect("room");
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.head(), None);
        assert_eq!(queue.pop(), None);
    }
}
