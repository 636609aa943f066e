use std::collections::VecDeque;

use super::types::Direction;

/// The snake keeps positional snapshots of where the head previously was,
/// never references into the grid. `tail[0]` is the segment nearest the
/// head; the back of the deque is the tail end.
#[derive(Clone, Debug)]
pub struct Snake {
    head: usize,
    tail: VecDeque<usize>,
    heading: Direction,
    pending_heading: Option<Direction>,
}

impl Snake {
    pub fn new(start: usize, heading: Direction) -> Self {
        Self {
            head: start,
            tail: VecDeque::new(),
            heading,
            pending_heading: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(head: usize, tail: Vec<usize>, heading: Direction) -> Self {
        Self {
            head,
            tail: tail.into(),
            heading,
            pending_heading: None,
        }
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn tail_len(&self) -> usize {
        self.tail.len()
    }

    pub fn tail(&self) -> impl Iterator<Item = usize> + '_ {
        self.tail.iter().copied()
    }

    pub fn tail_segment(&self, position: usize) -> Option<usize> {
        self.tail.get(position).copied()
    }

    /// Buffers a heading change for the next tick. A change that exactly
    /// reverses the current heading is rejected as a no-op.
    pub fn buffer_heading(&mut self, direction: Direction) {
        if !direction.is_opposite(&self.heading) {
            self.pending_heading = Some(direction);
        }
    }

    /// Adopts the buffered heading, if any. The adopted value becomes the
    /// current heading, so a direction persists across ticks until changed.
    pub fn adopt_pending_heading(&mut self) {
        if let Some(direction) = self.pending_heading.take() {
            self.heading = direction;
        }
    }

    /// The cell a non-growing move would free this tick: the tail end, or
    /// the head itself when there is no tail to follow it.
    pub fn vacating_cell(&self) -> usize {
        self.tail.back().copied().unwrap_or(self.head)
    }

    /// Moves the head, shifting the previous head snapshot onto the front
    /// of the tail.
    pub fn advance(&mut self, new_head: usize) {
        self.tail.push_front(self.head);
        self.head = new_head;
    }

    /// Drops the tail-end snapshot and returns the cell it occupied.
    pub fn shrink_tail(&mut self) -> usize {
        self.tail
            .pop_back()
            .expect("advance always leaves at least one tail segment")
    }
}
