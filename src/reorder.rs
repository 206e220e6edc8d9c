//! Single-element relocation and the client-side reorder state machine.
//!
//! Relocation is the only reordering primitive: remove the element at `from`
//! and reinsert it at `to`. Multi-element moves are repeated relocations.
//! After every relocation the whole sequence is renumbered `0..N-1`.

use crate::types::Task;

/// A validated move of one element within a sequence of `len` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    /// Validate a requested move. `to` is `None` when the drop landed outside
    /// any valid slot.
    ///
    /// Returns `None` (no transition) for identical indices, undefined or
    /// out-of-range targets, and sequences with fewer than two elements.
    pub fn plan(len: usize, from: usize, to: Option<usize>) -> Option<Move> {
        let to = to?;
        if len < 2 || from >= len || to >= len || from == to {
            return None;
        }
        Some(Move { from, to })
    }

    /// The position sent to the remote service: the moved element's index in
    /// the final sequence.
    pub fn new_order(&self) -> i64 {
        self.to as i64
    }
}

/// Relocate one element, returning the new sequence.
pub fn relocate<T: Clone>(items: &[T], mv: Move) -> Vec<T> {
    let mut out = items.to_vec();
    let moved = out.remove(mv.from);
    out.insert(mv.to, moved);
    out
}

/// Reassign every task's `order` to its index.
pub fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = Some(index as i64);
    }
}

/// Where a task list stands with respect to an in-flight reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderPhase {
    #[default]
    Stable,
    OptimisticallyReordered,
    Reverted,
}

/// Inputs driving [`ReorderPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderEvent {
    /// The relocated sequence was applied locally.
    Applied,
    /// The remote service acknowledged the move.
    Confirmed,
    /// The remote call failed; the optimistic sequence was discarded.
    Failed,
    /// Authoritative state was re-established after a failure.
    Reloaded,
}

impl ReorderPhase {
    /// Advance the state machine. Events that make no sense in the current
    /// phase leave it unchanged.
    pub fn on(self, event: ReorderEvent) -> ReorderPhase {
        use ReorderEvent::*;
        use ReorderPhase::*;
        match (self, event) {
            (Stable, Applied) => OptimisticallyReordered,
            (OptimisticallyReordered, Confirmed) => Stable,
            (OptimisticallyReordered, Failed) => Reverted,
            (Reverted, Reloaded) => Stable,
            (phase, _) => phase,
        }
    }
}
