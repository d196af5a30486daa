//! Transform state with a bounded linear undo history.
//!
//! # Commit protocol
//!
//! Every mutation that the user can undo goes through [`TransformStore::commit`]:
//! the current state is pushed onto the history *before* the mutator runs, so
//! the top of the history is always a pre-mutation snapshot and a single
//! [`TransformStore::undo`] reverts exactly one user action.
//!
//! Continuous gestures (drag, pinch) snapshot once at gesture start with
//! [`TransformStore::checkpoint`] and then stream live values through
//! [`TransformStore::update`], which does not touch the history.
//!
//! Every path re-clamps the result, so the state never leaves its limits.

use std::collections::VecDeque;

use crate::config::TransformLimits;
use crate::state::TransformState;

/// Bounded, most-recent-last stack of transform snapshots.
///
/// Pushing beyond capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<TransformState>,
    capacity: usize,
}

impl HistoryStack {
    /// Create an empty stack. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Push a snapshot, evicting the oldest if the stack is full.
    pub fn push(&mut self, state: TransformState) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(state);
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<TransformState> {
        self.entries.pop_back()
    }

    /// Most recent snapshot without removing it.
    pub fn peek(&self) -> Option<&TransformState> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &TransformState> {
        self.entries.iter()
    }
}

/// Owner of the current [`TransformState`] and its [`HistoryStack`].
#[derive(Debug, Clone)]
pub struct TransformStore {
    state: TransformState,
    history: HistoryStack,
    limits: TransformLimits,
}

impl TransformStore {
    pub fn new(limits: TransformLimits, history_capacity: usize) -> Self {
        Self {
            state: TransformState::IDENTITY,
            history: HistoryStack::new(history_capacity),
            limits,
        }
    }

    /// The current committed state.
    pub fn state(&self) -> TransformState {
        self.state
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn limits(&self) -> &TransformLimits {
        &self.limits
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Snapshot the current state, then apply `mutator`.
    ///
    /// Returns the new state.
    pub fn commit<F>(&mut self, mutator: F) -> TransformState
    where
        F: FnOnce(TransformState, &TransformLimits) -> TransformState,
    {
        self.history.push(self.state);
        self.apply(mutator)
    }

    /// Apply `mutator` without snapshotting.
    ///
    /// Only valid inside a gesture that already called [`checkpoint`](Self::checkpoint).
    pub fn update<F>(&mut self, mutator: F) -> TransformState
    where
        F: FnOnce(TransformState, &TransformLimits) -> TransformState,
    {
        self.apply(mutator)
    }

    /// Snapshot the current state without changing it.
    pub fn checkpoint(&mut self) {
        self.history.push(self.state);
    }

    /// Restore the most recent snapshot. Returns `false` if the history is empty.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.state = previous;
                log::debug!("undo restored {:?}, {} left", previous, self.history.len());
                true
            }
            None => false,
        }
    }

    /// Commit a return to [`TransformState::IDENTITY`].
    pub fn reset(&mut self) -> TransformState {
        self.commit(|_, _| TransformState::IDENTITY)
    }

    /// Drop all history and return to identity. Used when the subject changes.
    pub fn clear(&mut self) {
        self.history.clear();
        self.state = TransformState::IDENTITY;
    }

    fn apply<F>(&mut self, mutator: F) -> TransformState
    where
        F: FnOnce(TransformState, &TransformLimits) -> TransformState,
    {
        self.state = mutator(self.state, &self.limits).clamped(&self.limits);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn store() -> TransformStore {
        TransformStore::new(TransformLimits::default(), 10)
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = HistoryStack::new(10);
        for i in 0..11 {
            history.push(TransformState {
                scale: 1.0 + i as f64 * 0.1,
                ..TransformState::IDENTITY
            });
        }
        assert_eq!(history.len(), 10);
        // Entry 0 (scale 1.0) was evicted; oldest is now scale 1.1
        let oldest = history.iter().next().unwrap();
        assert!((oldest.scale - 1.1).abs() < 1e-9);
        assert!((history.peek().unwrap().scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_history_zero_capacity_holds_one() {
        let mut history = HistoryStack::new(0);
        history.push(TransformState::IDENTITY);
        history.push(TransformState::IDENTITY);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_history_huge_capacity_allocates_lazily() {
        let mut history = HistoryStack::new(usize::MAX / 2);
        assert!(history.is_empty());
        history.push(TransformState::IDENTITY);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_commit_snapshots_pre_mutation_state() {
        let mut store = store();
        store.commit(|s, l| s.with_scale(2.0, l));
        assert_eq!(store.history().peek(), Some(&TransformState::IDENTITY));
        assert_eq!(store.state().scale, 2.0);
    }

    #[test]
    fn test_undo_restores_exact_triple() {
        let mut store = store();
        store.commit(|s, l| {
            s.with_scale(1.5, l)
                .with_position(Point::new(10.0, -20.0), l)
                .with_rotation(30.0)
        });
        let before = store.state();
        store.commit(|s, l| s.with_position(Point::new(99.0, 99.0), l));
        assert!(store.undo());
        assert_eq!(store.state(), before);
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut store = store();
        assert!(!store.undo());
        assert_eq!(store.state(), TransformState::IDENTITY);
    }

    #[test]
    fn test_update_does_not_snapshot() {
        let mut store = store();
        store.checkpoint();
        store.update(|s, l| s.with_position(Point::new(5.0, 0.0), l));
        store.update(|s, l| s.with_position(Point::new(50.0, 0.0), l));
        assert_eq!(store.history().len(), 1);
        assert!(store.undo());
        assert_eq!(store.state(), TransformState::IDENTITY);
    }

    #[test]
    fn test_mutator_result_is_clamped() {
        let mut store = store();
        let state = store.commit(|_, _| TransformState {
            scale: 100.0,
            position: Point::new(1000.0, -1000.0),
            rotation: -30.0,
        });
        assert_eq!(state.scale, 5.0);
        assert_eq!(state.position, Point::new(100.0, -100.0));
        assert_eq!(state.rotation, 330.0);
    }

    #[test]
    fn test_reset_is_undoable() {
        let mut store = store();
        store.commit(|s, l| s.with_scale(3.0, l));
        store.reset();
        assert_eq!(store.state(), TransformState::IDENTITY);
        assert!(store.undo());
        assert_eq!(store.state().scale, 3.0);
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.commit(|s, l| s.with_scale(3.0, l));
        store.clear();
        assert!(!store.can_undo());
        assert_eq!(store.state(), TransformState::IDENTITY);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::geometry::Point;
    use proptest::prelude::*;

    /// Strategy for arbitrary (often out-of-range) transform values.
    fn raw_state_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (-10.0f64..10.0, -1000.0f64..1000.0, -1000.0f64..1000.0, -1000.0f64..1000.0)
    }

    proptest! {
        /// Property: no sequence of commits leaves the limits.
        #[test]
        fn prop_commits_stay_within_limits(
            steps in prop::collection::vec(raw_state_strategy(), 1..40),
        ) {
            let limits = TransformLimits::default();
            let mut store = TransformStore::new(limits, 10);
            for (scale, x, y, rotation) in steps {
                store.commit(|s, l| {
                    s.with_scale(s.scale + scale, l)
                        .with_position(Point::new(s.position.x + x, s.position.y + y), l)
                        .with_rotation(s.rotation + rotation)
                });
                prop_assert!(store.state().is_within(&limits));
                prop_assert!(store.history().len() <= 10);
            }
        }

        /// Property: undo after any single commit restores the previous state.
        #[test]
        fn prop_undo_restores_previous(
            (scale, x, y, rotation) in raw_state_strategy(),
        ) {
            let mut store = TransformStore::new(TransformLimits::default(), 10);
            store.commit(|s, l| s.with_scale(2.0, l).with_rotation(45.0));
            let before = store.state();
            store.commit(|s, l| {
                s.with_scale(scale, l)
                    .with_position(Point::new(x, y), l)
                    .with_rotation(rotation)
            });
            prop_assert!(store.undo());
            prop_assert_eq!(store.state(), before);
        }
    }
}
