use crate::types::{Length, PackingResult};
use std::collections::{HashMap, VecDeque};

/// Memo of simulated packings keyed on the exact `(raw, order)` pair.
///
/// Implementations must be transparent: a search returns the same report
/// whether or not a lookup hits.
pub trait PackingCache {
    fn lookup(&mut self, raw: &[Length], order: &[Length]) -> Option<PackingResult>;

    fn insert(&mut self, raw: &[Length], order: &[Length], result: &PackingResult);
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl PackingCache for NoCache {
    fn lookup(&mut self, _raw: &[Length], _order: &[Length]) -> Option<PackingResult> {
        None
    }

    fn insert(&mut self, _raw: &[Length], _order: &[Length], _result: &PackingResult) {}
}

/// Bounded memo with first-in first-out eviction.
#[derive(Debug, Clone, Default)]
pub struct MemoCache {
    capacity: usize,
    entries: HashMap<Vec<Length>, HashMap<Vec<Length>, PackingResult>>,
    insertion_order: VecDeque<(Vec<Length>, Vec<Length>)>,
    hits: u64,
    misses: u64,
}

impl MemoCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    fn evict_oldest(&mut self) {
        let Some((raw, order)) = self.insertion_order.pop_front() else {
            return;
        };
        if let Some(by_order) = self.entries.get_mut(&raw) {
            by_order.remove(&order);
            if by_order.is_empty() {
                self.entries.remove(&raw);
            }
        }
    }
}

impl PackingCache for MemoCache {
    fn lookup(&mut self, raw: &[Length], order: &[Length]) -> Option<PackingResult> {
        let found = self
            .entries
            .get(raw)
            .and_then(|by_order| by_order.get(order))
            .cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    fn insert(&mut self, raw: &[Length], order: &[Length], result: &PackingResult) {
        if self.capacity == 0 {
            return;
        }
        let by_order = self.entries.entry(raw.to_vec()).or_default();
        if by_order.insert(order.to_vec(), result.clone()).is_some() {
            // Refreshed in place; keeps its original eviction slot
            return;
        }
        self.insertion_order.push_back((raw.to_vec(), order.to_vec()));
        while self.insertion_order.len() > self.capacity {
            self.evict_oldest();
        }
    }
}
