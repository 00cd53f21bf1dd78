//! Per-node tag statistics with bounded cardinality.
//!
//! A node tracks the most significant parameter values seen at its call
//! site. The table is capped: once full, the least significant tag (by
//! accumulated time) folds into a catch-all bucket carrying the tag's id
//! and a generic "other" value. Folding merges identity, never mass -
//! the sums of `count` and `total_time` across the table always equal
//! the raw input sums.

use crate::meta::clob::ClobId;
use crate::utils::config::MAX_PARAMS;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A tag's observed value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagValue {
    Text(String),
    Clob(ClobId),
    /// Catch-all marker for values folded out of a full table
    Other,
}

/// Tag identity within one node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagKey {
    pub id: i32,
    pub value: TagValue,
    pub assembly_id: u64,
}

impl TagKey {
    pub fn new(id: i32, value: TagValue) -> Self {
        Self {
            id,
            value,
            assembly_id: 0,
        }
    }

    pub fn with_assembly(id: i32, value: TagValue, assembly_id: u64) -> Self {
        Self {
            id,
            value,
            assembly_id,
        }
    }

    fn catch_all(id: i32) -> Self {
        Self {
            id,
            value: TagValue::Other,
            assembly_id: 0,
        }
    }

    fn is_catch_all(&self) -> bool {
        self.value == TagValue::Other
    }
}

/// Aggregate for one tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagStats {
    pub count: u64,
    pub total_time: i64,
}

/// Lookup table plus eviction order, behind one mutating API.
///
/// The min-heap over regular (non-catch-all) tags is built lazily the
/// first time an insert hits the cap; from then on every live regular tag
/// has exactly one heap entry. Heap priorities can go stale when a tag's
/// time is bumped after insertion; eviction uses the tag's current stats,
/// so staleness only affects which tag is picked, not conservation.
#[derive(Debug, Clone)]
pub struct TagTable {
    tags: HashMap<TagKey, TagStats>,
    heap: Option<BinaryHeap<Reverse<(i64, TagKey)>>>,
    capacity: usize,
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TagTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_PARAMS)
    }

    /// Cap override for tests; production nodes use [`MAX_PARAMS`]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tags: HashMap::new(),
            heap: None,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, key: &TagKey) -> Option<&TagStats> {
        self.tags.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &TagStats)> {
        self.tags.iter()
    }

    /// Sum of counts across the table, catch-alls included
    pub fn total_count(&self) -> u64 {
        self.tags.values().map(|s| s.count).sum()
    }

    /// Sum of times across the table, catch-alls included
    pub fn total_time(&self) -> i64 {
        self.tags.values().map(|s| s.total_time).sum()
    }

    /// Record a label observation with no accumulated time yet.
    /// Re-labelling the same key within one call keeps a single entry.
    pub fn set_label(&mut self, key: TagKey) {
        if self.tags.contains_key(&key) {
            return;
        }
        self.fold(key, 1, 0);
    }

    /// Add `count`/`total_time` under `key`, inserting through the
    /// bounded path when the key is new.
    pub fn fold(&mut self, key: TagKey, count: u64, total_time: i64) {
        if let Some(stats) = self.tags.get_mut(&key) {
            stats.count += count;
            stats.total_time += total_time;
            return;
        }

        if self.tags.len() < self.capacity {
            self.insert_new(key, TagStats { count, total_time });
            return;
        }

        self.ensure_heap();
        // decide the loser: the incoming tag when it does not beat the
        // current minimum (ties discard the incoming one)
        let evict_minimum = match self.peek_min() {
            Some(min_time) => total_time > min_time,
            None => false,
        };

        let incoming = TagStats { count, total_time };
        let (loser_id, loser_stats) = if evict_minimum {
            match self.pop_regular_min() {
                Some((evicted_key, evicted_stats)) => {
                    self.insert_new(key, incoming);
                    (evicted_key.id, evicted_stats)
                }
                None => (key.id, incoming),
            }
        } else {
            (key.id, incoming)
        };
        self.fold_into_catch_all(loser_id, loser_stats);
    }

    fn insert_new(&mut self, key: TagKey, stats: TagStats) {
        if let Some(heap) = &mut self.heap {
            if !key.is_catch_all() {
                heap.push(Reverse((stats.total_time, key.clone())));
            }
        }
        self.tags.insert(key, stats);
    }

    fn ensure_heap(&mut self) {
        if self.heap.is_some() {
            return;
        }
        let mut heap = BinaryHeap::with_capacity(self.capacity);
        for (key, stats) in &self.tags {
            if !key.is_catch_all() {
                heap.push(Reverse((stats.total_time, key.clone())));
            }
        }
        self.heap = Some(heap);
    }

    fn peek_min(&self) -> Option<i64> {
        let heap = self.heap.as_ref()?;
        let Reverse((_, key)) = heap.peek()?;
        // heap priorities may be stale; report the live value
        self.tags.get(key).map(|s| s.total_time)
    }

    /// Remove and return the least significant regular tag, if any remain
    fn pop_regular_min(&mut self) -> Option<(TagKey, TagStats)> {
        loop {
            let Reverse((_, key)) = self.heap.as_mut()?.pop()?;
            if let Some(stats) = self.tags.remove(&key) {
                return Some((key, stats));
            }
            // entry for a key removed through another path; skip
        }
    }

    /// Merge a folded-out tag's mass into the catch-all bucket for its id.
    ///
    /// When the bucket must be created in a full table, the current
    /// minimum regular tag is folded out to free the slot; each step
    /// consumes one regular tag, so the chain always terminates.
    fn fold_into_catch_all(&mut self, id: i32, stats: TagStats) {
        let key = TagKey::catch_all(id);
        if let Some(existing) = self.tags.get_mut(&key) {
            existing.count += stats.count;
            existing.total_time += stats.total_time;
            return;
        }
        if self.tags.len() < self.capacity {
            self.insert_new(key, stats);
            return;
        }
        match self.pop_regular_min() {
            Some((victim_key, victim_stats)) => {
                self.insert_new(key, stats);
                self.fold_into_catch_all(victim_key.id, victim_stats);
            }
            None => {
                // table is pure catch-alls; blur into the least significant
                if let Some(smallest) = self
                    .tags
                    .iter()
                    .min_by_key(|(k, s)| (s.total_time, (*k).clone()))
                    .map(|(k, _)| k.clone())
                {
                    if let Some(existing) = self.tags.get_mut(&smallest) {
                        existing.count += stats.count;
                        existing.total_time += stats.total_time;
                    }
                }
            }
        }
    }
}
