//! One call-site aggregate in a hotspot tree.

use super::gantt::GanttEntry;
use super::tag::{TagKey, TagTable};
use std::collections::{BTreeMap, HashSet};

/// Aggregated timing and count statistics for one call site, with child
/// nodes keyed by id and a bounded tag table.
///
/// `start_time`/`end_time` hold the widest observed bounds; a fresh node
/// carries the empty interval `[i64::MAX, i64::MIN]`.
#[derive(Debug, Clone)]
pub struct HotspotNode {
    pub id: i32,
    pub children: Vec<HotspotNode>,
    pub tags: TagTable,

    pub total_time: i64,
    pub child_time: i64,
    pub count: u64,
    pub child_count: u64,
    pub suspension_time: i64,
    pub child_suspension_time: i64,
    pub start_time: i64,
    pub end_time: i64,

    /// Marks an async boundary frame; such children are never merge
    /// targets, a fragment's frame is always adopted as-is
    pub reactor_frame: bool,
    pub last_assembly_ids: HashSet<u64>,

    /// Display-row identity, set on fragment roots only
    pub full_row_id: Option<String>,
    pub folder_id: u32,
}

impl HotspotNode {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            children: Vec::new(),
            tags: TagTable::new(),
            total_time: 0,
            child_time: 0,
            count: 0,
            child_count: 0,
            suspension_time: 0,
            child_suspension_time: 0,
            start_time: i64::MAX,
            end_time: i64::MIN,
            reactor_frame: false,
            last_assembly_ids: HashSet::new(),
            full_row_id: None,
            folder_id: 0,
        }
    }

    /// Self time, meaningful once the tree is finalized
    pub fn self_time(&self) -> i64 {
        self.total_time - self.child_time
    }

    /// Find or append the child for a call site id
    pub fn get_or_create_child(&mut self, id: i32) -> &mut HotspotNode {
        let pos = self.children.iter().position(|c| c.id == id);
        match pos {
            Some(i) => &mut self.children[i],
            None => {
                self.children.push(HotspotNode::new(id));
                let last = self.children.len() - 1;
                &mut self.children[last]
            }
        }
    }

    pub fn find_child(&self, id: i32) -> Option<&HotspotNode> {
        self.children.iter().find(|c| c.id == id)
    }

    /// Flat sibling merge: `other` is the same call site observed in a
    /// different fragment. Counters are summed, time bounds widened, and
    /// the tag tables unioned - each of `other`'s tags contributes
    /// `other`'s node time, the weight of the calls that carried it.
    pub fn merge(&mut self, other: &HotspotNode) {
        let other_time = other.total_time;
        self.total_time += other_time;
        self.suspension_time += other.suspension_time;
        self.child_time += other.child_time;
        self.count += other.count;
        self.start_time = self.start_time.min(other.start_time);
        self.end_time = self.end_time.max(other.end_time);

        for (key, stats) in other.tags.iter() {
            self.tags.fold(key.clone(), stats.count, other_time);
        }
    }

    /// Recursive merge folding a whole fragment subtree into this one.
    ///
    /// Children are matched by id (skipping reactor frames); unmatched
    /// subtrees are adopted wholesale in encounter order. When the source
    /// node carries a display-row identity, every direct child crossing
    /// over is also recorded as a gantt entry.
    pub fn merge_with_children(
        &mut self,
        other: HotspotNode,
        mut gantt: Option<&mut Vec<GanttEntry>>,
    ) {
        self.child_time += other.child_time;
        self.total_time += other.total_time;
        self.child_count += other.child_count;
        self.count += other.count;
        self.suspension_time += other.suspension_time;
        self.child_suspension_time += other.child_suspension_time;
        self.last_assembly_ids.extend(other.last_assembly_ids.iter().copied());
        self.start_time = self.start_time.min(other.start_time);
        self.end_time = self.end_time.max(other.end_time);

        if !other.children.is_empty() {
            if self.children.is_empty() {
                self.children = other.children;
            } else {
                // only pre-merge children are merge candidates; subtrees
                // adopted below keep their own identity
                let pre_merge = self.children.len();
                for src_child in other.children {
                    if let (Some(row), Some(gantt)) = (&other.full_row_id, gantt.as_deref_mut()) {
                        gantt.push(GanttEntry {
                            id: src_child.id,
                            start_time: src_child.start_time,
                            total_time: src_child.total_time,
                            row_id: row.clone(),
                            folder_id: other.folder_id,
                        });
                    }
                    let target = self.children[..pre_merge]
                        .iter()
                        .position(|c| c.id == src_child.id && !c.reactor_frame);
                    match target {
                        Some(i) => {
                            self.children[i].merge_with_children(src_child, gantt.as_deref_mut())
                        }
                        None => self.children.push(src_child),
                    }
                }
            }
        }

        if other.tags.is_empty() {
            return;
        }
        if self.tags.is_empty() {
            self.tags = other.tags;
            return;
        }
        for (key, stats) in other.tags.iter() {
            self.tags.fold(key.clone(), stats.count, stats.total_time);
        }
    }

    /// Single post-order pass rolling each node's own totals up into its
    /// parent's `child_*` accumulators, then excluding suspension time
    /// from active totals.
    ///
    /// Not idempotent: running it twice double-subtracts suspension, so
    /// trees guard it behind a finalized flag.
    pub(crate) fn calculate_total_executions(&mut self) {
        self.roll_up();
    }

    /// Returns `(total_time, count + child_count, suspension + child
    /// suspension)` as seen before this node's own subtraction.
    fn roll_up(&mut self) -> (i64, u64, i64) {
        for child in &mut self.children {
            let (time, counts, suspension) = child.roll_up();
            self.child_time += time;
            self.child_count += counts;
            self.child_suspension_time += suspension;
        }

        let up = (
            self.total_time,
            self.count + self.child_count,
            self.suspension_time + self.child_suspension_time,
        );
        self.child_time -= self.child_suspension_time;
        self.total_time -= self.child_suspension_time + self.suspension_time;
        up
    }

    /// Apply a dictionary remap to this subtree: the node ids, then every
    /// tag id, re-inserted through the bounded path since remapping can
    /// make previously distinct tags collide.
    pub fn remap(&mut self, id_map: &BTreeMap<u32, u32>) {
        if id_map.is_empty() {
            return;
        }
        if self.id >= 0 {
            if let Some(&new_id) = id_map.get(&(self.id as u32)) {
                self.id = new_id as i32;
            }
        }
        for child in &mut self.children {
            child.remap(id_map);
        }

        if self.tags.is_empty() {
            return;
        }
        let old = std::mem::take(&mut self.tags);
        self.tags = TagTable::with_capacity(old.capacity());
        for (key, stats) in old.iter() {
            let mut key = key.clone();
            if key.id >= 0 {
                if let Some(&new_id) = id_map.get(&(key.id as u32)) {
                    key.id = new_id as i32;
                }
            }
            self.tags.fold(key, stats.count, stats.total_time);
        }
    }

    /// Record a label observation (parameter value seen at this call)
    pub fn tag(&mut self, key: TagKey) {
        self.tags.set_label(key);
    }
}
