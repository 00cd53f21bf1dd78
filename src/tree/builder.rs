//! Visitor building one fragment's tree from a profiling event stream.
//!
//! Events must arrive in order: time advances, then method enters/exits
//! (properly nested), with labels attached to the call on top of the
//! stack. Suspension observed while a call is active is charged to it
//! through a forward cursor over the pod's suspension log.

use super::hotspot::HotspotNode;
use super::suspend::{SuspendCursor, SuspendLog};
use super::tag::TagKey;
use super::tree::ProfiledTree;
use crate::meta::{ClobIndex, Dictionary};
use crate::model::TreeRowId;
use std::sync::Arc;

pub struct TreeTraceBuilder {
    tree: ProfiledTree,
    suspend: SuspendLog,
    cursor: SuspendCursor,
    /// child index at each depth, addressing the current aggregate node
    path: Vec<usize>,
    /// per-call scratch nodes, merged into the aggregate on exit
    stack: Vec<HotspotNode>,
    time: i64,
}

impl TreeTraceBuilder {
    pub fn new(dict: Arc<Dictionary>, suspend: SuspendLog, clobs: ClobIndex, rowid: TreeRowId) -> Self {
        Self {
            tree: ProfiledTree::with_rowid(dict, clobs, rowid),
            suspend,
            cursor: SuspendCursor::default(),
            path: Vec::new(),
            stack: Vec::new(),
            time: 0,
        }
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Advance the stream clock by a delta from the wire
    pub fn visit_time_advance(&mut self, delta: i64) {
        self.time += delta;
    }

    fn aggregate_node(&mut self) -> &mut HotspotNode {
        let mut node = self.tree.root_mut();
        for &i in &self.path {
            node = &mut node.children[i];
        }
        node
    }

    pub fn visit_enter(&mut self, method_id: i32) {
        let time = self.time;

        if self.path.is_empty() {
            self.cursor.skip_to(&self.suspend, time);
            let root = self.tree.root_mut();
            root.start_time = root.start_time.min(time);
        } else {
            let charged = self.cursor.move_to(&self.suspend, time);
            self.aggregate_node().suspension_time += charged;
        }

        let parent = self.aggregate_node();
        let index = match parent.children.iter().position(|c| c.id == method_id) {
            Some(i) => i,
            None => {
                parent.children.push(HotspotNode::new(method_id));
                parent.children.len() - 1
            }
        };
        self.path.push(index);

        let mut scratch = HotspotNode::new(method_id);
        scratch.start_time = time;
        scratch.end_time = time;
        scratch.total_time = -time;
        self.stack.push(scratch);
    }

    /// Attach a parameter value to the call on top of the stack
    pub fn visit_label(&mut self, key: TagKey) {
        if let Some(top) = self.stack.last_mut() {
            top.tag(key);
        }
    }

    pub fn visit_exit(&mut self) {
        let time = self.time;
        let Some(mut scratch) = self.stack.pop() else {
            return;
        };
        scratch.suspension_time += self.cursor.move_to(&self.suspend, time);
        scratch.total_time += time;
        scratch.end_time = time;
        scratch.count += 1;

        self.aggregate_node().merge(&scratch);
        self.path.pop();

        if self.path.is_empty() {
            let root = self.tree.root_mut();
            root.end_time = root.end_time.max(time);
            root.count += 1;
        }
    }

    /// Hand over the fragment tree, unfinalized so it can still be merged
    pub fn into_tree(self) -> ProfiledTree {
        self.tree
    }
}
