//! A hotspot tree with its owned dictionary and clob index.

use super::gantt::GanttEntry;
use super::hotspot::HotspotNode;
use crate::meta::{ClobIndex, Dictionary};
use crate::model::TreeRowId;
use crate::utils::config::ROOT_NODE_ID;
use crate::utils::error::TreeError;
use log::debug;
use std::sync::Arc;

/// Aggregation result for one fragment, or the accumulator many fragments
/// fold into.
///
/// Lifecycle: built → merged zero or more times → finalized → read-only.
/// The dictionary is shared between trees built from the same source and
/// cloned copy-on-write the first time a merge brings in a tree built on
/// a different dictionary instance.
#[derive(Debug)]
pub struct ProfiledTree {
    root: HotspotNode,
    dict: Arc<Dictionary>,
    clobs: ClobIndex,
    rowid: TreeRowId,
    pub gantt: Vec<GanttEntry>,
    finalized: bool,
}

impl ProfiledTree {
    pub fn new(dict: Arc<Dictionary>, clobs: ClobIndex) -> Self {
        Self::with_rowid(dict, clobs, TreeRowId::undefined())
    }

    pub fn with_rowid(dict: Arc<Dictionary>, clobs: ClobIndex, rowid: TreeRowId) -> Self {
        let mut root = HotspotNode::new(ROOT_NODE_ID);
        root.full_row_id = rowid.full_row_id.clone();
        root.folder_id = rowid.folder_id;
        Self {
            root,
            dict,
            clobs,
            rowid,
            gantt: Vec::new(),
            finalized: false,
        }
    }

    pub fn root(&self) -> &HotspotNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut HotspotNode {
        &mut self.root
    }

    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }

    pub fn dict_handle(&self) -> Arc<Dictionary> {
        Arc::clone(&self.dict)
    }

    pub fn clobs(&self) -> &ClobIndex {
        &self.clobs
    }

    pub fn clobs_mut(&mut self) -> &mut ClobIndex {
        &mut self.clobs
    }

    pub fn rowid(&self) -> &TreeRowId {
        &self.rowid
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Fold another fragment's tree into this one.
    ///
    /// The other tree's dictionary is reconciled first and the resulting
    /// remap applied to its whole node hierarchy before any counters are
    /// combined. Root ids must agree; merging into a finalized tree is
    /// rejected.
    pub fn merge(&mut self, mut other: ProfiledTree) -> Result<(), TreeError> {
        if self.finalized {
            return Err(TreeError::AlreadyFinalized);
        }
        if self.root.id != other.root.id {
            return Err(TreeError::RootMismatch(self.root.id, other.root.id));
        }

        if !other.clobs.is_empty() {
            self.clobs.merge(&other.clobs);
        }

        if !Arc::ptr_eq(&self.dict, &other.dict) {
            // clones the dictionary only while it is still shared
            let dict = Arc::make_mut(&mut self.dict);
            let remap = dict.merge_for_remap(&other.dict);
            if !remap.is_empty() {
                debug!("remapping {} ids from merged fragment", remap.len());
            }
            other.root.remap(&remap);
        }

        self.root.merge_with_children(other.root, Some(&mut self.gantt));
        self.rowid = TreeRowId::undefined();
        Ok(())
    }

    /// Run the post-order totals pass exactly once.
    ///
    /// The pass is not idempotent (suspension time would be subtracted
    /// twice), so a second call is an error, as is any later merge.
    pub fn finalize(&mut self) -> Result<(), TreeError> {
        if self.finalized {
            return Err(TreeError::AlreadyFinalized);
        }
        self.root.calculate_total_executions();
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tag::{TagKey, TagValue};

    fn dict_with(entries: &[(u32, &str)]) -> Arc<Dictionary> {
        let mut d = Dictionary::new();
        for (id, name) in entries {
            d.put(*id, *name);
        }
        Arc::new(d)
    }

    fn fragment(dict: &Arc<Dictionary>, method: u32, time: i64) -> ProfiledTree {
        let mut tree = ProfiledTree::new(Arc::clone(dict), ClobIndex::new());
        let child = tree.root_mut().get_or_create_child(method as i32);
        child.total_time = time;
        child.count = 1;
        child.start_time = 0;
        child.end_time = time;
        tree
    }

    #[test]
    fn merge_shares_dictionary_until_it_differs() {
        let dict = dict_with(&[(0, "a"), (1, "b")]);
        let mut acc = fragment(&dict, 0, 100);
        let same_dict = fragment(&dict, 0, 50);
        acc.merge(same_dict).unwrap();
        // same instance: still shared
        assert!(Arc::ptr_eq(&acc.dict_handle(), &dict));
        assert_eq!(acc.root().find_child(0).unwrap().total_time, 150);

        let other_dict = dict_with(&[(0, "c")]);
        let foreign = fragment(&other_dict, 0, 25);
        acc.merge(foreign).unwrap();
        // cross-dictionary merge cloned ours copy-on-write
        assert!(!Arc::ptr_eq(&acc.dict_handle(), &dict));
        // the foreign "c" got a fresh id; our ids are untouched
        assert_eq!(acc.dict().get(0), Some("a"));
        let c_id = acc.dict().id_of("c").unwrap();
        assert_ne!(c_id, 0);
        assert_eq!(acc.root().find_child(c_id as i32).unwrap().total_time, 25);
    }

    #[test]
    fn merge_applies_remap_to_tags() {
        let dict = dict_with(&[(0, "method.a"), (1, "param.x")]);
        let mut acc = fragment(&dict, 0, 100);

        let other_dict = dict_with(&[(0, "method.a"), (1, "param.y")]);
        let mut foreign = fragment(&other_dict, 0, 40);
        foreign
            .root_mut()
            .get_or_create_child(0)
            .tags
            .fold(TagKey::new(1, TagValue::Text("v".into())), 1, 40);

        acc.merge(foreign).unwrap();
        let y_id = acc.dict().id_of("param.y").unwrap() as i32;
        assert_ne!(y_id, 1);
        let child = acc.root().find_child(0).unwrap();
        assert!(child
            .tags
            .get(&TagKey::new(y_id, TagValue::Text("v".into())))
            .is_some());
    }

    #[test]
    fn mismatched_roots_are_rejected() {
        let dict = dict_with(&[(0, "a")]);
        let mut acc = fragment(&dict, 0, 100);
        let mut odd = fragment(&dict, 0, 10);
        odd.root_mut().id = 7;
        assert!(matches!(
            acc.merge(odd),
            Err(TreeError::RootMismatch(-1, 7))
        ));
    }

    #[test]
    fn finalize_guards_against_double_runs() {
        let dict = dict_with(&[(0, "a")]);
        let mut tree = fragment(&dict, 0, 100);
        tree.finalize().unwrap();
        assert!(matches!(tree.finalize(), Err(TreeError::AlreadyFinalized)));

        let late = fragment(&dict, 0, 10);
        assert!(matches!(tree.merge(late), Err(TreeError::AlreadyFinalized)));
    }

    #[test]
    fn merge_order_independence() {
        let dict_a = dict_with(&[(0, "m1"), (1, "m2")]);
        let dict_b = dict_with(&[(0, "m2"), (1, "m3")]);

        let build = |first: bool| {
            let base = dict_with(&[]);
            let mut acc = ProfiledTree::new(base, ClobIndex::new());
            let a = fragment(&dict_a, 1, 100);
            let b = fragment(&dict_b, 0, 40);
            if first {
                acc.merge(a).unwrap();
                acc.merge(b).unwrap();
            } else {
                acc.merge(b).unwrap();
                acc.merge(a).unwrap();
            }
            acc
        };

        let ab = build(true);
        let ba = build(false);

        // both orders aggregate "m2" from two fragments, up to id relabeling
        for tree in [&ab, &ba] {
            let m2 = tree.dict().id_of("m2").unwrap() as i32;
            let node = tree.root().find_child(m2).unwrap();
            assert_eq!(node.total_time, 140);
            assert_eq!(node.count, 2);
        }
    }
}
