//! JSON output schema for call lists and hotspot trees.

use crate::meta::ResolvedCall;
use crate::tree::{HotspotNode, ProfiledTree, TagValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat call-list document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallListDocument {
    pub version: String,
    /// Records materialized while scanning
    pub parsed: u64,
    /// Records that passed the filters
    pub matched: u64,
    pub calls: Vec<CallRow>,
    pub generated_at: String,
}

/// One call in the flat list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRow {
    pub time: i64,
    pub method: String,
    pub duration: u32,
    pub calls: u32,
    pub thread: String,
    pub cpu_time: u64,
    pub wait_time: u64,
    pub memory_used: u64,
    pub queue_wait: u32,
    pub file_bytes: u64,
    pub net_bytes: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub params: BTreeMap<String, Vec<String>>,
}

impl From<&ResolvedCall> for CallRow {
    fn from(call: &ResolvedCall) -> Self {
        let e = &call.event;
        Self {
            time: e.time,
            method: call.method.clone(),
            duration: e.duration,
            calls: e.calls,
            thread: e.thread_name.clone(),
            cpu_time: e.cpu_time,
            wait_time: e.wait_time,
            memory_used: e.memory_used,
            queue_wait: e.queue_wait_duration,
            file_bytes: e.file_read + e.file_written,
            net_bytes: e.net_read + e.net_written,
            params: call.params.clone(),
        }
    }
}

/// Hotspot tree document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDocument {
    pub version: String,
    pub start_time: i64,
    pub end_time: i64,
    pub root: TreeNodeJson,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub gantt: Vec<GanttRow>,
    pub generated_at: String,
}

/// One aggregated call site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNodeJson {
    pub name: String,
    pub total_time: i64,
    pub self_time: i64,
    pub count: u64,
    pub child_count: u64,
    pub suspension_time: i64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<TagRow>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<TreeNodeJson>,
}

/// One significant parameter value at a call site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRow {
    pub name: String,
    pub value: String,
    pub count: u64,
    pub total_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttRow {
    pub name: String,
    pub start_time: i64,
    pub total_time: i64,
    pub row_id: String,
}

impl TreeDocument {
    /// Project a finalized tree into the output schema, resolving every
    /// id through the tree's dictionary.
    pub fn from_tree(tree: &ProfiledTree) -> Self {
        let dict = tree.dict();
        let name_of = |id: i32| -> String {
            if id < 0 {
                return "root".to_string();
            }
            match dict.get(id as u32) {
                Some(name) => name.to_string(),
                None => format!("#{}", id),
            }
        };

        fn convert(node: &HotspotNode, name_of: &dyn Fn(i32) -> String) -> TreeNodeJson {
            let mut tags: Vec<TagRow> = node
                .tags
                .iter()
                .map(|(key, stats)| TagRow {
                    name: name_of(key.id),
                    value: match &key.value {
                        TagValue::Text(text) => text.clone(),
                        TagValue::Clob(id) => {
                            format!("{}:{}/{}", id.kind.name(), id.file_index, id.offset)
                        }
                        TagValue::Other => "(other values)".to_string(),
                    },
                    count: stats.count,
                    total_time: stats.total_time,
                })
                .collect();
            // heaviest values first, stable for equal weights
            tags.sort_by(|a, b| {
                b.total_time
                    .cmp(&a.total_time)
                    .then_with(|| a.value.cmp(&b.value))
            });

            TreeNodeJson {
                name: name_of(node.id),
                total_time: node.total_time,
                self_time: node.self_time(),
                count: node.count,
                child_count: node.child_count,
                suspension_time: node.suspension_time,
                tags,
                children: node
                    .children
                    .iter()
                    .map(|child| convert(child, name_of))
                    .collect(),
            }
        }

        let root = tree.root();
        Self {
            version: crate::utils::config::SCHEMA_VERSION.to_string(),
            start_time: root.start_time,
            end_time: root.end_time,
            root: convert(root, &name_of),
            gantt: tree
                .gantt
                .iter()
                .map(|g| GanttRow {
                    name: name_of(g.id),
                    start_time: g.start_time,
                    total_time: g.total_time,
                    row_id: g.row_id.clone(),
                })
                .collect(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
