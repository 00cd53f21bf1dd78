//! Hotspot call-tree aggregation: nodes, bounded tag tables, fragment
//! merging and the trace-event builder.

pub mod builder;
pub mod gantt;
pub mod hotspot;
pub mod suspend;
pub mod tag;
pub mod tree;

pub use builder::TreeTraceBuilder;
pub use gantt::GanttEntry;
pub use hotspot::HotspotNode;
pub use suspend::{SuspendCursor, SuspendLog};
pub use tag::{TagKey, TagStats, TagTable, TagValue};
pub use tree::ProfiledTree;
