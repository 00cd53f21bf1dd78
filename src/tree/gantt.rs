//! Waterfall entries collected while merging fragment trees.

use serde::Serialize;

/// One waterfall row: a subtree that crossed fragment boundaries during a
/// merge, remembered with the display row it originally belonged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GanttEntry {
    pub id: i32,
    pub start_time: i64,
    pub total_time: i64,
    pub row_id: String,
    pub folder_id: u32,
}
