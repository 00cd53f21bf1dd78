//! Display-row identity of the record a tree was built from.

use std::cmp::Ordering;

/// Identifies the UI row a per-fragment tree belongs to.
///
/// Ordered by `(trace_file_index, buffer_offset, record_index)` so rows
/// sort in stream order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeRowId {
    pub folder_id: u32,
    pub full_row_id: Option<String>,
    pub trace_file_index: u32,
    pub buffer_offset: u32,
    pub record_index: u32,
}

impl TreeRowId {
    /// Identity of a merged tree that no longer maps to a single row
    pub fn undefined() -> Self {
        Self {
            folder_id: 0,
            full_row_id: None,
            trace_file_index: 0,
            buffer_offset: 0,
            record_index: 0,
        }
    }

    pub fn new(folder_id: u32, full_row_id: impl Into<String>, file: u32, offset: u32, record: u32) -> Self {
        Self {
            folder_id,
            full_row_id: Some(full_row_id.into()),
            trace_file_index: file,
            buffer_offset: offset,
            record_index: record,
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.full_row_id.is_none()
    }
}

impl Ord for TreeRowId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.trace_file_index
            .cmp(&other.trace_file_index)
            .then(self.buffer_offset.cmp(&other.buffer_offset))
            .then(self.record_index.cmp(&other.record_index))
    }
}

impl PartialOrd for TreeRowId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
