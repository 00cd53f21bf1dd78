//! Configuration and constants for the engine and CLI.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Constants for the calls stream header.
// A stream may start with an 8-byte value whose upper half is this magic;
// the lower half then carries the wire format version and the real start
// time follows as the next 8 bytes. Streams without the magic are format 0
// and cannot be decoded.
pub const CALL_HEADER_MAGIC: u32 = 0xfffe_fdfc;

/// Lowest wire format a decoder exists for
pub const MIN_CALL_FORMAT: u32 = 1;
/// Highest wire format a decoder exists for
pub const MAX_CALL_FORMAT: u32 = 4;

/// Upper bound on distinct tag values tracked per hotspot node.
/// Beyond this, the least significant tag folds into a catch-all bucket.
pub const MAX_PARAMS: usize = 256;

/// Conventional id of a tree's root node
pub const ROOT_NODE_ID: i32 = -1;

/// Cap on a single decoded string, in characters (2 bytes each on the wire)
pub const MAX_STRING_CHARS: usize = 100 * 1024 * 1024;

/// Cap on a single clob value, in characters
pub const MAX_CLOB_CHARS: usize = 10 * 1024 * 1024;

/// Placeholder for thread-name table indices damaged upstream
pub fn unknown_thread_name(index: u32) -> String {
    format!("unknown # {}", index)
}
