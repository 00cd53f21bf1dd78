//! Core data model: call events, time windows, row identities.

pub mod call;
pub mod range;
pub mod rowid;

pub use call::CallEvent;
pub use range::{DurationRange, TimeRange};
pub use rowid::TreeRowId;
