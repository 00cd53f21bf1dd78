//! Output documents and writers.

pub mod json;
pub mod schema;

pub use json::write_document;
pub use schema::{CallListDocument, CallRow, TreeDocument, TreeNodeJson};
