//! Metadata shared across fragments: dictionaries, parameter info and
//! out-of-band clob values.

pub mod clob;
pub mod dictionary;
pub mod resolve;

pub use clob::{Clob, ClobId, ClobIndex, StreamKind};
pub use dictionary::{Dictionary, ParamInfo};
pub use resolve::{resolve_calls, ResolvedCall};
