//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while decoding a binary call stream
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The byte source ran out mid-field. Scan loops treat this as the
    /// normal end of a stream, not a failure.
    #[error("end of stream")]
    EndOfStream,

    /// Cooperative cancellation was requested while decoding
    #[error("decoding interrupted")]
    Interrupted,

    #[error("string of {got} chars exceeds limit {limit}; position = {position}")]
    StringTooLong {
        got: usize,
        limit: usize,
        position: u64,
    },

    #[error("unsupported calls format {0}")]
    UnsupportedFormat(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// True for the conditions a scan loop stops on cleanly
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DecodeError::EndOfStream)
            || matches!(self, DecodeError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

/// Errors that can occur when combining or finalizing hotspot trees
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("unable to merge two trees with different root ids: {0} and {1}")]
    RootMismatch(i32, i32),

    #[error("tree is already finalized")]
    AlreadyFinalized,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("empty tree, nothing to render")]
    EmptyTree,
}
