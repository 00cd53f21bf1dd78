//! CLI command implementations.

pub mod calls;
pub mod tree;

pub use calls::{execute_calls, CallsArgs};
pub use tree::{execute_tree, TreeArgs};

use anyhow::{bail, Context, Result};
use chrono::DateTime;

/// Parse a CLI time bound: epoch millis or an RFC3339 timestamp
pub fn parse_time_bound(value: &str) -> Result<i64> {
    if let Ok(millis) = value.parse::<i64>() {
        return Ok(millis);
    }
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid time bound '{}'", value))?;
    Ok(parsed.timestamp_millis())
}

/// Validate shared scan arguments before any file is touched
pub fn validate_window(from: Option<i64>, to: Option<i64>) -> Result<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            bail!("--from ({}) is after --to ({})", from, to);
        }
    }
    Ok(())
}
