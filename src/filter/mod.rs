//! Query predicates used to reject call records cheaply.
//!
//! A query string parses into a [`FilterCondition`]; the condition is
//! evaluated either id-based against raw decoded parameters (before the
//! dictionary is available) or name-based against resolved records.

pub mod condition;
pub mod parser;
pub mod term;

pub use condition::{FilterCondition, Matcher};
pub use parser::parse;
pub use term::FilterTerm;

use crate::meta::ResolvedCall;
use crate::model::{CallEvent, DurationRange};
use std::collections::HashMap;

/// Early-rejection test applied to raw decoded events during a scan
pub trait CallFilterer {
    fn accept(&self, call: &CallEvent) -> bool;
}

/// Accept-everything filter for unfiltered scans
pub struct AcceptAll;

impl CallFilterer for AcceptAll {
    fn accept(&self, _call: &CallEvent) -> bool {
        true
    }
}

/// Internal filter over raw call events.
///
/// Checks duration bounds and parameter values by id before the
/// dictionary is loaded, so non-matching records never reach conversion.
pub struct StreamCallFilter {
    range: DurationRange,
    condition: FilterCondition,
}

impl StreamCallFilter {
    pub fn new(range: DurationRange, query: &str) -> Self {
        Self {
            range,
            condition: parser::parse(query),
        }
    }

    pub fn duration_only(range: DurationRange) -> Self {
        Self::new(range, "")
    }

    /// Rebind parameter-scoped terms to ids once metadata is loaded
    pub fn enrich(&self, param_to_id: &HashMap<String, u32>) -> Self {
        Self {
            range: self.range,
            condition: self.condition.with_param_ids(param_to_id),
        }
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }
}

impl CallFilterer for StreamCallFilter {
    fn accept(&self, call: &CallEvent) -> bool {
        if !self.range.in_range(call.duration) {
            return false;
        }
        if self.condition.is_empty() {
            return true;
        }

        if call.params.is_empty() {
            return !self.condition.has_mandatory_params();
        }
        let mut matcher = self.condition.start(false);
        for (&id, values) in &call.params {
            if matcher.add_values_by_id(id, values) {
                return false;
            }
        }
        // general keywords cannot be checked yet; they get a name-based pass
        matcher.matches()
    }
}

/// Strict name-based filter over resolved records: the method name is fed
/// as a general string, then every named parameter.
pub struct RecordFilter {
    condition: FilterCondition,
}

impl RecordFilter {
    pub fn new(query: &str) -> Self {
        Self {
            condition: parser::parse(query),
        }
    }

    pub fn accept(&self, record: &ResolvedCall) -> bool {
        let mut matcher = self.condition.start(true);
        if matcher.add_general_string(&record.method) {
            return false;
        }
        for (name, values) in &record.params {
            if name.is_empty() {
                continue;
            }
            if matcher.add_values_by_name(name, values) {
                return false;
            }
        }
        matcher.matches()
    }
}
