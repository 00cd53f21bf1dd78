//! Parsed filter condition and its match session.
//!
//! 1. every keyword from `mandatory` must be found
//! 2. no keyword from `excluded` may be found
//! 3. at least one keyword from `included` must be found, if any exist
//!
//! A session is fed values in any order; an excluded hit short-circuits the
//! whole record to "no match".

use super::term::FilterTerm;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCondition {
    has_mandatory_params: bool,
    included: Vec<FilterTerm>,
    excluded: Vec<FilterTerm>,
    mandatory: Vec<FilterTerm>,
}

impl FilterCondition {
    pub fn new(
        included: Vec<FilterTerm>,
        excluded: Vec<FilterTerm>,
        mandatory: Vec<FilterTerm>,
    ) -> Self {
        let has_mandatory_params = mandatory.iter().any(FilterTerm::has_parameter);
        Self {
            has_mandatory_params,
            included,
            excluded,
            mandatory,
        }
    }

    /// A condition with no terms matches every record
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty() && self.mandatory.is_empty()
    }

    pub fn has_mandatory_params(&self) -> bool {
        self.has_mandatory_params
    }

    pub fn included(&self) -> &[FilterTerm] {
        &self.included
    }

    pub fn excluded(&self) -> &[FilterTerm] {
        &self.excluded
    }

    pub fn mandatory(&self) -> &[FilterTerm] {
        &self.mandatory
    }

    /// Rebind parameter-scoped terms to ids once the name→id mapping is
    /// known. Terms whose names are absent from the mapping stay name-only.
    pub fn with_param_ids(&self, mapping: &HashMap<String, u32>) -> Self {
        let populate = |terms: &[FilterTerm]| {
            terms
                .iter()
                .map(|t| match mapping.get(t.param_name()) {
                    Some(&id) => t.with_param_id(id),
                    None => t.clone(),
                })
                .collect()
        };
        Self {
            has_mandatory_params: self.has_mandatory_params,
            included: populate(&self.included),
            excluded: populate(&self.excluded),
            mandatory: populate(&self.mandatory),
        }
    }

    /// Start a match session.
    ///
    /// Strict mode requires every mandatory term and (if any) one included
    /// term; non-strict mode only tracks parameter-bound terms, leaving
    /// general keywords for a later name-based pass.
    pub fn start(&self, strict: bool) -> Matcher<'_> {
        Matcher::new(self, strict)
    }
}

/// Accumulating match state for one record
pub struct Matcher<'a> {
    condition: &'a FilterCondition,
    has_included: bool,
    found_included: bool,
    found_excluded: bool,
    /// parallel to `condition.mandatory`; `None` = not tracked this session
    found_mandatory: Vec<Option<bool>>,
}

impl<'a> Matcher<'a> {
    fn new(condition: &'a FilterCondition, strict: bool) -> Self {
        let has_included = condition
            .included
            .iter()
            .any(|t| strict || t.has_parameter());
        let found_mandatory = condition
            .mandatory
            .iter()
            .map(|t| (strict || t.has_parameter()).then_some(false))
            .collect();
        Self {
            condition,
            has_included,
            found_included: false,
            found_excluded: false,
            found_mandatory,
        }
    }

    /// Feed one parameter's values by id, before names are resolvable.
    /// Only parameter-bound terms participate.
    ///
    /// Returns `true` once it is already obvious the record cannot match.
    pub fn add_values_by_id(&mut self, parameter_id: u32, values: &[String]) -> bool {
        for term in &self.condition.excluded {
            if !term.has_parameter() {
                continue;
            }
            if term.check_by_id(parameter_id, values) {
                self.found_excluded = true;
                return true;
            }
        }
        for (i, term) in self.condition.mandatory.iter().enumerate() {
            if !term.has_parameter() {
                continue;
            }
            if term.check_by_id(parameter_id, values) {
                self.found_mandatory[i] = Some(true);
            }
        }
        for term in &self.condition.included {
            if !term.has_parameter() {
                continue;
            }
            if term.check_by_id(parameter_id, values) {
                self.found_included = true;
                break;
            }
        }
        false
    }

    /// Feed one parameter's values by resolved name.
    ///
    /// Returns `true` once it is already obvious the record cannot match.
    pub fn add_values_by_name(&mut self, parameter_name: &str, values: &[String]) -> bool {
        for term in &self.condition.excluded {
            if term.check_by_name(parameter_name, values) {
                self.found_excluded = true;
                return true;
            }
        }
        for (i, term) in self.condition.mandatory.iter().enumerate() {
            if term.check_by_name(parameter_name, values) {
                self.found_mandatory[i] = Some(true);
            }
        }
        for term in &self.condition.included {
            if term.check_by_name(parameter_name, values) {
                self.found_included = true;
                break;
            }
        }
        false
    }

    /// Feed a general string (like a method name), not a parameter value.
    ///
    /// Returns `true` once it is already obvious the record cannot match.
    pub fn add_general_string(&mut self, s: &str) -> bool {
        for term in &self.condition.excluded {
            if term.check_general(s) {
                self.found_excluded = true;
                return true;
            }
        }
        for (i, term) in self.condition.mandatory.iter().enumerate() {
            if term.check_general(s) {
                self.found_mandatory[i] = Some(true);
            }
        }
        for term in &self.condition.included {
            if term.check_general(s) {
                self.found_included = true;
                break;
            }
        }
        false
    }

    pub fn matches(&self) -> bool {
        if self.found_excluded {
            return false;
        }
        if self.has_included && !self.found_included {
            return false;
        }
        self.found_mandatory
            .iter()
            .all(|tracked| tracked != &Some(false))
    }
}
