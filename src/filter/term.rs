//! A single parsed search term.

/// One keyword from a filter query, optionally bound to a parameter.
///
/// The match string is stored lowercased; all matching is case-insensitive
/// substring containment, never equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTerm {
    param_id: Option<u32>,
    param_name: String,
    value: String,
}

impl FilterTerm {
    /// Keyword without a parameter (looked for in all strings)
    pub fn general(value: &str) -> Self {
        Self {
            param_id: None,
            param_name: String::new(),
            value: value.to_lowercase(),
        }
    }

    /// Keyword bound to a named parameter
    pub fn for_param(param: &str, value: &str) -> Self {
        Self {
            param_id: None,
            param_name: param.to_string(),
            value: value.to_lowercase(),
        }
    }

    pub fn with_param_id(&self, id: u32) -> Self {
        Self {
            param_id: Some(id),
            param_name: self.param_name.clone(),
            value: self.value.clone(),
        }
    }

    pub fn has_parameter(&self) -> bool {
        !self.param_name.is_empty() || self.param_id.is_some()
    }

    pub fn param_name(&self) -> &str {
        &self.param_name
    }

    pub fn param_id(&self) -> Option<u32> {
        self.param_id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check against a general string (like a method name), not a
    /// parameter value. Parameter-bound terms never match here.
    pub fn check_general(&self, actual: &str) -> bool {
        if self.has_parameter() {
            return false;
        }
        actual.to_lowercase().contains(&self.value)
    }

    /// Check against one parameter's values once names are known
    pub fn check_by_name(&self, parameter_name: &str, values: &[String]) -> bool {
        if !self.param_name.is_empty() && parameter_name != self.param_name {
            // bound to a parameter, but not this one
            return false;
        }
        if values.iter().any(|v| v.to_lowercase().contains(&self.value)) {
            return true;
        }
        // a general keyword may also match the parameter name itself
        self.param_name.is_empty() && parameter_name.to_lowercase().contains(&self.value)
    }

    /// Check against one parameter's values before names are resolvable
    pub fn check_by_id(&self, parameter_id: u32, values: &[String]) -> bool {
        if let Some(id) = self.param_id {
            if id != parameter_id {
                return false;
            }
        }
        values.iter().any(|v| v.to_lowercase().contains(&self.value))
    }
}
