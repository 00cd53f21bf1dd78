//! Enrichment of raw call events with dictionary names.

use crate::meta::dictionary::Dictionary;
use crate::model::CallEvent;
use std::collections::BTreeMap;

/// A call event with method, thread and parameter names resolved.
///
/// This is the shape handed to name-based filtering and list output.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub method: String,
    pub event: CallEvent,
    /// parameter name → values, name-sorted for stable output
    pub params: BTreeMap<String, Vec<String>>,
}

impl ResolvedCall {
    /// Resolve one event against a dictionary. Unknown ids keep a
    /// `#id` placeholder so nothing silently disappears from output.
    pub fn resolve(event: CallEvent, dict: &Dictionary) -> Self {
        let method = match dict.get(event.method) {
            Some(name) => name.to_string(),
            None => format!("#{}", event.method),
        };
        let params = event
            .params
            .iter()
            .map(|(id, values)| {
                let name = match dict.get(*id) {
                    Some(name) => name.to_string(),
                    None => format!("#{}", id),
                };
                (name, values.clone())
            })
            .collect();
        Self {
            method,
            event,
            params,
        }
    }
}

/// Resolve a batch of events, preserving order
pub fn resolve_calls(events: Vec<CallEvent>, dict: &Dictionary) -> Vec<ResolvedCall> {
    events
        .into_iter()
        .map(|event| ResolvedCall::resolve(event, dict))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_and_keeps_placeholders() {
        let mut dict = Dictionary::new();
        dict.put(3, "com.acme.Service.handle");
        dict.put(7, "web.url");

        let mut event = CallEvent::default();
        event.method = 3;
        event.params.insert(7, vec!["/orders".to_string()]);
        event.params.insert(9, vec!["oops".to_string()]);

        let resolved = ResolvedCall::resolve(event, &dict);
        assert_eq!(resolved.method, "com.acme.Service.handle");
        assert_eq!(resolved.params["web.url"], vec!["/orders"]);
        assert_eq!(resolved.params["#9"], vec!["oops"]);
    }
}
