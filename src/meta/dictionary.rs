//! Bidirectional id ↔ name table for methods, parameters and tags.
//!
//! Ids are dense small integers assigned by the producing agent; holes are
//! allowed. Merging two independently numbered dictionaries never changes
//! ids already issued by the receiver - only the merged-in side's
//! conflicting or new ids are remapped.

use std::collections::{BTreeMap, HashMap};

/// Metadata for one registered call parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub order: u32,
    pub signature: String,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, order: u32, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order,
            signature: signature.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// dense id → name; `None` marks a hole
    names: Vec<Option<String>>,
    name_to_id: HashMap<String, u32>,
    param_info: HashMap<String, ParamInfo>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a known id→name pair issued by the producer
    pub fn put(&mut self, id: u32, name: impl Into<String>) {
        let name = name.into();
        let id = id as usize;
        if self.names.len() <= id {
            self.names.resize(id + 1, None);
        }
        self.name_to_id.insert(name.clone(), id as u32);
        self.names[id] = Some(name);
    }

    pub fn put_parameter(&mut self, info: ParamInfo) {
        self.param_info.insert(info.name.clone(), info);
    }

    /// Look up or assign a dense id for a name
    pub fn resolve(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(Some(name.to_string()));
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize)?.as_deref()
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name).copied()
    }

    /// All assigned ids, ascending
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| name.as_ref().map(|_| i as u32))
    }

    /// Table size including holes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn param_info(&self) -> &HashMap<String, ParamInfo> {
        &self.param_info
    }

    /// Registered parameter name → dictionary id, for rebinding filters
    pub fn param_ids(&self) -> HashMap<String, u32> {
        self.param_info
            .keys()
            .filter_map(|name| self.id_of(name).map(|id| (name.clone(), id)))
            .collect()
    }

    /// Load a dictionary from line-oriented text: line N holds the name
    /// for id N, empty lines leave holes. This is the shape dictionary
    /// stream dumps arrive in.
    pub fn from_lines<R: std::io::BufRead>(reader: R) -> std::io::Result<Self> {
        let mut dict = Dictionary::new();
        for (id, line) in reader.lines().enumerate() {
            let line = line?;
            let name = line.trim_end_matches(['\r', '\n']);
            if name.is_empty() {
                continue;
            }
            dict.put(id as u32, name);
        }
        Ok(dict)
    }

    /// Full name → id mapping, for rebinding query terms
    pub fn name_ids(&self) -> HashMap<String, u32> {
        self.name_to_id.clone()
    }

    /// Absorb `other` and return the id rewrites its users need.
    ///
    /// Slots where both sides agree on the name are untouched and excluded
    /// from the table. Ids whose slot here is empty or holds a different
    /// name are resolved fresh and recorded as `old → new`. The returned
    /// table must be applied to every node and tag id built against
    /// `other` before any counters are folded.
    pub fn merge_for_remap(&mut self, other: &Dictionary) -> BTreeMap<u32, u32> {
        let mut remap = BTreeMap::new();

        for info in other.param_info.values() {
            self.put_parameter(info.clone());
        }

        let our_len = self.names.len();
        for (i, slot) in other.names.iter().enumerate() {
            let Some(name) = slot else { continue };
            let same = i < our_len && self.names[i].as_deref() == Some(name.as_str());
            if !same {
                let new_id = self.resolve(name);
                remap.insert(i as u32, new_id);
            }
        }
        remap
    }
}
