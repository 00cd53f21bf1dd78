//! Large out-of-band values (SQL text, XML payloads) referenced by
//! position instead of being inlined in the call stream.

use crate::codec::reader::ByteReader;
use crate::utils::config::MAX_CLOB_CHARS;
use crate::utils::error::DecodeError;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::io::Read;
use std::sync::{Arc, OnceLock};

/// Stream a clob value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    Sql,
    Xml,
}

impl StreamKind {
    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::Sql => "sql",
            StreamKind::Xml => "xml",
        }
    }
}

/// Composite identity of a clob: which pod's stream, which file in the
/// stream, and the byte offset of the value. Ordered `(kind, file,
/// offset, pod)` for deterministic batch loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClobId {
    pub pod: String,
    pub kind: StreamKind,
    pub file_index: u32,
    pub offset: u64,
}

impl ClobId {
    pub fn new(pod: impl Into<String>, kind: StreamKind, file_index: u32, offset: u64) -> Self {
        Self {
            pod: pod.into(),
            kind,
            file_index,
            offset,
        }
    }
}

impl Ord for ClobId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.kind
            .cmp(&other.kind)
            .then(self.file_index.cmp(&other.file_index))
            .then(self.offset.cmp(&other.offset))
            .then(self.pod.cmp(&other.pod))
    }
}

impl PartialOrd for ClobId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A clob reference with a lazily populated value.
///
/// Equality and hashing go by id only - whether the text has been loaded
/// does not change identity. The value cell is shared, so clones observe
/// a later load.
#[derive(Debug, Clone)]
pub struct Clob {
    id: ClobId,
    value: Arc<OnceLock<String>>,
}

impl Clob {
    pub fn new(id: ClobId) -> Self {
        Self {
            id,
            value: Arc::new(OnceLock::new()),
        }
    }

    pub fn id(&self) -> &ClobId {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.value.get().is_none()
    }

    pub fn get(&self) -> Option<&str> {
        self.value.get().map(String::as_str)
    }

    pub fn set(&self, text: String) {
        let _ = self.value.set(text);
    }

    /// Read the value from its stream, seeking forward to the recorded
    /// offset first. The value is capped at `max_chars`.
    pub fn read_from<R: Read>(
        &self,
        reader: &mut ByteReader<R>,
        max_chars: usize,
    ) -> Result<(), DecodeError> {
        if max_chars == 0 {
            return Ok(());
        }
        if reader.position() < self.id.offset {
            reader.skip_bytes(self.id.offset - reader.position())?;
        }
        let length = reader.read_var_int()? as usize;
        let mut units = Vec::with_capacity(length.min(max_chars));
        for _ in 0..length.min(max_chars) {
            units.push(reader.read_char()?);
        }
        self.set(String::from_utf16_lossy(&units));
        Ok(())
    }
}

impl PartialEq for Clob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Clob {}

impl std::hash::Hash for Clob {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Deduplicating store of clobs, keeping the order values were loaded in.
#[derive(Debug, Default)]
pub struct ClobIndex {
    max_chars: usize,
    unique: IndexMap<ClobId, Clob>,
    /// loaded values in load order (not sorted)
    loaded: Vec<Clob>,
    /// built lazily on first merge
    observed: Option<HashSet<ClobId>>,
}

impl ClobIndex {
    pub fn new() -> Self {
        Self::with_max_chars(MAX_CLOB_CHARS)
    }

    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars,
            ..Self::default()
        }
    }

    /// Register a clob reference, returning the already-known instance on
    /// a duplicate id
    pub fn get_or_insert(&mut self, clob: Clob) -> Clob {
        self.unique
            .entry(clob.id().clone())
            .or_insert(clob)
            .clone()
    }

    pub fn has(&self, id: &ClobId) -> bool {
        self.unique.contains_key(id)
    }

    pub fn text(&self, id: &ClobId) -> Option<&str> {
        self.unique.get(id).and_then(Clob::get)
    }

    /// References whose value is not loaded yet, in ClobId order
    pub fn uniq_to_load(&self) -> Vec<Clob> {
        let mut pending: Vec<Clob> = self
            .unique
            .values()
            .filter(|c| c.is_empty())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.id().cmp(b.id()));
        pending
    }

    /// Load one clob's value from its stream and record the load order
    pub fn load<R: Read>(
        &mut self,
        clob: &Clob,
        reader: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        clob.read_from(reader, self.max_chars)?;
        self.loaded.push(clob.clone());
        Ok(())
    }

    /// Absorb another index without duplicating clobs already present.
    /// Newly introduced entries keep their original load order.
    pub fn merge(&mut self, other: &ClobIndex) {
        let observed = self.observed.get_or_insert_with(|| {
            self.loaded.iter().map(|c| c.id().clone()).collect()
        });
        for clob in &other.loaded {
            if observed.insert(clob.id().clone()) {
                self.loaded.push(clob.clone());
                self.unique.insert(clob.id().clone(), clob.clone());
            }
        }
    }

    /// Loaded clobs in load order
    pub fn clobs(&self) -> &[Clob] {
        &self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
