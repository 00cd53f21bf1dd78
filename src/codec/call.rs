//! Versioned call-record decoders.
//!
//! Four wire formats exist, each a strict superset of the previous one's
//! fields. Rather than a chain of subtypes, a single decoder dispatches on
//! the format tag; each version's routine reads the previous version's
//! fields first and then its own additions.
//!
//! Parameter entries are not version-gated: every record ends with a
//! varint parameter count followed by `(id, value-count, values...)`
//! entries. `skip_params` advances past them without allocating, for
//! records already known to be outside the requested window.

use crate::codec::reader::ByteReader;
use crate::model::CallEvent;
use crate::utils::config::{unknown_thread_name, MAX_CALL_FORMAT, MIN_CALL_FORMAT};
use crate::utils::error::DecodeError;
use std::collections::HashMap;
use std::io::Read;

/// Decoder for one calls stream; owns the stream's incremental
/// thread-name table.
pub struct CallDecoder {
    format: u32,
    thread_names: Vec<String>,
}

impl CallDecoder {
    /// Select the decoder for a header's format tag, if one exists
    pub fn for_format(format: u32) -> Option<Self> {
        if !(MIN_CALL_FORMAT..=MAX_CALL_FORMAT).contains(&format) {
            return None;
        }
        Some(Self {
            format,
            thread_names: Vec::new(),
        })
    }

    pub fn format(&self) -> u32 {
        self.format
    }

    /// Decode the fixed portion of one record into `dst`.
    ///
    /// `dst.time` is left as the delta read off the wire; the caller folds
    /// it into the running stream clock.
    pub fn read<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        match self.format {
            1 => self.read_v1(dst, calls),
            2 => self.read_v2(dst, calls),
            3 => self.read_v3(dst, calls),
            4 => self.read_v4(dst, calls),
            other => Err(DecodeError::UnsupportedFormat(other)),
        }
    }

    fn read_v1<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        dst.time = calls.read_var_int_zigzag()? as i64;
        dst.method = calls.read_var_int()?;
        dst.duration = calls.read_var_int()?;
        dst.calls = calls.read_var_int()?;

        let thread_index = calls.read_var_int()?;
        if thread_index as usize == self.thread_names.len() {
            self.thread_names.push(calls.read_string()?);
        }
        // a damaged archive can reference a slot past the table
        dst.thread_name = match self.thread_names.get(thread_index as usize) {
            Some(name) => name.clone(),
            None => unknown_thread_name(thread_index),
        };

        dst.logs_written = calls.read_var_int()?;
        dst.logs_generated = calls.read_var_int()? + dst.logs_written;
        dst.trace_file_index = calls.read_var_int()?;
        dst.buffer_offset = calls.read_var_int()?;
        dst.record_index = calls.read_var_int()?;
        Ok(())
    }

    fn read_v2<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        self.read_v1(dst, calls)?;
        dst.cpu_time = calls.read_var_long()?;
        dst.wait_time = calls.read_var_long()?;
        dst.memory_used = calls.read_var_long()?;
        Ok(())
    }

    fn read_v3<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        self.read_v2(dst, calls)?;
        dst.file_read = calls.read_var_long()?;
        dst.file_written = calls.read_var_long()?;
        dst.net_read = calls.read_var_long()?;
        dst.net_written = calls.read_var_long()?;
        Ok(())
    }

    fn read_v4<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        self.read_v3(dst, calls)?;
        dst.transactions = calls.read_var_int()?;
        dst.queue_wait_duration = calls.read_var_int()?;
        Ok(())
    }

    /// Read the record's parameter entries into `dst.params`
    pub fn read_params<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        dst.params.clear();
        let len = calls.read_var_int()?;
        if len == 0 {
            return Ok(());
        }
        if dst.params.capacity() == 0 {
            dst.params = HashMap::with_capacity(len as usize);
        }
        for _ in 0..len {
            let param_id = calls.read_var_int()?;
            let size = calls.read_var_int()? as usize;
            let values = match size {
                0 => Vec::new(),
                1 => vec![calls.read_string()?],
                n => {
                    // producer writes values back to front
                    let mut result = vec![String::new(); n];
                    for slot in result.iter_mut().rev() {
                        *slot = calls.read_string()?;
                    }
                    result
                }
            };
            dst.params.insert(param_id, values);
        }
        Ok(())
    }

    /// Advance past the parameter entries without allocating values
    pub fn skip_params<R: Read>(
        &mut self,
        dst: &mut CallEvent,
        calls: &mut ByteReader<R>,
    ) -> Result<(), DecodeError> {
        dst.params.clear();
        let len = calls.read_var_int()?;
        for _ in 0..len {
            let _param_id = calls.read_var_int()?;
            let size = calls.read_var_int()?;
            for _ in 0..size {
                calls.skip_string()?;
            }
        }
        Ok(())
    }
}
