//! Shared fixture builder: encodes calls streams the way the agent does.

use calltree_studio::codec::ByteWriter;
use calltree_studio::utils::config::CALL_HEADER_MAGIC;
use std::collections::HashMap;

/// One record to encode, with only the fields tests care about
#[derive(Debug, Clone, Default)]
pub struct RecordSpec {
    pub time_delta: i64,
    pub method: u32,
    pub duration: u32,
    pub calls: u32,
    pub thread: &'static str,
    pub logs_written: u32,
    pub logs_generated_delta: u32,
    pub file_index: u32,
    pub buffer_offset: u32,
    pub record_index: u32,
    pub cpu_time: u64,
    pub wait_time: u64,
    pub memory_used: u64,
    pub file_read: u64,
    pub file_written: u64,
    pub net_read: u64,
    pub net_written: u64,
    pub transactions: u32,
    pub queue_wait: u32,
    pub params: Vec<(u32, Vec<&'static str>)>,
}

impl RecordSpec {
    pub fn call(time_delta: i64, method: u32, duration: u32, thread: &'static str) -> Self {
        Self {
            time_delta,
            method,
            duration,
            calls: 1,
            thread,
            ..Self::default()
        }
    }

    pub fn with_param(mut self, id: u32, values: &[&'static str]) -> Self {
        self.params.push((id, values.to_vec()));
        self
    }
}

/// Encode a stream: versioned header, start time, then the records
pub fn encode_stream(format: u32, start_time: i64, records: &[RecordSpec]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_long(((CALL_HEADER_MAGIC as i64) << 32) | format as i64);
    w.write_long(start_time);
    let mut threads: HashMap<&str, u32> = HashMap::new();
    for record in records {
        encode_record(&mut w, format, record, &mut threads);
    }
    w.into_bytes()
}

/// A stream with no magic header: just a start time, format 0
pub fn encode_headerless_stream(start_time: i64) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_long(start_time);
    w.into_bytes()
}

fn encode_record(
    w: &mut ByteWriter,
    format: u32,
    record: &RecordSpec,
    threads: &mut HashMap<&'static str, u32>,
) {
    w.write_var_long_zigzag(record.time_delta);
    w.write_var_int(record.method);
    w.write_var_int(record.duration);
    w.write_var_int(record.calls);

    let next_index = threads.len() as u32;
    match threads.get(record.thread) {
        Some(&index) => w.write_var_int(index),
        None => {
            threads.insert(record.thread, next_index);
            w.write_var_int(next_index);
            w.write_string(record.thread);
        }
    }

    w.write_var_int(record.logs_written);
    w.write_var_int(record.logs_generated_delta);
    w.write_var_int(record.file_index);
    w.write_var_int(record.buffer_offset);
    w.write_var_int(record.record_index);

    if format >= 2 {
        w.write_var_long(record.cpu_time);
        w.write_var_long(record.wait_time);
        w.write_var_long(record.memory_used);
    }
    if format >= 3 {
        w.write_var_long(record.file_read);
        w.write_var_long(record.file_written);
        w.write_var_long(record.net_read);
        w.write_var_long(record.net_written);
    }
    if format >= 4 {
        w.write_var_int(record.transactions);
        w.write_var_int(record.queue_wait);
    }

    w.write_var_int(record.params.len() as u32);
    for (id, values) in &record.params {
        w.write_var_int(*id);
        w.write_var_int(values.len() as u32);
        // values travel back to front
        for value in values.iter().rev() {
            w.write_string(value);
        }
    }
}
