//! Optional calls-stream header.
//!
//! A stream opens with an 8-byte big-endian value. When its upper 32 bits
//! carry the magic sentinel, the lower 32 bits are the wire format version
//! and the real start time follows as the next 8 bytes. Without the magic,
//! the first value already is the start time and the format is 0 — a shape
//! no decoder exists for.

use crate::codec::reader::ByteReader;
use crate::utils::config::CALL_HEADER_MAGIC;
use crate::utils::error::DecodeError;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub format: u32,
    /// Absolute stream start, epoch millis
    pub start_time: i64,
}

impl StreamHeader {
    pub fn read<R: Read>(reader: &mut ByteReader<R>) -> Result<Self, DecodeError> {
        let first = reader.read_long()?;
        if ((first as u64) >> 32) as u32 == CALL_HEADER_MAGIC {
            let format = (first & 0xffff_ffff) as u32;
            let start_time = reader.read_long()?;
            Ok(Self { format, start_time })
        } else {
            Ok(Self {
                format: 0,
                start_time: first,
            })
        }
    }
}
