//! Scan loop over one calls stream.
//!
//! Reads the header, selects the decoder for the stream's format, then
//! walks records until the stream runs dry. Records outside the requested
//! time window are skipped without allocating their parameter strings;
//! surviving records go through the supplied early filter.

use crate::codec::call::CallDecoder;
use crate::codec::header::StreamHeader;
use crate::codec::reader::ByteReader;
use crate::filter::CallFilterer;
use crate::model::{CallEvent, TimeRange};
use crate::utils::error::DecodeError;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::io::Read;

/// Outcome of scanning one stream
#[derive(Debug, Default)]
pub struct ScanResult {
    pub calls: Vec<CallEvent>,
    /// method and parameter ids the surviving records reference,
    /// for targeted dictionary loading
    pub required_ids: BTreeSet<u32>,
    pub header: Option<StreamHeader>,
}

/// Parser for one block of data from the `calls` stream.
///
/// Counts records materialized (`parsed`) separately from records passing
/// the filter (`result`) so callers can log scan efficiency.
pub struct CallScanner<R: Read> {
    reader: ByteReader<R>,
    window: TimeRange,
    parsed: u64,
    result: u64,
}

impl<R: Read> CallScanner<R> {
    pub fn new(reader: ByteReader<R>, window: TimeRange) -> Self {
        Self {
            reader,
            window,
            parsed: 0,
            result: 0,
        }
    }

    /// In-window records materialized so far
    pub fn parsed_count(&self) -> u64 {
        self.parsed
    }

    /// Records that passed the filter so far
    pub fn result_count(&self) -> u64 {
        self.result
    }

    /// Scan the stream to its end (or to `end_scan` on the stream clock).
    ///
    /// Truncated input ends the scan cleanly with the records decoded so
    /// far; an unknown format skips the whole stream with a logged
    /// warning; cancellation propagates as
    /// [`DecodeError::Interrupted`](crate::utils::error::DecodeError).
    pub fn scan<F: CallFilterer>(
        &mut self,
        filter: &F,
        end_scan: i64,
    ) -> Result<ScanResult, DecodeError> {
        let mut out = ScanResult::default();

        let header = StreamHeader::read(&mut self.reader)?;
        out.header = Some(header);

        let Some(mut decoder) = CallDecoder::for_format(header.format) else {
            warn!("invalid calls format {}, skipping stream", header.format);
            return Ok(out);
        };
        debug!(
            "scanning calls stream: format {}, start time {}",
            header.format, header.start_time
        );

        let mut clock = header.start_time;
        loop {
            let mut call = CallEvent::default();
            match decoder.read(&mut call, &mut self.reader) {
                Ok(()) => {}
                Err(e) if e.is_end_of_stream() => break,
                Err(e) => return Err(e),
            }
            clock += call.time; // delta off the wire
            call.time = clock;

            if !self.window.overlaps(call.time, call.duration) {
                if call.time > end_scan {
                    break;
                }
                match decoder.skip_params(&mut call, &mut self.reader) {
                    Ok(()) => continue,
                    Err(e) if e.is_end_of_stream() => break,
                    Err(e) => return Err(e),
                }
            }

            match decoder.read_params(&mut call, &mut self.reader) {
                Ok(()) => {}
                Err(e) if e.is_end_of_stream() => break,
                Err(e) => return Err(e),
            }

            self.parsed += 1;
            if !filter.accept(&call) {
                continue;
            }
            out.required_ids.insert(call.method);
            out.required_ids.extend(call.params.keys().copied());
            self.result += 1;
            out.calls.push(call);
        }

        debug!(
            "scan done: {} records parsed, {} passed the filter",
            self.parsed, self.result
        );
        Ok(out)
    }
}
