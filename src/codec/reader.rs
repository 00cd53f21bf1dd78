//! Sequential byte cursor over a call stream.
//!
//! All fixed-width integers are big-endian. Variable-length integers use
//! 7-bit groups, least-significant group first, with the high bit as a
//! continuation flag. Strings are a varint character count followed by
//! 2 bytes per character (not modified-UTF8).
//!
//! The cursor tracks an absolute byte position so callers can seek against
//! out-of-band references such as clob offsets.

use crate::utils::config::MAX_STRING_CHARS;
use crate::utils::error::DecodeError;
use byteorder::{BigEndian, ByteOrder};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag for cooperative cancellation of a decode loop.
///
/// Checked on every read; a cancelled token surfaces as
/// [`DecodeError::Interrupted`], never as a data error.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Forward-only reader with position tracking
pub struct ByteReader<R: Read> {
    src: R,
    position: u64,
    cancel: Option<CancelToken>,
}

impl<R: Read> ByteReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            position: 0,
            cancel: None,
        }
    }

    /// Attach a cancellation token checked on every read
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Absolute byte position consumed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    fn check_interrupted(&self) -> Result<(), DecodeError> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(DecodeError::Interrupted);
            }
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.check_interrupted()?;
        let mut buf = [0u8; 1];
        let n = self.src.read(&mut buf)?;
        if n == 0 {
            return Err(DecodeError::EndOfStream);
        }
        self.position += 1;
        Ok(buf[0])
    }

    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.check_interrupted()?;
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.src.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(DecodeError::EndOfStream);
            }
            filled += n;
            self.position += n as u64;
        }
        Ok(())
    }

    /// One 2-byte big-endian character unit
    pub fn read_char(&mut self) -> Result<u16, DecodeError> {
        let c1 = self.read_u8()? as u16;
        let c2 = self.read_u8()? as u16;
        Ok((c1 << 8) | c2)
    }

    pub fn read_short(&mut self) -> Result<i16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_fully(&mut buf)?;
        Ok(BigEndian::read_i16(&buf))
    }

    pub fn read_int(&mut self) -> Result<i32, DecodeError> {
        let mut buf = [0u8; 4];
        self.read_fully(&mut buf)?;
        Ok(BigEndian::read_i32(&buf))
    }

    pub fn read_long(&mut self) -> Result<i64, DecodeError> {
        let mut buf = [0u8; 8];
        self.read_fully(&mut buf)?;
        Ok(BigEndian::read_i64(&buf))
    }

    /// Unsigned varint, at most 5 groups
    pub fn read_var_int(&mut self) -> Result<u32, DecodeError> {
        let mut res = self.read_u8()? as u32;
        if res & 0x80 == 0 {
            return Ok(res);
        }
        res &= !0x80;

        let x = self.read_u8()? as u32;
        res |= x << 7;
        if res & (0x80 << 7) == 0 {
            return Ok(res);
        }
        res &= !(0x80 << 7);

        let x = self.read_u8()? as u32;
        res |= x << 14;
        if res & (0x80 << 14) == 0 {
            return Ok(res);
        }
        res &= !(0x80 << 14);

        let x = self.read_u8()? as u32;
        res |= x << 21;
        if res & (0x80 << 21) == 0 {
            return Ok(res);
        }
        res &= !(0x80 << 21);

        let x = self.read_u8()? as u32;
        Ok(res | x.wrapping_shl(28))
    }

    /// Unsigned varlong; the first 5 groups cover 35 bits, larger values
    /// continue with a varint holding the remaining high bits
    pub fn read_var_long(&mut self) -> Result<u64, DecodeError> {
        let mut res = self.read_u8()? as u64;
        if res & 0x80 == 0 {
            return Ok(res);
        }
        res &= !0x80; // bits 0..6

        let x = self.read_u8()? as u64;
        res |= x << 7;
        if res & (0x80 << 7) == 0 {
            return Ok(res);
        }
        res &= !(0x80 << 7); // bits 7..13

        let x = self.read_u8()? as u64;
        res |= x << 14;
        if res & (0x80 << 14) == 0 {
            return Ok(res);
        }
        res &= !(0x80 << 14); // bits 14..20

        let x = self.read_u8()? as u64;
        res |= x << 21;
        if res & (0x80 << 21) == 0 {
            return Ok(res);
        }
        res &= !(0x80 << 21); // bits 21..28

        let x = self.read_u8()? as u64;
        if x & 0x80 == 0 {
            return Ok((x << 28) | res);
        }
        let res_long = ((x & 0x7f) << 28) | res;
        Ok(((self.read_var_long()? ) << 35) | res_long)
    }

    pub fn read_var_int_zigzag(&mut self) -> Result<i32, DecodeError> {
        let res = self.read_var_int()?;
        Ok(((res >> 1) as i32) ^ -((res & 1) as i32))
    }

    pub fn read_var_long_zigzag(&mut self) -> Result<i64, DecodeError> {
        let res = self.read_var_long()?;
        Ok(((res >> 1) as i64) ^ -((res & 1) as i64))
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        self.read_string_capped(MAX_STRING_CHARS)
    }

    pub fn read_string_capped(&mut self, max_chars: usize) -> Result<String, DecodeError> {
        let length = self.read_var_int()? as usize;
        if length > max_chars {
            return Err(DecodeError::StringTooLong {
                got: length,
                limit: max_chars,
                position: self.position,
            });
        }
        let mut units = Vec::with_capacity(length);
        for _ in 0..length {
            units.push(self.read_char()?);
        }
        Ok(String::from_utf16_lossy(&units))
    }

    /// Advance past a string without allocating its payload
    pub fn skip_string(&mut self) -> Result<(), DecodeError> {
        let length = self.read_var_int()? as u64;
        self.skip_bytes(length * 2)
    }

    pub fn skip_bytes(&mut self, mut count: u64) -> Result<(), DecodeError> {
        let mut scratch = [0u8; 4096];
        while count > 0 {
            let chunk = count.min(scratch.len() as u64) as usize;
            self.read_fully(&mut scratch[..chunk])?;
            count -= chunk as u64;
        }
        Ok(())
    }
}
