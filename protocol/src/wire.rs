//! # Canonical Wire Primitives
//!
//! The byte-level conventions shared by the payload and header codecs.
//!
//! The format is a deterministic concatenation: fixed-width little-endian
//! integers, `u32` length prefixes on every string and byte field, `u32`
//! counts on every sequence. Serialization frameworks are deliberately kept
//! away from signed bytes -- a canonical format cannot afford field-order or
//! map-iteration surprises, and the easiest way to avoid them is to write
//! the bytes ourselves.
//!
//! Encoding is infallible. Decoding is where all the suspicion lives:
//! [`Reader`] bounds-checks every read, and [`Reader::finish`] makes
//! trailing garbage an error instead of something silently ignored.

use thiserror::Error;

use crate::registry::FieldType;

/// Failures while decoding canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("{0} trailing bytes after the last field")]
    TrailingBytes(usize),

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid presence marker {0:#04x}")]
    InvalidPresence(u8),

    #[error("value tag {actual:#04x} does not match the declared `{expected}` field `{field}`")]
    TagMismatch {
        field: String,
        expected: FieldType,
        actual: u8,
    },

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("payload declares {actual} fields but the schema has {expected}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[error("no action is registered under code {0}")]
    UnknownActionCode(u32),
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Append a `u32` in little-endian.
pub(crate) fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a `u64` in little-endian.
pub(crate) fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append an `i64` in little-endian two's complement.
pub(crate) fn put_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a length-prefixed byte slice.
pub(crate) fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

/// Append a length-prefixed UTF-8 string.
pub(crate) fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_bytes(buf, s.as_bytes());
}

/// Append a sequence of strings: `u32` count, then each length-prefixed.
pub(crate) fn put_str_seq(buf: &mut Vec<u8>, items: &[String]) {
    put_u32(buf, items.len() as u32);
    for item in items {
        put_str(buf, item);
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Bounds-checked cursor over canonical bytes.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(DecodeError::UnexpectedEnd)?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64, DecodeError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(bytes))
    }

    pub(crate) fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub(crate) fn read_str(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    pub(crate) fn read_str_seq(&mut self) -> Result<Vec<String>, DecodeError> {
        let count = self.read_u32()? as usize;
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            items.push(self.read_str()?);
        }
        Ok(items)
    }

    /// Consume the reader, rejecting any trailing bytes.
    pub(crate) fn finish(self) -> Result<(), DecodeError> {
        let remaining = self.buf.len() - self.pos;
        if remaining > 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        Ok(())
    }
}
