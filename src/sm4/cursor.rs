//! Positioned little-endian reader over the bytes of an SM4 file.

use byteorder::{ByteOrder, LittleEndian};

use crate::util::{Context, Error, Result};

/// Positioned primitive reader.
///
/// All reads are bounds-checked: reading past the end fails with
/// [`Error::TruncatedInput`] at the offset of the unreadable field, tagged
/// with the cursor's current [`Context`]. The position may be set past the
/// end; only the next read fails.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: u64,
    context: Context,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at position 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, context: Context::container() }
    }

    /// Total length of the underlying source.
    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Check if the underlying source is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current absolute position.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move to an absolute position.
    #[inline]
    pub fn set_position(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Move by a relative byte count.
    #[inline]
    pub fn skip(&mut self, count: u64) {
        self.pos = self.pos.saturating_add(count);
    }

    /// Bytes left between the position and the end of the source.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.pos)
    }

    /// Context attached to errors raised by this cursor.
    #[inline]
    pub fn context(&self) -> Context {
        self.context
    }

    /// Replace the error context.
    #[inline]
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    /// Borrow `len` bytes and advance past them.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.pos;
        let end = start.checked_add(len as u64).filter(|&end| end <= self.len());
        match end {
            Some(end) => {
                self.pos = end;
                Ok(&self.data[start as usize..end as usize])
            }
            None => Err(Error::TruncatedInput {
                offset: start,
                wanted: len,
                context: self.context,
            }),
        }
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.read_slice(len)?.to_vec())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_slice(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_slice(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.read_slice(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_slice(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_slice(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_slice(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.read_slice(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.read_slice(8)?))
    }

    /// Read a fixed-length string, one character per byte (Latin-1).
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        Ok(self.read_slice(len)?.iter().map(|&b| char::from(b)).collect())
    }

    /// Read a string prefixed by its `u16` length.
    pub fn read_sm4_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        self.read_string(len)
    }

    /// Read `count` length-prefixed strings.
    pub fn read_sm4_strings(&mut self, count: usize) -> Result<Vec<String>> {
        // Each string needs at least its length prefix.
        let mut strings = Vec::with_capacity(count.min(self.remaining() as usize / 2));
        for _ in 0..count {
            strings.push(self.read_sm4_string()?);
        }
        Ok(strings)
    }

    /// Read `count` little-endian `u32` words.
    pub fn read_u32_array(&mut self, count: usize) -> Result<Vec<u32>> {
        let bytes = self.read_slice(count.saturating_mul(4))?;
        Ok(bytes.chunks_exact(4).map(LittleEndian::read_u32).collect())
    }

    /// Read `count` little-endian `i32` words.
    pub fn read_i32_array(&mut self, count: usize) -> Result<Vec<i32>> {
        let bytes = self.read_slice(count.saturating_mul(4))?;
        Ok(bytes.chunks_exact(4).map(LittleEndian::read_i32).collect())
    }
}
