//! Tagged object records and object indices.
//!
//! Every indirection level of an SM4 file (container header, page index,
//! page records) carries an array of `(tag, offset, size)` records. Lookups
//! are linear and return the first matching record: some writer versions emit
//! duplicate tags and only the earliest one is meaningful.

use serde::Serialize;

use super::cursor::Cursor;
use super::format::{ObjectType, OBJECT_RECORD_SIZE};
use crate::util::{Context, Error, Result};

/// One `(tag, offset, size)` entry of an object index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectRecord {
    pub object_type: ObjectType,
    pub offset: u32,
    pub size: u32,
}

impl ObjectRecord {
    /// Decode one record at the cursor position.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let object_type = ObjectType::from_raw(cursor.read_u32()?);
        let offset = cursor.read_u32()?;
        let size = cursor.read_u32()?;
        Ok(Self { object_type, offset, size })
    }

    /// Records with a zero offset or size point at nothing and are never decoded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset == 0 || self.size == 0
    }
}

/// Ordered sequence of object records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectIndex {
    /// Position of the first record in the file.
    pos: u64,
    records: Vec<ObjectRecord>,
}

impl ObjectIndex {
    /// Decode `count` consecutive records at the cursor position.
    pub fn read(cursor: &mut Cursor<'_>, count: u32) -> Result<Self> {
        let pos = cursor.position();
        // Bound the allocation by what the source can actually hold.
        let capacity = (count as u64).min(cursor.remaining() / OBJECT_RECORD_SIZE as u64) as usize;
        let mut records = Vec::with_capacity(capacity);
        for _ in 0..count {
            records.push(ObjectRecord::read(cursor)?);
        }
        Ok(Self { pos, records })
    }

    /// Build an index from records already in memory.
    pub fn from_records(pos: u64, records: Vec<ObjectRecord>) -> Self {
        Self { pos, records }
    }

    /// File position of the index.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObjectRecord> {
        self.records.iter()
    }

    /// First record with the given tag.
    pub fn find(&self, object_type: ObjectType) -> Option<&ObjectRecord> {
        let found = self.records.iter().find(|r| r.object_type == object_type);
        tracing::trace!(%object_type, found = found.is_some(), index_pos = self.pos, "object lookup");
        found
    }

    /// First record with the given tag, or [`Error::MissingRequiredObject`].
    pub fn require(&self, object_type: ObjectType, context: Context) -> Result<&ObjectRecord> {
        self.find(object_type).ok_or(Error::MissingRequiredObject {
            object: object_type,
            offset: self.pos,
            context,
        })
    }
}

impl<'a> IntoIterator for &'a ObjectIndex {
    type Item = &'a ObjectRecord;
    type IntoIter = std::slice::Iter<'a, ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
