//! Container header, page index locator and the container-level PRM block.

use serde::Serialize;

use super::cursor::Cursor;
use super::format::*;
use super::object::ObjectIndex;
use crate::util::{Context, Result};

/// Top-level header at offset 0 of every SM4 file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerHeader {
    /// Declared header size in bytes.
    pub size: u16,
    /// Fixed 36-character signature (UTF-16 text in practice, read byte-wise).
    pub signature: String,
    pub page_count: u32,
    pub object_list_count: u32,
    pub object_field_size: u32,
    /// The header's own object index.
    pub objects: ObjectIndex,
}

impl ContainerHeader {
    /// Decode the header at offset 0.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.set_position(0);
        cursor.set_context(Context::container());

        let size = cursor.read_u16()?;
        let signature = cursor.read_string(SIGNATURE_LEN)?;
        let page_count = cursor.read_u32()?;
        let object_list_count = cursor.read_u32()?;
        let object_field_size = cursor.read_u32()?;
        let _reserved_1 = cursor.read_u32()?;
        let _reserved_2 = cursor.read_u32()?;

        let objects = ObjectIndex::read(cursor, object_list_count)?;

        Ok(Self {
            size,
            signature,
            page_count,
            object_list_count,
            object_field_size,
            objects,
        })
    }

    /// Signature with the interleaved NUL bytes of its UTF-16 encoding removed.
    pub fn signature_text(&self) -> String {
        self.signature.chars().filter(|&c| c != '\0').collect()
    }
}

/// Page index header, located through the container header's object index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageIndexHeader {
    /// File position of the page index header.
    pub offset: u32,
    pub page_count: u32,
    pub object_list_count: u32,
    pub objects: ObjectIndex,
}

impl PageIndexHeader {
    /// Locate and decode the page index header.
    pub fn read(cursor: &mut Cursor<'_>, container: &ObjectIndex) -> Result<Self> {
        let context = Context::container();
        let offset = container.require(ObjectType::PageIndexHeader, context)?.offset;

        cursor.set_position(offset as u64);
        cursor.set_context(context.with_object(ObjectType::PageIndexHeader));
        let page_count = cursor.read_u32()?;
        let object_list_count = cursor.read_u32()?;
        let _reserved_1 = cursor.read_u32()?;
        let _reserved_2 = cursor.read_u32()?;

        let objects = ObjectIndex::read(cursor, object_list_count)?;

        Ok(Self { offset, page_count, object_list_count, objects })
    }

    /// Position of the page table (the PAGE_INDEX_ARRAY object).
    pub fn page_array_offset(&self) -> Result<u32> {
        let context = Context::container().with_object(ObjectType::PageIndexHeader);
        Ok(self.objects.require(ObjectType::PageIndexArray, context)?.offset)
    }
}

/// Content of the container-level PRM object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrmPayload {
    /// Uncompressed parameter text, as raw bytes.
    Plain(Vec<u8>),
    /// zlib-compressed parameters; inflating them is not supported.
    Compressed { compressed_size: u32 },
}

/// Auxiliary parameter block referenced from the container header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerPrm {
    pub compression_flag: u32,
    pub data_size: u32,
    pub compressed_size: u32,
    pub payload: PrmPayload,
}

impl ContainerPrm {
    /// Decode the PRM block if the container index has both PRM_HEADER and PRM.
    pub fn read(cursor: &mut Cursor<'_>, container: &ObjectIndex) -> Result<Option<Self>> {
        let (header, data) = match (
            container.find(ObjectType::PrmHeader),
            container.find(ObjectType::Prm),
        ) {
            (Some(header), Some(data)) if !header.is_empty() && !data.is_empty() => (*header, *data),
            _ => return Ok(None),
        };

        cursor.set_context(Context::container().with_object(ObjectType::PrmHeader));
        cursor.set_position(header.offset as u64);
        let compression_flag = cursor.read_u32()?;
        let data_size = cursor.read_u32()?;
        let compressed_size = cursor.read_u32()?;

        let payload = if compression_flag == PRM_UNCOMPRESSED {
            cursor.set_context(Context::container().with_object(ObjectType::Prm));
            cursor.set_position(data.offset as u64);
            PrmPayload::Plain(cursor.read_bytes(data_size as usize)?)
        } else {
            tracing::warn!(compressed_size, "container PRM is compressed, keeping it opaque");
            PrmPayload::Compressed { compressed_size }
        };

        Ok(Some(Self { compression_flag, data_size, compressed_size, payload }))
    }

    /// Parameter text, when stored uncompressed.
    pub fn text(&self) -> Option<String> {
        match &self.payload {
            PrmPayload::Plain(bytes) => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            PrmPayload::Compressed { .. } => None,
        }
    }
}
