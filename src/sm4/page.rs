//! Page table and per-page decoding.
//!
//! The page table is a run of page records with no length fields: each
//! record's object index directly follows its fixed part, and the next record
//! directly follows that index. Records are therefore decoded strictly in
//! order.
//!
//! Each page is then decoded in two phases. The page header comes first and
//! yields the scalars later objects depend on ([`DecodeInputs`]); then every
//! record of the page's object index is walked once, in order, producing one
//! [`PageEntry`] per record.

use serde::Serialize;

use super::cursor::Cursor;
use super::format::*;
use super::object::{ObjectIndex, ObjectRecord};
use super::page_header::PageHeader;
use super::payload::{decoder_for, DecodeInputs, PageObject, SampleBuffer, StringData};
use crate::util::{Context, Error, Result};

/// One entry of the page table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub id: u16,
    pub data_type: PageDataType,
    pub source_type: PageSourceType,
    pub object_list_count: u32,
    pub minor_version: u32,
    pub objects: ObjectIndex,
}

impl PageRecord {
    /// Decode the record at the cursor position.
    ///
    /// `index` is the record's position in the page table, used for error
    /// context only.
    pub fn read(cursor: &mut Cursor<'_>, index: usize) -> Result<Self> {
        let context = Context::page(index);
        cursor.set_context(context);

        let id = cursor.read_u16()?;
        cursor.skip(PAGE_RECORD_RESERVED as u64);

        let data_type_pos = cursor.position();
        let raw_data_type = cursor.read_u32()?;
        let data_type = PageDataType::checked(raw_data_type).ok_or(Error::UnrecognizedTag {
            kind: "page data-type",
            value: raw_data_type,
            offset: data_type_pos,
            context,
        })?;

        let source_type = PageSourceType::from_raw(cursor.read_u32()?);
        let object_list_count = cursor.read_u32()?;
        let minor_version = cursor.read_u32()?;
        let objects = ObjectIndex::read(cursor, object_list_count)?;

        Ok(Self {
            id,
            data_type,
            source_type,
            object_list_count,
            minor_version,
            objects,
        })
    }

    /// Decode `count` consecutive records starting at `offset`.
    pub fn read_table(cursor: &mut Cursor<'_>, offset: u32, count: u32) -> Result<Vec<Self>> {
        cursor.set_position(offset as u64);
        let capacity = (count as u64).min(cursor.remaining() / PAGE_RECORD_SIZE as u64) as usize;
        let mut records = Vec::with_capacity(capacity);
        for index in 0..count as usize {
            records.push(Self::read(cursor, index)?);
        }
        Ok(records)
    }
}

/// Why a page object was not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Zero offset or zero size.
    Empty,
    /// Unknown tag, or a tag whose payload is not decoded.
    NoDecoder,
    /// Objects of sequential pages are not decoded.
    SequentialPage,
}

/// Result of walking one object record of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectOutcome {
    /// The record the page header was read from.
    Header,
    Decoded(PageObject),
    Skipped(SkipReason),
    /// Recognized content that cannot be decoded (compressed PRM).
    Unsupported { reason: String },
    /// A value this object depends on was not supplied by an earlier object.
    DependencyMissing { missing: &'static str },
}

/// A walked object record and what came of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageEntry {
    pub record: ObjectRecord,
    pub outcome: ObjectOutcome,
}

impl PageEntry {
    /// The decoded payload, if any.
    pub fn object(&self) -> Option<&PageObject> {
        match &self.outcome {
            ObjectOutcome::Decoded(obj) => Some(obj),
            _ => None,
        }
    }
}

/// A fully decoded page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Position of the page in the page table.
    pub index: usize,
    pub id: u16,
    pub data_type: PageDataType,
    pub source_type: PageSourceType,
    pub minor_version: u32,
    pub objects: ObjectIndex,
    pub header: PageHeader,
    /// One entry per record of `objects`, in index order.
    pub entries: Vec<PageEntry>,
}

impl Page {
    /// Decode the header and every object of a page.
    pub fn decode(cursor: &mut Cursor<'_>, record: PageRecord, index: usize) -> Result<Self> {
        let context = Context::page(index);

        // Phase 1: the header.
        let header_record = *record.objects.require(ObjectType::PageHeader, context)?;
        cursor.set_context(context.with_object(ObjectType::PageHeader));
        cursor.set_position(header_record.offset as u64);
        let header = PageHeader::read(cursor, record.data_type)?;

        // Phase 2: the objects, with the header's scalars threaded in.
        let mut inputs = match &header {
            PageHeader::Default(h) => DecodeInputs {
                y_size: h.y_size,
                z_scale: h.z_scale,
                z_offset: h.z_offset,
                tip_track_info_count: None,
                prm_data_offset: record
                    .objects
                    .iter()
                    .find(|r| r.object_type == ObjectType::Prm && !r.is_empty())
                    .map(|r| r.offset),
            },
            PageHeader::Sequential(_) => DecodeInputs::default(),
        };
        let is_sequential = matches!(header, PageHeader::Sequential(_));
        let header_slot = record
            .objects
            .iter()
            .position(|r| r.object_type == ObjectType::PageHeader);

        let mut entries = Vec::with_capacity(record.objects.len());
        for (slot, rec) in record.objects.iter().enumerate() {
            let outcome = if Some(slot) == header_slot {
                ObjectOutcome::Header
            } else if is_sequential {
                ObjectOutcome::Skipped(SkipReason::SequentialPage)
            } else if rec.is_empty() {
                ObjectOutcome::Skipped(SkipReason::Empty)
            } else {
                match decoder_for(rec.object_type) {
                    None => ObjectOutcome::Skipped(SkipReason::NoDecoder),
                    Some(decode) => {
                        cursor.set_context(context.with_object(rec.object_type));
                        cursor.set_position(rec.offset as u64);
                        Self::run_decoder(decode(cursor, rec, &inputs), &mut inputs)?
                    }
                }
            };
            tracing::trace!(page = index, object = %rec.object_type, offset = rec.offset, outcome = outcome_kind(&outcome), "walked object");
            entries.push(PageEntry { record: *rec, outcome });
        }

        tracing::debug!(
            page = index,
            id = record.id,
            data_type = %record.data_type,
            objects = entries.len(),
            "decoded page"
        );

        Ok(Self {
            index,
            id: record.id,
            data_type: record.data_type,
            source_type: record.source_type,
            minor_version: record.minor_version,
            objects: record.objects,
            header,
            entries,
        })
    }

    /// Turn a decoder result into an outcome, recording values later
    /// objects depend on. Errors that are not object-local are returned.
    fn run_decoder(result: Result<PageObject>, inputs: &mut DecodeInputs) -> Result<ObjectOutcome> {
        match result {
            Ok(obj) => {
                if let PageObject::TipTrackHeader(h) = &obj {
                    inputs.tip_track_info_count = Some(h.info_count);
                }
                Ok(ObjectOutcome::Decoded(obj))
            }
            Err(Error::UnsupportedPayload { reason, offset, context }) => {
                tracing::warn!(%context, offset, %reason, "unsupported object payload");
                Ok(ObjectOutcome::Unsupported { reason })
            }
            Err(Error::CrossObjectDependencyMissing { missing, offset, context }) => {
                tracing::warn!(%context, offset, missing, "object dependency missing");
                Ok(ObjectOutcome::DependencyMissing { missing })
            }
            Err(e) => Err(e),
        }
    }

    /// Decoded payloads, in index order.
    pub fn decoded_objects(&self) -> impl Iterator<Item = &PageObject> + '_ {
        self.entries.iter().filter_map(PageEntry::object)
    }

    /// The page's calibrated samples (first PAGE_DATA object).
    pub fn data(&self) -> Option<&SampleBuffer> {
        self.decoded_objects().find_map(|obj| match obj {
            PageObject::PageData(buf) => Some(buf),
            _ => None,
        })
    }

    /// The page's string bundle (first STRING_DATA object).
    pub fn string_data(&self) -> Option<&StringData> {
        self.decoded_objects().find_map(|obj| match obj {
            PageObject::StringData(s) => Some(s.as_ref()),
            _ => None,
        })
    }

    /// Number of object records walked; always the declared object count.
    #[inline]
    pub fn walked_objects(&self) -> usize {
        self.entries.len()
    }
}

/// Short label of an outcome for trace output.
fn outcome_kind(outcome: &ObjectOutcome) -> &'static str {
    match outcome {
        ObjectOutcome::Header => "header",
        ObjectOutcome::Decoded(_) => "decoded",
        ObjectOutcome::Skipped(_) => "skipped",
        ObjectOutcome::Unsupported { .. } => "unsupported",
        ObjectOutcome::DependencyMissing { .. } => "dependency-missing",
    }
}
