//! Page header variants.
//!
//! The page header layout depends on the page's data type: sequential pages
//! carry a list of sweep parameters, every other page carries the geometry
//! and calibration fields used to scale its samples. There is no length field
//! or resync marker, so both layouts are read field by field in file order.

use serde::Serialize;

use super::cursor::Cursor;
use super::format::*;
use super::object::ObjectRecord;
use crate::util::Result;

/// Decoded page header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageHeader {
    /// Imaging and spectroscopy pages.
    Default(DefaultPageHeader),
    /// Parametric sweep pages.
    Sequential(SequentialPageHeader),
}

impl PageHeader {
    /// Decode the header at the cursor position using the layout for `data_type`.
    pub fn read(cursor: &mut Cursor<'_>, data_type: PageDataType) -> Result<Self> {
        match data_type {
            PageDataType::Sequential => Ok(Self::Sequential(SequentialPageHeader::read(cursor)?)),
            _ => Ok(Self::Default(DefaultPageHeader::read(cursor)?)),
        }
    }

    /// The default header, if this is one.
    pub fn as_default(&self) -> Option<&DefaultPageHeader> {
        match self {
            Self::Default(header) => Some(header),
            Self::Sequential(_) => None,
        }
    }

    /// The sequential header, if this is one.
    pub fn as_sequential(&self) -> Option<&SequentialPageHeader> {
        match self {
            Self::Sequential(header) => Some(header),
            Self::Default(_) => None,
        }
    }
}

/// Header of an imaging or spectroscopy page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultPageHeader {
    pub string_count: u16,
    pub page_type: PageType,
    pub data_sub_source: u32,
    pub line_type: LineType,
    pub x_corner: u32,
    pub y_corner: u32,
    /// Samples per line (x resolution).
    pub x_size: u32,
    /// Lines (y resolution).
    pub y_size: u32,
    pub image_type: ImageType,
    pub scan_type: ScanType,
    pub group_id: u32,
    pub page_data_size: u32,
    pub min_z_value: u32,
    pub max_z_value: u32,
    /// `x_scale * x_size` is the physical width.
    pub x_scale: f32,
    pub y_scale: f32,
    pub z_scale: f32,
    pub xy_scale: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    pub period: f32,
    pub bias: f32,
    pub current: f32,
    /// Scan rotation in degrees.
    pub angle: f32,
    pub color_info_count: u32,
    pub grid_x_size: u32,
    pub grid_y_size: u32,
    pub object_list_count: u32,
    pub data_32bit_flag: u8,
    /// Trailing record locating the page's sample data.
    pub data_object: ObjectRecord,
}

impl DefaultPageHeader {
    /// Decode a default header at the cursor position.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.skip(2);
        let string_count = cursor.read_u16()?;
        let page_type = PageType::from_raw(cursor.read_u32()?);
        let data_sub_source = cursor.read_u32()?;
        let line_type = LineType::from_raw(cursor.read_u32()?);

        let x_corner = cursor.read_u32()?;
        let y_corner = cursor.read_u32()?;
        let x_size = cursor.read_u32()?;
        let y_size = cursor.read_u32()?;

        let image_type = ImageType::from_raw(cursor.read_u32()?);
        let scan_type = ScanType::from_raw(cursor.read_u32()?);

        let group_id = cursor.read_u32()?;
        let page_data_size = cursor.read_u32()?;
        let min_z_value = cursor.read_u32()?;
        let max_z_value = cursor.read_u32()?;

        let x_scale = cursor.read_f32()?;
        let y_scale = cursor.read_f32()?;
        let z_scale = cursor.read_f32()?;
        let xy_scale = cursor.read_f32()?;
        let x_offset = cursor.read_f32()?;
        let y_offset = cursor.read_f32()?;
        let z_offset = cursor.read_f32()?;
        let period = cursor.read_f32()?;
        let bias = cursor.read_f32()?;
        let current = cursor.read_f32()?;
        let angle = cursor.read_f32()?;

        let color_info_count = cursor.read_u32()?;
        let grid_x_size = cursor.read_u32()?;
        let grid_y_size = cursor.read_u32()?;

        let object_list_count = cursor.read_u32()?;
        let data_32bit_flag = cursor.read_u8()?;

        cursor.skip(PAGE_HEADER_RESERVED as u64);

        let data_object = ObjectRecord::read(cursor)?;

        Ok(Self {
            string_count,
            page_type,
            data_sub_source,
            line_type,
            x_corner,
            y_corner,
            x_size,
            y_size,
            image_type,
            scan_type,
            group_id,
            page_data_size,
            min_z_value,
            max_z_value,
            x_scale,
            y_scale,
            z_scale,
            xy_scale,
            x_offset,
            y_offset,
            z_offset,
            period,
            bias,
            current,
            angle,
            color_info_count,
            grid_x_size,
            grid_y_size,
            object_list_count,
            data_32bit_flag,
            data_object,
        })
    }
}

/// One swept parameter of a sequential page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequentialParam {
    pub gain: f32,
    pub label: String,
    pub unit: String,
}

/// Header of a sequential (parametric sweep) page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequentialPageHeader {
    pub data_type: u32,
    pub data_length: u32,
    pub param_count: u32,
    pub object_list_count: u32,
    pub data_info_size: u32,
    pub data_info_string_count: u32,
    /// Record between the fixed fields and the parameter list.
    pub data_object: ObjectRecord,
    pub params: Vec<SequentialParam>,
}

impl SequentialPageHeader {
    /// Decode a sequential header at the cursor position.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let data_type = cursor.read_u32()?;
        let data_length = cursor.read_u32()?;
        let param_count = cursor.read_u32()?;
        let object_list_count = cursor.read_u32()?;
        let data_info_size = cursor.read_u32()?;
        let data_info_string_count = cursor.read_u32()?;
        let data_object = ObjectRecord::read(cursor)?;

        // gain + two empty strings is the smallest possible parameter
        let capacity = (param_count as u64).min(cursor.remaining() / 8) as usize;
        let mut params = Vec::with_capacity(capacity);
        for _ in 0..param_count {
            let gain = cursor.read_f32()?;
            let label = cursor.read_sm4_string()?;
            let unit = cursor.read_sm4_string()?;
            params.push(SequentialParam { gain, label, unit });
        }

        Ok(Self {
            data_type,
            data_length,
            param_count,
            object_list_count,
            data_info_size,
            data_info_string_count,
            data_object,
            params,
        })
    }
}
