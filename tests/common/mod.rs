//! Synthetic SM4 image builder shared by the integration tests.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub const TAG_PAGE_INDEX_HEADER: u32 = 1;
pub const TAG_PAGE_INDEX_ARRAY: u32 = 2;
pub const TAG_PAGE_HEADER: u32 = 3;
pub const TAG_PAGE_DATA: u32 = 4;
pub const TAG_IMAGE_DRIFT_HEADER: u32 = 5;
pub const TAG_STRING_DATA: u32 = 10;
pub const TAG_TIP_TRACK_HEADER: u32 = 11;
pub const TAG_TIP_TRACK_DATA: u32 = 12;
pub const TAG_PRM: u32 = 13;
pub const TAG_THUMBNAIL: u32 = 14;
pub const TAG_PRM_HEADER: u32 = 15;

pub const DATA_TYPE_IMAGE: u32 = 0;
pub const DATA_TYPE_LINE: u32 = 1;
pub const DATA_TYPE_SEQUENTIAL: u32 = 6;

const CONTAINER_HEADER_SIZE: usize = 58;
const PAGE_INDEX_HEADER_SIZE: usize = 16;
const PAGE_RECORD_SIZE: usize = 32;
const RECORD_SIZE: usize = 12;

/// One object of a synthetic page.
#[derive(Debug, Clone)]
pub enum Obj {
    /// Payload placed in the data area; the record points at it.
    Blob(u32, Vec<u8>),
    /// Record written verbatim, nothing placed.
    Raw(u32, u32, u32),
}

/// One page of a synthetic container.
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub id: u16,
    pub data_type: u32,
    pub objects: Vec<Obj>,
}

/// Container-level extras.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub pages: Vec<PageSpec>,
    /// `(compression_flag, text)` for a container PRM block.
    pub prm: Option<(u32, Vec<u8>)>,
    /// Leave the PAGE_INDEX_HEADER record out of the container index.
    pub omit_page_index: bool,
    /// Leave the PAGE_INDEX_ARRAY record out of the page index.
    pub omit_page_array: bool,
}

/// Build a complete SM4 image.
pub fn build(spec: &ContainerSpec) -> Vec<u8> {
    let container_records = 1 + if spec.prm.is_some() { 2 } else { 0 };
    let page_index_pos = CONTAINER_HEADER_SIZE + container_records * RECORD_SIZE;
    let table_pos = page_index_pos + PAGE_INDEX_HEADER_SIZE + RECORD_SIZE;
    let table_len: usize = spec
        .pages
        .iter()
        .map(|p| PAGE_RECORD_SIZE + p.objects.len() * RECORD_SIZE)
        .sum();

    // Lay out the data area: container PRM first, then page blobs in order.
    let mut data = Vec::new();
    let data_pos = table_pos + table_len;
    let mut prm_records = Vec::new();
    if let Some((flag, text)) = &spec.prm {
        let header_off = data_pos + data.len();
        data.write_u32::<LittleEndian>(*flag).unwrap();
        data.write_u32::<LittleEndian>(text.len() as u32).unwrap();
        data.write_u32::<LittleEndian>(if *flag == 0 { 0 } else { text.len() as u32 }).unwrap();
        let text_off = data_pos + data.len();
        data.extend_from_slice(text);
        prm_records.push((TAG_PRM_HEADER, header_off as u32, 12u32));
        prm_records.push((TAG_PRM, text_off as u32, text.len() as u32));
    }

    let mut page_records: Vec<Vec<(u32, u32, u32)>> = Vec::new();
    for page in &spec.pages {
        let mut records = Vec::new();
        for obj in &page.objects {
            match obj {
                Obj::Blob(tag, bytes) => {
                    let off = data_pos + data.len();
                    data.extend_from_slice(bytes);
                    records.push((*tag, off as u32, bytes.len() as u32));
                }
                Obj::Raw(tag, off, size) => records.push((*tag, *off, *size)),
            }
        }
        page_records.push(records);
    }

    let mut out = Vec::new();

    // Container header
    out.write_u16::<LittleEndian>(56).unwrap();
    let mut sig: Vec<u8> = "STiMage 005.006 1".bytes().flat_map(|b| [b, 0]).collect();
    sig.resize(36, 0);
    out.extend_from_slice(&sig);
    out.write_u32::<LittleEndian>(spec.pages.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(container_records as u32).unwrap();
    out.write_u32::<LittleEndian>(RECORD_SIZE as u32).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    let index_tag = if spec.omit_page_index { TAG_THUMBNAIL } else { TAG_PAGE_INDEX_HEADER };
    write_record(&mut out, index_tag, page_index_pos as u32, 28);
    for &(tag, off, size) in &prm_records {
        write_record(&mut out, tag, off, size);
    }

    // Page index header
    assert_eq!(out.len(), page_index_pos);
    out.write_u32::<LittleEndian>(spec.pages.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(1).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    let array_tag = if spec.omit_page_array { TAG_THUMBNAIL } else { TAG_PAGE_INDEX_ARRAY };
    write_record(&mut out, array_tag, table_pos as u32, table_len as u32);

    // Page table
    assert_eq!(out.len(), table_pos);
    for (page, records) in spec.pages.iter().zip(&page_records) {
        out.write_u16::<LittleEndian>(page.id).unwrap();
        out.extend_from_slice(&[0u8; 14]);
        out.write_u32::<LittleEndian>(page.data_type).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(records.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(1).unwrap();
        for &(tag, off, size) in records {
            write_record(&mut out, tag, off, size);
        }
    }

    assert_eq!(out.len(), data_pos);
    out.extend_from_slice(&data);
    out
}

fn write_record(out: &mut Vec<u8>, tag: u32, offset: u32, size: u32) {
    out.write_u32::<LittleEndian>(tag).unwrap();
    out.write_u32::<LittleEndian>(offset).unwrap();
    out.write_u32::<LittleEndian>(size).unwrap();
}

/// Calibration and geometry of a default page header.
#[derive(Debug, Clone)]
pub struct HeaderSpec {
    pub page_type: u32,
    pub line_type: u32,
    pub x_size: u32,
    pub y_size: u32,
    pub image_type: u32,
    pub scan_type: u32,
    pub x_scale: f32,
    pub y_scale: f32,
    pub z_scale: f32,
    pub z_offset: f32,
    pub period: f32,
    pub bias: f32,
    pub current: f32,
    pub angle: f32,
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self {
            page_type: 1,
            line_type: 0,
            x_size: 4,
            y_size: 2,
            image_type: 0,
            scan_type: 0,
            x_scale: 75e-9,
            y_scale: 150e-9,
            z_scale: 1.0,
            z_offset: 0.0,
            period: 0.0003,
            bias: -0.171,
            current: 1.997e-10,
            angle: 116.0,
        }
    }
}

/// Default page header bytes, including the trailing data record.
pub fn default_header(h: &HeaderSpec) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(19).unwrap();
    out.write_u32::<LittleEndian>(h.page_type).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(h.line_type).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(h.x_size).unwrap();
    out.write_u32::<LittleEndian>(h.y_size).unwrap();
    out.write_u32::<LittleEndian>(h.image_type).unwrap();
    out.write_u32::<LittleEndian>(h.scan_type).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(h.x_size * h.y_size * 4).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    for v in [
        h.x_scale, h.y_scale, h.z_scale, 0.0, 0.0, 0.0, h.z_offset, h.period, h.bias, h.current, h.angle,
    ] {
        out.write_f32::<LittleEndian>(v).unwrap();
    }
    for _ in 0..4 {
        out.write_u32::<LittleEndian>(0).unwrap();
    }
    out.write_u8(0).unwrap();
    out.extend_from_slice(&[0u8; 63]);
    write_record(&mut out, 0, 0, 0);
    out
}

/// Sequential page header with its data record and `(gain, label, unit)` parameters.
pub fn sequential_header(params: &[(f32, &str, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in [1u32, 0, params.len() as u32, 0, 0, 0] {
        out.write_u32::<LittleEndian>(v).unwrap();
    }
    write_record(&mut out, TAG_PAGE_DATA, 1000, 64);
    for &(gain, label, unit) in params {
        out.write_f32::<LittleEndian>(gain).unwrap();
        write_string(&mut out, label);
        write_string(&mut out, unit);
    }
    out
}

/// Raw `i32` samples.
pub fn samples(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_i32::<LittleEndian>(v).unwrap();
    }
    out
}

/// String bundle with the given date and time; other strings empty.
pub fn string_data(date: &str, time: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..19 {
        match i {
            0 => write_string(&mut out, "Topography"),
            5 => write_string(&mut out, date),
            6 => write_string(&mut out, time),
            9 => write_string(&mut out, "m"),
            _ => write_string(&mut out, ""),
        }
    }
    out
}

/// Tip-track header announcing `info_count` records.
pub fn tip_track_header(info_count: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u64::<LittleEndian>(1_578_492_791).unwrap();
    for v in [1.0f32, 2.0, 3.0, 4.0, 5.0] {
        out.write_f32::<LittleEndian>(v).unwrap();
    }
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(info_count).unwrap();
    write_string(&mut out, "Z");
    out
}

/// `count` tip-track records.
pub fn tip_track_data(count: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..count * 4 {
        out.write_f32::<LittleEndian>(i as f32).unwrap();
    }
    out
}

/// Page-level PRM header followed directly by its data words.
pub fn page_prm(compression_flag: u32, words: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(compression_flag).unwrap();
    out.write_u32::<LittleEndian>(words.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    for &w in words {
        out.write_u32::<LittleEndian>(w).unwrap();
    }
    out
}

pub fn write_string(out: &mut Vec<u8>, s: &str) {
    out.write_u16::<LittleEndian>(s.len() as u16).unwrap();
    out.extend_from_slice(s.as_bytes());
}

/// An image page: header, samples and a dated string bundle.
pub fn image_page(id: u16, header: &HeaderSpec, date: &str, time: &str) -> PageSpec {
    let n = (header.x_size * header.y_size) as i32;
    let raw: Vec<i32> = (0..n).collect();
    PageSpec {
        id,
        data_type: DATA_TYPE_IMAGE,
        objects: vec![
            Obj::Blob(TAG_PAGE_HEADER, default_header(header)),
            Obj::Blob(TAG_PAGE_DATA, samples(&raw)),
            Obj::Blob(TAG_STRING_DATA, string_data(date, time)),
        ],
    }
}

/// Ten image pages in the spirit of a topography/current scan set.
pub fn ten_channel_set() -> ContainerSpec {
    let page_types = [1u32, 2, 3, 4, 5, 1, 2, 3, 4, 5];
    let pages = page_types
        .iter()
        .enumerate()
        .map(|(i, &page_type)| {
            let header = HeaderSpec { page_type, ..HeaderSpec::default() };
            image_page(i as u16 + 1, &header, "1/8/20", "14:13:11")
        })
        .collect();
    ContainerSpec { pages, prm: Some((0, b"[Scan]\r\nRate=1\r\n".to_vec())), ..Default::default() }
}

/// Five IV spectroscopy pages.
pub fn iv_set() -> ContainerSpec {
    let header = HeaderSpec {
        page_type: 38,
        line_type: 7,
        x_size: 299,
        y_size: 5,
        scan_type: 0,
        period: 0.0025,
        bias: 0.99411,
        current: 4.31244e-11,
        angle: 0.0,
        ..HeaderSpec::default()
    };
    let pages = (0..5).map(|i| image_page(i + 1, &header, "6/17/23", "11:12:42")).collect();
    ContainerSpec { pages, ..Default::default() }
}
