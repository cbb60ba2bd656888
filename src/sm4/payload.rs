//! Page sub-object payloads.
//!
//! Each page's object index points at auxiliary objects (drift tables, string
//! bundles, controller settings, ...) and at the raw sample data. Decoding is
//! dispatched on the object tag through [`DECODERS`]; tags without an entry
//! are skipped by the caller.
//!
//! Some payloads depend on values from elsewhere in the page: the sample
//! calibration and the spectroscopy drift row count come from the page
//! header, the tip-track data length from a preceding tip-track header, and
//! the PRM data position from the page's PRM record. These arrive by value in
//! [`DecodeInputs`], so every decoder only reads from its own cursor.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cursor::Cursor;
use super::format::*;
use super::object::ObjectRecord;
use crate::util::{Error, Result};

/// Values a page's object decoders need from outside their own object.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecodeInputs {
    /// Lines of the page (rows of a spectroscopy drift table).
    pub y_size: u32,
    pub z_scale: f32,
    pub z_offset: f32,
    /// Info count of the most recent tip-track header of the page.
    pub tip_track_info_count: Option<u32>,
    /// Offset of the page's PRM record.
    pub prm_data_offset: Option<u32>,
}

/// Signature shared by every payload decoder.
///
/// The cursor is positioned at the object's offset, with its context set to
/// the page and object being decoded.
pub type DecodeFn = fn(&mut Cursor<'_>, &ObjectRecord, &DecodeInputs) -> Result<PageObject>;

/// Tag to decoder table.
///
/// HISTORY_INFO, COLOR_INFO, THUMBNAIL, THUMBNAIL_HEADER and PRM have no
/// entry: their payloads are not decoded.
pub static DECODERS: &[(ObjectType, DecodeFn)] = &[
    (ObjectType::PageData, decode_page_data),
    (ObjectType::ImageDriftHeader, decode_image_drift_header),
    (ObjectType::ImageDrift, decode_image_drift),
    (ObjectType::SpecDriftHeader, decode_spec_drift_header),
    (ObjectType::SpecDriftData, decode_spec_drift_data),
    (ObjectType::StringData, decode_string_data),
    (ObjectType::TipTrackHeader, decode_tip_track_header),
    (ObjectType::TipTrackData, decode_tip_track_data),
    (ObjectType::PrmHeader, decode_prm_header),
    (ObjectType::ApiInfo, decode_api_info),
    (ObjectType::PiezoSensitivity, decode_piezo_sensitivity),
    (ObjectType::FrequencySweepData, decode_frequency_sweep),
    (ObjectType::ScanProcessorInfo, decode_scan_processor),
    (ObjectType::PllInfo, decode_pll_info),
    (ObjectType::Ch1DriveInfo, decode_ch1_drive),
    (ObjectType::Ch2DriveInfo, decode_ch2_drive),
    (ObjectType::Lockin0Info, decode_lockin0),
    (ObjectType::Lockin1Info, decode_lockin1),
    (ObjectType::ZpiInfo, decode_zpi),
    (ObjectType::KpiInfo, decode_kpi),
    (ObjectType::AuxPiInfo, decode_aux_pi),
    (ObjectType::LowpassFilter0Info, decode_lowpass0),
    (ObjectType::LowpassFilter1Info, decode_lowpass1),
];

/// Decoder registered for a tag.
pub fn decoder_for(object_type: ObjectType) -> Option<DecodeFn> {
    DECODERS
        .iter()
        .find(|(tag, _)| *tag == object_type)
        .map(|&(_, decode)| decode)
}

/// Decoded page sub-object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageObject {
    PageData(SampleBuffer),
    ImageDriftHeader(DriftHeader),
    ImageDrift(ImageDrift),
    SpecDriftHeader(SpecDriftHeader),
    SpecDriftData(SpecDriftData),
    StringData(Box<StringData>),
    TipTrackHeader(TipTrackHeader),
    TipTrackData(TipTrackData),
    PrmHeader(PrmHeader),
    ApiInfo(ApiInfo),
    PiezoSensitivity(PiezoSensitivity),
    FrequencySweep(FrequencySweep),
    ScanProcessor(ScanProcessorInfo),
    Pll(Box<PllInfo>),
    Drive(DriveInfo),
    Lockin(LockinInfo),
    PiController(PiControllerInfo),
    LowpassFilter(LowpassFilterInfo),
}

impl PageObject {
    /// Tag of the object this payload was decoded from.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::PageData(_) => ObjectType::PageData,
            Self::ImageDriftHeader(_) => ObjectType::ImageDriftHeader,
            Self::ImageDrift(_) => ObjectType::ImageDrift,
            Self::SpecDriftHeader(_) => ObjectType::SpecDriftHeader,
            Self::SpecDriftData(_) => ObjectType::SpecDriftData,
            Self::StringData(_) => ObjectType::StringData,
            Self::TipTrackHeader(_) => ObjectType::TipTrackHeader,
            Self::TipTrackData(_) => ObjectType::TipTrackData,
            Self::PrmHeader(_) => ObjectType::PrmHeader,
            Self::ApiInfo(_) => ObjectType::ApiInfo,
            Self::PiezoSensitivity(_) => ObjectType::PiezoSensitivity,
            Self::FrequencySweep(_) => ObjectType::FrequencySweepData,
            Self::ScanProcessor(_) => ObjectType::ScanProcessorInfo,
            Self::Pll(_) => ObjectType::PllInfo,
            Self::Drive(d) if d.channel == 2 => ObjectType::Ch2DriveInfo,
            Self::Drive(_) => ObjectType::Ch1DriveInfo,
            Self::Lockin(l) if l.index == 1 => ObjectType::Lockin1Info,
            Self::Lockin(_) => ObjectType::Lockin0Info,
            Self::PiController(pi) => pi.kind.object_type(),
            Self::LowpassFilter(f) if f.index == 1 => ObjectType::LowpassFilter1Info,
            Self::LowpassFilter(_) => ObjectType::LowpassFilter0Info,
        }
    }
}

/// Convert a stored epoch time (seconds) to a UTC timestamp.
fn epoch_time(seconds: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)
}

/// Capacity for `count` records of `record_size` bytes, bounded by the source.
fn bounded_capacity(cursor: &Cursor<'_>, count: u64, record_size: u64) -> usize {
    count.min(cursor.remaining() / record_size) as usize
}

// ============================================================================
// Sample data
// ============================================================================

/// Calibrated samples of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleBuffer {
    values: Vec<f32>,
}

impl SampleBuffer {
    /// Read `size / 4` raw `i32` samples and calibrate them.
    pub fn read(cursor: &mut Cursor<'_>, size: u32, z_scale: f32, z_offset: f32) -> Result<Self> {
        let raw = cursor.read_i32_array(size as usize / 4)?;
        Ok(Self::calibrate(&raw, z_scale, z_offset))
    }

    /// `raw * z_scale + z_offset` for every sample.
    pub fn calibrate(raw: &[i32], z_scale: f32, z_offset: f32) -> Self {
        let values = raw
            .iter()
            .map(|&r| (r as f64 * z_scale as f64 + z_offset as f64) as f32)
            .collect();
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

impl std::ops::Deref for SampleBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.values
    }
}

fn decode_page_data(c: &mut Cursor<'_>, r: &ObjectRecord, i: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::PageData(SampleBuffer::read(c, r.size, i.z_scale, i.z_offset)?))
}

// ============================================================================
// Drift
// ============================================================================

/// Image drift header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftHeader {
    /// Seconds since the Unix epoch.
    pub filetime: u64,
    pub drift_option: DriftOption,
}

impl DriftHeader {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let filetime = cursor.read_u64()?;
        let drift_option = DriftOption::from_raw(cursor.read_u32()?);
        Ok(Self { filetime, drift_option })
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        epoch_time(self.filetime)
    }
}

/// One image drift vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDriftRecord {
    pub time: u32,
    pub dx: u32,
    pub dy: u32,
    pub cumulative_x: u32,
    pub cumulative_y: u32,
    pub vector_x: u32,
    pub vector_y: u32,
}

/// Image drift vectors, `size / 28` records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageDrift {
    pub records: Vec<ImageDriftRecord>,
}

impl ImageDrift {
    const RECORD_SIZE: u32 = 7 * 4;

    pub fn read(cursor: &mut Cursor<'_>, size: u32) -> Result<Self> {
        let count = size / Self::RECORD_SIZE;
        let mut records = Vec::with_capacity(bounded_capacity(cursor, count as u64, Self::RECORD_SIZE as u64));
        for _ in 0..count {
            records.push(ImageDriftRecord {
                time: cursor.read_u32()?,
                dx: cursor.read_u32()?,
                dy: cursor.read_u32()?,
                cumulative_x: cursor.read_u32()?,
                cumulative_y: cursor.read_u32()?,
                vector_x: cursor.read_u32()?,
                vector_y: cursor.read_u32()?,
            });
        }
        Ok(Self { records })
    }
}

/// Spectroscopy drift header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecDriftHeader {
    /// Seconds since the Unix epoch.
    pub filetime: u64,
    pub drift_option: DriftOption,
    pub channel: String,
}

impl SpecDriftHeader {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let filetime = cursor.read_u64()?;
        let drift_option = DriftOption::from_raw(cursor.read_u32()?);
        let _reserved = cursor.read_u32()?;
        let channel = cursor.read_sm4_string()?;
        Ok(Self { filetime, drift_option, channel })
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        epoch_time(self.filetime)
    }
}

/// One row of a spectroscopy drift table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecDriftRecord {
    pub time: f32,
    pub x_coord: f32,
    pub y_coord: f32,
    pub dx: f32,
    pub dy: f32,
    pub cumulative_x: f32,
    pub cumulative_y: f32,
}

/// Spectroscopy drift table, one row per page line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecDriftData {
    pub records: Vec<SpecDriftRecord>,
}

impl SpecDriftData {
    /// Read `rows` records; the row count is the page header's `y_size`.
    pub fn read(cursor: &mut Cursor<'_>, rows: u32) -> Result<Self> {
        let mut records = Vec::with_capacity(bounded_capacity(cursor, rows as u64, 7 * 4));
        for _ in 0..rows {
            records.push(SpecDriftRecord {
                time: cursor.read_f32()?,
                x_coord: cursor.read_f32()?,
                y_coord: cursor.read_f32()?,
                dx: cursor.read_f32()?,
                dy: cursor.read_f32()?,
                cumulative_x: cursor.read_f32()?,
                cumulative_y: cursor.read_f32()?,
            });
        }
        Ok(Self { records })
    }
}

fn decode_image_drift_header(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::ImageDriftHeader(DriftHeader::read(c)?))
}

fn decode_image_drift(c: &mut Cursor<'_>, r: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::ImageDrift(ImageDrift::read(c, r.size)?))
}

fn decode_spec_drift_header(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::SpecDriftHeader(SpecDriftHeader::read(c)?))
}

fn decode_spec_drift_data(c: &mut Cursor<'_>, _: &ObjectRecord, i: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::SpecDriftData(SpecDriftData::read(c, i.y_size)?))
}

// ============================================================================
// Strings
// ============================================================================

/// Text bundle attached to a page.
///
/// `date` is written as `M/D/YY` and `time` as `H:MM:SS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringData {
    pub label: String,
    pub system_text: String,
    pub session_text: String,
    pub user_text: String,
    pub filename: String,
    pub date: String,
    pub time: String,
    pub x_units: String,
    pub y_units: String,
    pub z_units: String,
    pub x_label: String,
    pub y_label: String,
    pub status_channel_text: String,
    pub completed_line_count: String,
    pub oversampling_count: String,
    pub sliced_voltage: String,
    pub pll_pro_status: String,
    pub setpoint_unit: String,
    pub channel_list: String,
}

impl StringData {
    /// Read the [`STRING_DATA_COUNT`] strings in file order.
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            label: cursor.read_sm4_string()?,
            system_text: cursor.read_sm4_string()?,
            session_text: cursor.read_sm4_string()?,
            user_text: cursor.read_sm4_string()?,
            filename: cursor.read_sm4_string()?,
            date: cursor.read_sm4_string()?,
            time: cursor.read_sm4_string()?,
            x_units: cursor.read_sm4_string()?,
            y_units: cursor.read_sm4_string()?,
            z_units: cursor.read_sm4_string()?,
            x_label: cursor.read_sm4_string()?,
            y_label: cursor.read_sm4_string()?,
            status_channel_text: cursor.read_sm4_string()?,
            completed_line_count: cursor.read_sm4_string()?,
            oversampling_count: cursor.read_sm4_string()?,
            sliced_voltage: cursor.read_sm4_string()?,
            pll_pro_status: cursor.read_sm4_string()?,
            setpoint_unit: cursor.read_sm4_string()?,
            channel_list: cursor.read_sm4_string()?,
        })
    }
}

fn decode_string_data(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::StringData(Box::new(StringData::read(c)?)))
}

// ============================================================================
// Tip tracking
// ============================================================================

/// Tip-track header; `info_count` sizes the page's tip-track data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TipTrackHeader {
    /// Seconds since the Unix epoch.
    pub filetime: u64,
    pub feature_height: f32,
    pub feature_width: f32,
    pub time_constant: f32,
    pub cycle_rate: f32,
    pub phase_lag: f32,
    pub info_count: u32,
    pub channel: String,
}

impl TipTrackHeader {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let filetime = cursor.read_u64()?;
        let feature_height = cursor.read_f32()?;
        let feature_width = cursor.read_f32()?;
        let time_constant = cursor.read_f32()?;
        let cycle_rate = cursor.read_f32()?;
        let phase_lag = cursor.read_f32()?;
        let _reserved = cursor.read_u32()?;
        let info_count = cursor.read_u32()?;
        let channel = cursor.read_sm4_string()?;
        Ok(Self {
            filetime,
            feature_height,
            feature_width,
            time_constant,
            cycle_rate,
            phase_lag,
            info_count,
            channel,
        })
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        epoch_time(self.filetime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TipTrackRecord {
    pub cumulative_time: f32,
    pub time: f32,
    pub dx: f32,
    pub dy: f32,
}

/// Tip-track samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TipTrackData {
    pub records: Vec<TipTrackRecord>,
}

impl TipTrackData {
    /// Read `info_count` records, as announced by the tip-track header.
    pub fn read(cursor: &mut Cursor<'_>, info_count: u32) -> Result<Self> {
        let mut records = Vec::with_capacity(bounded_capacity(cursor, info_count as u64, 4 * 4));
        for _ in 0..info_count {
            records.push(TipTrackRecord {
                cumulative_time: cursor.read_f32()?,
                time: cursor.read_f32()?,
                dx: cursor.read_f32()?,
                dy: cursor.read_f32()?,
            });
        }
        Ok(Self { records })
    }
}

fn decode_tip_track_header(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::TipTrackHeader(TipTrackHeader::read(c)?))
}

fn decode_tip_track_data(c: &mut Cursor<'_>, r: &ObjectRecord, i: &DecodeInputs) -> Result<PageObject> {
    let info_count = i.tip_track_info_count.ok_or(Error::CrossObjectDependencyMissing {
        missing: "a TIP_TRACK_HEADER info count",
        offset: r.offset as u64,
        context: c.context(),
    })?;
    Ok(PageObject::TipTrackData(TipTrackData::read(c, info_count)?))
}

// ============================================================================
// PRM
// ============================================================================

/// Page-level PRM header and its uncompressed data words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrmHeader {
    pub compression_flag: u32,
    pub data_size: u32,
    pub compressed_size: u32,
    /// `data_size` raw words.
    pub data: Vec<u32>,
}

impl PrmHeader {
    /// Read the PRM header at the cursor, then its data.
    ///
    /// The data is read at `data_offset` when the page has a PRM record and
    /// right after the header otherwise. Compressed data is reported as
    /// [`Error::UnsupportedPayload`].
    pub fn read(cursor: &mut Cursor<'_>, data_offset: Option<u32>) -> Result<Self> {
        let header_pos = cursor.position();
        let compression_flag = cursor.read_u32()?;
        let data_size = cursor.read_u32()?;
        let compressed_size = cursor.read_u32()?;

        if compression_flag != PRM_UNCOMPRESSED {
            return Err(Error::UnsupportedPayload {
                reason: format!(
                    "compressed PRM data ({} bytes, {} inflated) cannot be decoded",
                    compressed_size, data_size
                ),
                offset: header_pos,
                context: cursor.context(),
            });
        }

        if let Some(offset) = data_offset {
            cursor.set_position(offset as u64);
        }
        let data = cursor.read_u32_array(data_size as usize)?;

        Ok(Self { compression_flag, data_size, compressed_size, data })
    }
}

fn decode_prm_header(c: &mut Cursor<'_>, _: &ObjectRecord, i: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::PrmHeader(PrmHeader::read(c, i.prm_data_offset)?))
}

// ============================================================================
// Instrument settings
// ============================================================================

/// Read the `u32` string count followed by that many strings.
fn read_counted_strings(cursor: &mut Cursor<'_>) -> Result<Vec<String>> {
    let count = cursor.read_u32()?;
    cursor.read_sm4_strings(count as usize)
}

/// Scan ramp and DAC settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub voltage_high: f32,
    pub voltage_low: f32,
    pub gain: f32,
    pub offset: f32,
    pub ramp_mode: u32,
    pub ramp_type: u32,
    pub step: u32,
    pub image_count: u32,
    pub dac: u32,
    pub mux: u32,
    pub stm_bias: u32,
    pub strings: Vec<String>,
}

impl ApiInfo {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            voltage_high: cursor.read_f32()?,
            voltage_low: cursor.read_f32()?,
            gain: cursor.read_f32()?,
            offset: cursor.read_f32()?,
            ramp_mode: cursor.read_u32()?,
            ramp_type: cursor.read_u32()?,
            step: cursor.read_u32()?,
            image_count: cursor.read_u32()?,
            dac: cursor.read_u32()?,
            mux: cursor.read_u32()?,
            stm_bias: cursor.read_u32()?,
            strings: read_counted_strings(cursor)?,
        })
    }

    /// Unit of the voltage fields.
    pub fn units(&self) -> Option<&str> {
        self.strings.first().map(String::as_str)
    }
}

/// Piezo calibration of the scanner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiezoSensitivity {
    pub tube_x: f64,
    pub tube_y: f64,
    pub tube_z: f64,
    pub tube_z_offset: f64,
    pub scan_x: f64,
    pub scan_y: f64,
    pub scan_z: f64,
    pub actuator: f64,
    /// Units of the values above, then the calibration names.
    pub strings: Vec<String>,
}

impl PiezoSensitivity {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            tube_x: cursor.read_f64()?,
            tube_y: cursor.read_f64()?,
            tube_z: cursor.read_f64()?,
            tube_z_offset: cursor.read_f64()?,
            scan_x: cursor.read_f64()?,
            scan_y: cursor.read_f64()?,
            scan_z: cursor.read_f64()?,
            actuator: cursor.read_f64()?,
            strings: read_counted_strings(cursor)?,
        })
    }
}

/// Result of a cantilever frequency sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencySweep {
    pub psd_total_signal: f64,
    pub peak_frequency: f64,
    pub peak_amplitude: f64,
    pub drive_amplitude: f64,
    pub signal_to_drive_ratio: f64,
    pub q_factor: f64,
    pub strings: Vec<String>,
}

impl FrequencySweep {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            psd_total_signal: cursor.read_f64()?,
            peak_frequency: cursor.read_f64()?,
            peak_amplitude: cursor.read_f64()?,
            drive_amplitude: cursor.read_f64()?,
            signal_to_drive_ratio: cursor.read_f64()?,
            q_factor: cursor.read_f64()?,
            strings: read_counted_strings(cursor)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanProcessorInfo {
    pub x_slope_compensation: f64,
    pub y_slope_compensation: f64,
    pub strings: Vec<String>,
}

impl ScanProcessorInfo {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            x_slope_compensation: cursor.read_f64()?,
            y_slope_compensation: cursor.read_f64()?,
            strings: read_counted_strings(cursor)?,
        })
    }
}

/// Phase-locked loop settings. The string count precedes the numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PllInfo {
    pub amplitude_control: u32,
    pub drive_amplitude: f64,
    pub drive_ref_frequency: f64,
    pub lockin_freq_offset: f64,
    pub lockin_harmonic_factor: f64,
    pub lockin_phase_offset: f64,
    pub pi_gain: f64,
    pub pi_int_cutoff_frequency: f64,
    pub pi_lower_bound: f64,
    pub pi_upper_bound: f64,
    pub diss_pi_gain: f64,
    pub diss_pi_int_cutoff_frequency: f64,
    pub diss_pi_lower_bound: f64,
    pub diss_pi_upper_bound: f64,
    pub lockin_filter_cutoff_frequency: f64,
    pub strings: Vec<String>,
}

impl PllInfo {
    pub fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let string_count = cursor.read_u32()?;
        let amplitude_control = cursor.read_u32()?;
        let drive_amplitude = cursor.read_f64()?;
        let drive_ref_frequency = cursor.read_f64()?;
        let lockin_freq_offset = cursor.read_f64()?;
        let lockin_harmonic_factor = cursor.read_f64()?;
        let lockin_phase_offset = cursor.read_f64()?;
        let pi_gain = cursor.read_f64()?;
        let pi_int_cutoff_frequency = cursor.read_f64()?;
        let pi_lower_bound = cursor.read_f64()?;
        let pi_upper_bound = cursor.read_f64()?;
        let diss_pi_gain = cursor.read_f64()?;
        let diss_pi_int_cutoff_frequency = cursor.read_f64()?;
        let diss_pi_lower_bound = cursor.read_f64()?;
        let diss_pi_upper_bound = cursor.read_f64()?;
        let lockin_filter_cutoff_frequency = cursor.read_f64()?;
        let strings = cursor.read_sm4_strings(string_count as usize)?;
        Ok(Self {
            amplitude_control,
            drive_amplitude,
            drive_ref_frequency,
            lockin_freq_offset,
            lockin_harmonic_factor,
            lockin_phase_offset,
            pi_gain,
            pi_int_cutoff_frequency,
            pi_lower_bound,
            pi_upper_bound,
            diss_pi_gain,
            diss_pi_int_cutoff_frequency,
            diss_pi_lower_bound,
            diss_pi_upper_bound,
            lockin_filter_cutoff_frequency,
            strings,
        })
    }
}

/// Oscillator drive of channel 1 or 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveInfo {
    pub channel: u8,
    pub master_oscillator: u32,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase_offset: f64,
    pub harmonic_factor: f64,
    pub strings: Vec<String>,
}

impl DriveInfo {
    pub fn read(cursor: &mut Cursor<'_>, channel: u8) -> Result<Self> {
        let string_count = cursor.read_u32()?;
        let master_oscillator = cursor.read_u32()?;
        let amplitude = cursor.read_f64()?;
        let frequency = cursor.read_f64()?;
        let phase_offset = cursor.read_f64()?;
        let harmonic_factor = cursor.read_f64()?;
        let strings = cursor.read_sm4_strings(string_count as usize)?;
        Ok(Self {
            channel,
            master_oscillator,
            amplitude,
            frequency,
            phase_offset,
            harmonic_factor,
            strings,
        })
    }
}

/// Lock-in amplifier 0 or 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockinInfo {
    pub index: u8,
    pub non_master_oscillator: u32,
    pub frequency: f64,
    pub harmonic_factor: f64,
    pub phase_offset: f64,
    pub strings: Vec<String>,
}

impl LockinInfo {
    pub fn read(cursor: &mut Cursor<'_>, index: u8) -> Result<Self> {
        let string_count = cursor.read_u32()?;
        let non_master_oscillator = cursor.read_u32()?;
        let frequency = cursor.read_f64()?;
        let harmonic_factor = cursor.read_f64()?;
        let phase_offset = cursor.read_f64()?;
        let strings = cursor.read_sm4_strings(string_count as usize)?;
        Ok(Self {
            index,
            non_master_oscillator,
            frequency,
            harmonic_factor,
            phase_offset,
            strings,
        })
    }
}

/// Which PI feedback loop a controller record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PiController {
    Z,
    K,
    Aux,
}

impl PiController {
    pub fn object_type(self) -> ObjectType {
        match self {
            Self::Z => ObjectType::ZpiInfo,
            Self::K => ObjectType::KpiInfo,
            Self::Aux => ObjectType::AuxPiInfo,
        }
    }
}

/// PI controller settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiControllerInfo {
    pub kind: PiController,
    pub setpoint: f64,
    pub proportional_gain: f64,
    pub integral_gain: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Feedback type, then the units of setpoint, gains and output.
    pub strings: Vec<String>,
}

impl PiControllerInfo {
    pub fn read(cursor: &mut Cursor<'_>, kind: PiController) -> Result<Self> {
        Ok(Self {
            kind,
            setpoint: cursor.read_f64()?,
            proportional_gain: cursor.read_f64()?,
            integral_gain: cursor.read_f64()?,
            lower_bound: cursor.read_f64()?,
            upper_bound: cursor.read_f64()?,
            strings: read_counted_strings(cursor)?,
        })
    }

    pub fn feedback_type(&self) -> Option<&str> {
        self.strings.first().map(String::as_str)
    }

    pub fn setpoint_unit(&self) -> Option<&str> {
        self.strings.get(1).map(String::as_str)
    }
}

/// Low-pass filter 0 or 1; the cutoff frequency is stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowpassFilterInfo {
    pub index: u8,
    pub strings: Vec<String>,
}

impl LowpassFilterInfo {
    pub fn read(cursor: &mut Cursor<'_>, index: u8) -> Result<Self> {
        Ok(Self { index, strings: read_counted_strings(cursor)? })
    }

    pub fn cutoff_frequency(&self) -> Option<&str> {
        self.strings.first().map(String::as_str)
    }
}

fn decode_api_info(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::ApiInfo(ApiInfo::read(c)?))
}

fn decode_piezo_sensitivity(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::PiezoSensitivity(PiezoSensitivity::read(c)?))
}

fn decode_frequency_sweep(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::FrequencySweep(FrequencySweep::read(c)?))
}

fn decode_scan_processor(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::ScanProcessor(ScanProcessorInfo::read(c)?))
}

fn decode_pll_info(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::Pll(Box::new(PllInfo::read(c)?)))
}

fn decode_ch1_drive(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::Drive(DriveInfo::read(c, 1)?))
}

fn decode_ch2_drive(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::Drive(DriveInfo::read(c, 2)?))
}

fn decode_lockin0(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::Lockin(LockinInfo::read(c, 0)?))
}

fn decode_lockin1(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::Lockin(LockinInfo::read(c, 1)?))
}

fn decode_zpi(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::PiController(PiControllerInfo::read(c, PiController::Z)?))
}

fn decode_kpi(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::PiController(PiControllerInfo::read(c, PiController::K)?))
}

fn decode_aux_pi(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::PiController(PiControllerInfo::read(c, PiController::Aux)?))
}

fn decode_lowpass0(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::LowpassFilter(LowpassFilterInfo::read(c, 0)?))
}

fn decode_lowpass1(c: &mut Cursor<'_>, _: &ObjectRecord, _: &DecodeInputs) -> Result<PageObject> {
    Ok(PageObject::LowpassFilter(LowpassFilterInfo::read(c, 1)?))
}
