//! Calibrated channel views of decoded pages.
//!
//! A [`Channel`] combines a page's default header, its calibrated samples and
//! a resolved acquisition timestamp. Channels are projected from a finished
//! [`Container`](crate::sm4::Container) and hold no reference back to it.
//!
//! ## Example
//!
//! ```ignore
//! use sm4::Sm4;
//!
//! let sm4 = Sm4::open("scan.SM4")?;
//! for ch in sm4.topography_channels() {
//!     println!("{}x{} at {:?}", ch.xres, ch.yres, ch.timestamp);
//! }
//! ```

mod collection;

pub use collection::*;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::sm4::{ImageType, LineType, Page, PageHeader, PageType, ScanType};

/// Physically scaled view of one imaging or spectroscopy page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub page_type: PageType,
    pub line_type: LineType,
    /// Acquisition time, instrument-local.
    pub timestamp: Option<NaiveDateTime>,
    /// Samples per line.
    pub xres: u32,
    /// Number of lines.
    pub yres: u32,
    pub image_type: ImageType,
    pub scan_type: ScanType,
    /// Physical width (`x_scale * xres`).
    pub xsize: f32,
    /// Physical height (`y_scale * yres`).
    pub ysize: f32,
    pub z_scale: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    pub period: f32,
    pub bias: f32,
    pub current: f32,
    pub angle: f32,
    /// Calibrated samples, row-major.
    #[serde(skip)]
    pub data: Vec<f32>,
}

impl Channel {
    /// Project a decoded page.
    ///
    /// Returns `None` for sequential pages and for pages without sample data.
    /// `fallback` is used when the page has no parseable string bundle date.
    /// With several string bundles on a page, the first one sets the timestamp.
    pub fn from_page(page: &Page, fallback: Option<NaiveDateTime>) -> Option<Self> {
        let header = match &page.header {
            PageHeader::Default(h) => h,
            PageHeader::Sequential(_) => return None,
        };
        let data = page.data()?;

        let stamped = page
            .string_data()
            .and_then(|s| parse_sm4_datetime(&s.date, &s.time));
        let timestamp = match stamped {
            Some(ts) => Some(ts),
            None => {
                tracing::warn!(page = page.index, fallback = ?fallback, "no page timestamp, using file time");
                fallback
            }
        };

        Some(Self {
            page_type: header.page_type,
            line_type: header.line_type,
            timestamp,
            xres: header.x_size,
            yres: header.y_size,
            image_type: header.image_type,
            scan_type: header.scan_type,
            xsize: header.x_scale * header.x_size as f32,
            ysize: header.y_scale * header.y_size as f32,
            z_scale: header.z_scale,
            x_offset: header.x_offset,
            y_offset: header.y_offset,
            z_offset: header.z_offset,
            period: header.period,
            bias: header.bias,
            current: header.current,
            angle: header.angle,
            data: data.as_slice().to_vec(),
        })
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One line of samples, when the data holds `xres * yres` values.
    pub fn row(&self, y: usize) -> Option<&[f32]> {
        let width = self.xres as usize;
        if width == 0 || self.data.len() != width * self.yres as usize {
            return None;
        }
        self.data.get(y * width..(y + 1) * width)
    }
}

/// Parse a string bundle's `M/D/YY` date and `H:MM:SS` time.
///
/// Two-digit years are taken as 20YY.
pub fn parse_sm4_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let mut d = date.trim().split('/').map(|p| p.trim().parse::<u32>());
    let (month, day, year) = match (d.next(), d.next(), d.next(), d.next()) {
        (Some(Ok(m)), Some(Ok(d)), Some(Ok(y)), None) => (m, d, y),
        _ => return None,
    };
    let year = if year < 100 { 2000 + year } else { year };

    let mut t = time.trim().split(':').map(|p| p.trim().parse::<u32>());
    let (hour, minute, second) = match (t.next(), t.next(), t.next(), t.next()) {
        (Some(Ok(h)), Some(Ok(m)), Some(Ok(s)), None) => (h, m, s),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)?.and_hms_opt(hour, minute, second)
}
