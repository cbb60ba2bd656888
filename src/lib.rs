//! # SM4
//!
//! Rust reader for the RHK Technology SM4 scanning microscopy (SPM) format.
//!
//! SM4 files hold a set of pages (topography and current images, spectroscopy
//! curves, parametric sweeps), each with a header, calibrated sample data and
//! a collection of tagged auxiliary objects.
//!
//! ## Modules
//!
//! - [`util`] - Error and context types
//! - [`sm4`] - Low-level binary format: headers, page table, page objects
//! - [`channel`] - Calibrated channel views and the [`Sm4`] facade
//!
//! ## Example
//!
//! ```ignore
//! use sm4::Sm4;
//!
//! let file = Sm4::open("scan.SM4")?;
//! println!("{} channels", file.len());
//!
//! for ch in file.current_channels() {
//!     println!("{} V, {} A, {}x{}", ch.bias, ch.current, ch.xres, ch.yres);
//! }
//! ```

pub mod util;
pub mod sm4;
pub mod channel;

// Re-export commonly used types
pub use util::{Error, Result};
pub use channel::{Channel, Sm4};
pub use sm4::{Container, OpenOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Context, Error, Result};
    pub use crate::channel::{parse_sm4_datetime, Channel, Sm4};
    pub use crate::sm4::{
        Container, ImageType, LineType, ObjectType, OpenOptions, Page, PageDataType, PageHeader,
        PageObject, PageType, PrmPayload, ScanType,
    };
}
