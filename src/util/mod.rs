//! Utility types shared across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Context`] - Page/object location attached to decode errors

mod error;

pub use error::*;
