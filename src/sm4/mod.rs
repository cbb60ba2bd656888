//! Low-level SM4 binary format decoding.
//!
//! SM4 is the container format written by RHK Technology's scanning
//! microscopy (SPM) software. All integers are little-endian.
//!
//! ## File Structure
//!
//! ```text
//! +----------------------+
//! | Container header     |  size, signature, counts
//! |   object index       |  12-byte (tag, offset, size) records
//! +----------------------+
//! | Page index header    |  found via PAGE_INDEX_HEADER
//! |   object index       |  -> PAGE_INDEX_ARRAY
//! +----------------------+
//! | Page table           |  page records, each followed by its object index
//! +----------------------+
//! | Page headers         |  Default or Sequential layout
//! | Page objects         |  samples, drift, strings, settings, ...
//! +----------------------+
//! ```
//!
//! Every position is reached by seeking to an offset taken from an object
//! record; nothing is read sequentially across object boundaries.

mod format;
mod reader;
mod cursor;
mod object;
mod header;
mod page_header;
mod payload;
mod page;
mod container;

pub use format::*;
pub use reader::OpenOptions;
pub use cursor::*;
pub use object::*;
pub use header::*;
pub use page_header::*;
pub use payload::*;
pub use page::*;
pub use container::*;
