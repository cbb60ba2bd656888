//! Error types for the SM4 reader.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::sm4::ObjectType;

/// Where in the container a decode error happened.
///
/// `page` is the zero-based index into the page table, `object` the tag of the
/// object being decoded. Both are absent while reading the container header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub page: Option<usize>,
    pub object: Option<ObjectType>,
}

impl Context {
    /// Context for the container header and page index.
    pub const fn container() -> Self {
        Self { page: None, object: None }
    }

    /// Context for a page, before any of its objects is entered.
    pub const fn page(index: usize) -> Self {
        Self { page: Some(index), object: None }
    }

    /// Narrow this context to one object.
    pub const fn with_object(self, object: ObjectType) -> Self {
        Self { page: self.page, object: Some(object) }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.page, self.object) {
            (None, None) => write!(f, "container"),
            (None, Some(obj)) => write!(f, "container object {}", obj),
            (Some(page), None) => write!(f, "page {}", page),
            (Some(page), Some(obj)) => write!(f, "page {} object {}", page, obj),
        }
    }
}

/// Main error type for SM4 operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A required tagged object is absent from an object index
    #[error("Missing required object {object} ({context}, index at offset {offset:#x})")]
    MissingRequiredObject {
        object: ObjectType,
        offset: u64,
        context: Context,
    },

    /// Read requested past the end of the source
    #[error("Truncated input: needed {wanted} bytes at offset {offset:#x} ({context})")]
    TruncatedInput {
        offset: u64,
        wanted: usize,
        context: Context,
    },

    /// Enumeration value outside the known set for a tag that drives decoding
    #[error("Unrecognized {kind} tag {value} at offset {offset:#x} ({context})")]
    UnrecognizedTag {
        kind: &'static str,
        value: u32,
        offset: u64,
        context: Context,
    },

    /// Recognized content this reader cannot decode
    #[error("Unsupported payload at offset {offset:#x} ({context}): {reason}")]
    UnsupportedPayload {
        reason: String,
        offset: u64,
        context: Context,
    },

    /// An object needs a value that no earlier object supplied
    #[error("Object at offset {offset:#x} ({context}) needs {missing}, which no preceding object supplied")]
    CrossObjectDependencyMissing {
        missing: &'static str,
        offset: u64,
        context: Context,
    },

    /// Channel index out of bounds
    #[error("Channel index {index} out of bounds (count: {count})")]
    ChannelOutOfBounds { index: usize, count: usize },

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors that only invalidate the object being decoded.
    ///
    /// The page walker records these as object outcomes and carries on with
    /// the sibling objects; every other error aborts the whole decode.
    pub fn is_object_local(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedPayload { .. } | Error::CrossObjectDependencyMissing { .. }
        )
    }

    /// Byte offset the error refers to, if it is a decode error.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::MissingRequiredObject { offset, .. }
            | Error::TruncatedInput { offset, .. }
            | Error::UnrecognizedTag { offset, .. }
            | Error::UnsupportedPayload { offset, .. }
            | Error::CrossObjectDependencyMissing { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Decode context of the error, if it is a decode error.
    pub fn context(&self) -> Option<Context> {
        match self {
            Error::MissingRequiredObject { context, .. }
            | Error::TruncatedInput { context, .. }
            | Error::UnrecognizedTag { context, .. }
            | Error::UnsupportedPayload { context, .. }
            | Error::CrossObjectDependencyMissing { context, .. } => Some(*context),
            _ => None,
        }
    }
}

/// Result type alias for SM4 operations.
pub type Result<T> = std::result::Result<T, Error>;
