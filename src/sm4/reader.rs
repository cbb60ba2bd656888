//! Byte sources for SM4 decoding.
//!
//! A source owns the whole file contents for the duration of one decode,
//! either memory-mapped or read into a buffer. It is dropped as soon as the
//! container has been built, on success and on error alike.

use std::fs::{File, Metadata};
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use memmap2::Mmap;

use crate::util::{Error, Result};

/// Options for opening an SM4 file.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Memory-map the file instead of reading it into a buffer.
    pub use_mmap: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { use_mmap: cfg!(feature = "mmap") }
    }
}

impl OpenOptions {
    /// Default options (memory mapping when the `mmap` feature is on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable memory mapping.
    pub fn mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }
}

/// Random-access bytes of an opened file.
pub(crate) struct Source {
    inner: SourceInner,
    created: Option<NaiveDateTime>,
}

enum SourceInner {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Whole file read into memory (fallback, and for empty files)
    Buffer(Vec<u8>),
}

impl Source {
    /// Open a file with the given options.
    pub(crate) fn open(path: &Path, opts: OpenOptions) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let metadata = file.metadata()?;
        let size = metadata.len();
        let created = creation_time(&metadata);

        let inner = if opts.use_mmap && size > 0 {
            // Safety: the file is opened read-only and the map does not
            // outlive this decode.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            SourceInner::Mmap(mmap)
        } else {
            let mut buf = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buf)?;
            SourceInner::Buffer(buf)
        };

        tracing::debug!(path = %path.display(), size, mmap = opts.use_mmap, "opened SM4 source");
        Ok(Self { inner, created })
    }

    /// All bytes of the source.
    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        match &self.inner {
            SourceInner::Mmap(mmap) => &mmap[..],
            SourceInner::Buffer(buf) => &buf[..],
        }
    }

    /// File creation time (modification time where creation is unavailable).
    #[inline]
    pub(crate) fn created(&self) -> Option<NaiveDateTime> {
        self.created
    }
}

/// Local creation time of a file, used as a fallback channel timestamp.
fn creation_time(metadata: &Metadata) -> Option<NaiveDateTime> {
    let time = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Local>::from(time).naive_local())
}
