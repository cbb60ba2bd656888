//! Whole-file decoding.

use std::path::Path;

use chrono::NaiveDateTime;

use super::cursor::Cursor;
use super::header::{ContainerHeader, ContainerPrm, PageIndexHeader};
use super::page::{Page, PageRecord};
use super::reader::{OpenOptions, Source};
use crate::util::Result;

/// A decoded SM4 file.
///
/// Built in a single pass and immutable afterwards. The file itself is not
/// kept open: everything needed is copied out during decoding.
#[derive(Debug, Clone)]
pub struct Container {
    header: ContainerHeader,
    page_index: PageIndexHeader,
    prm: Option<ContainerPrm>,
    pages: Vec<Page>,
    source_created: Option<NaiveDateTime>,
}

impl Container {
    /// Open and decode an SM4 file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Open and decode an SM4 file with explicit options.
    pub fn open_with(path: impl AsRef<Path>, opts: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let source = Source::open(path, opts)?;
        let container = Self::decode(source.bytes(), source.created());
        if let Err(e) = &container {
            tracing::debug!(path = %path.display(), offset = ?e.offset(), error = %e, "SM4 decode failed");
        }
        container
    }

    /// Decode an SM4 image held in memory.
    ///
    /// There is no file to fall back on, so channels without a string
    /// bundle timestamp have none.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::decode(data, None)
    }

    fn decode(data: &[u8], source_created: Option<NaiveDateTime>) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let header = ContainerHeader::read(&mut cursor)?;
        let page_index = PageIndexHeader::read(&mut cursor, &header.objects)?;
        let table_offset = page_index.page_array_offset()?;

        if page_index.page_count != header.page_count {
            tracing::warn!(
                header = header.page_count,
                index = page_index.page_count,
                "page counts disagree, using the page index"
            );
        }

        let records = PageRecord::read_table(&mut cursor, table_offset, page_index.page_count)?;

        let mut pages = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            pages.push(Page::decode(&mut cursor, record, index)?);
        }

        let prm = ContainerPrm::read(&mut cursor, &header.objects)?;

        tracing::debug!(
            pages = pages.len(),
            prm = prm.is_some(),
            signature = %header.signature_text(),
            "decoded SM4 container"
        );

        Ok(Self { header, page_index, prm, pages, source_created })
    }

    #[inline]
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    #[inline]
    pub fn page_index(&self) -> &PageIndexHeader {
        &self.page_index
    }

    /// Container-level parameter block, if the file has one.
    #[inline]
    pub fn prm(&self) -> Option<&ContainerPrm> {
        self.prm.as_ref()
    }

    /// Pages in page-table order.
    #[inline]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[inline]
    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// Creation time of the file this container was read from.
    #[inline]
    pub fn source_created(&self) -> Option<NaiveDateTime> {
        self.source_created
    }
}
