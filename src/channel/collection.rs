//! The `Sm4` file facade.

use std::io::Write;
use std::ops::Index;
use std::path::Path;

use super::Channel;
use crate::sm4::{Container, OpenOptions, PageType, PrmPayload};
use crate::util::{Error, Result};

/// A decoded SM4 file and its channels.
///
/// Channels appear in page-table order, one per imaging or spectroscopy page
/// that carries sample data.
#[derive(Debug, Clone)]
pub struct Sm4 {
    container: Container,
    channels: Vec<Channel>,
}

impl Sm4 {
    /// Open and decode a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_container(Container::open(path)?))
    }

    /// Open and decode a file with explicit options.
    pub fn open_with(path: impl AsRef<Path>, opts: OpenOptions) -> Result<Self> {
        Ok(Self::from_container(Container::open_with(path, opts)?))
    }

    /// Decode an in-memory SM4 image.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::from_container(Container::from_bytes(data)?))
    }

    /// Project the channels of an already decoded container.
    pub fn from_container(container: Container) -> Self {
        let fallback = container.source_created();
        let channels = container
            .pages()
            .iter()
            .filter_map(|page| Channel::from_page(page, fallback))
            .collect();
        Self { container, channels }
    }

    /// The underlying container.
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[inline]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Like [`get`](Self::get), but with an error for out-of-range indices.
    pub fn channel(&self, index: usize) -> Result<&Channel> {
        self.channels.get(index).ok_or(Error::ChannelOutOfBounds {
            index,
            count: self.channels.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    /// Channels with the given page type.
    pub fn channels_of(&self, page_type: PageType) -> Vec<&Channel> {
        self.channels.iter().filter(|ch| ch.page_type == page_type).collect()
    }

    pub fn topography_channels(&self) -> Vec<&Channel> {
        self.channels_of(PageType::Topographic)
    }

    pub fn current_channels(&self) -> Vec<&Channel> {
        self.channels_of(PageType::Current)
    }

    /// Container-level parameter text, when present and uncompressed.
    pub fn prm_text(&self) -> Option<String> {
        self.container.prm().and_then(|prm| prm.text())
    }

    /// Write the raw container-level parameter bytes.
    ///
    /// Writes nothing when the file has no parameter block or it is compressed.
    /// Returns the number of bytes written.
    pub fn write_prm<W: Write>(&self, mut out: W) -> Result<usize> {
        match self.container.prm().map(|prm| &prm.payload) {
            Some(PrmPayload::Plain(bytes)) => {
                out.write_all(bytes)?;
                out.flush()?;
                Ok(bytes.len())
            }
            Some(PrmPayload::Compressed { compressed_size }) => {
                tracing::warn!(compressed_size, "PRM block is compressed, nothing written");
                Ok(0)
            }
            None => Ok(0),
        }
    }
}

impl Index<usize> for Sm4 {
    type Output = Channel;

    fn index(&self, index: usize) -> &Channel {
        &self.channels[index]
    }
}

impl<'a> IntoIterator for &'a Sm4 {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}
