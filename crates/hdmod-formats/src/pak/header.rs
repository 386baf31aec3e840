//! PAK header and entry table records

use binrw::{BinRead, BinWrite};

use super::chunk::ChunkSizes;
use crate::CanonicalName;

/// Archive preamble (8 bytes, little-endian)
///
/// The first word carries no meaning for extraction; the second is the
/// absolute offset of the entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PakHeader {
    /// Unused leading word
    pub reserved: u32,
    /// Absolute offset of the entry table
    pub info_table_offset: u32,
}

impl PakHeader {
    /// Encoded size in bytes
    pub const SIZE: u64 = 8;
}

/// Fixed-size prefix of one entry table record (40 bytes, little-endian)
///
/// The prefix is followed by `chunk_count` compressed sizes and then
/// `chunk_count` uncompressed sizes, each a `u32`.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct EntryPrefix {
    /// ASCII id, NUL padded
    pub id: [u8; 8],
    /// Unused
    pub reserved: [u8; 12],
    /// Absolute offset of the directive text
    pub payload_offset: u32,
    /// Length of the directive text preceding the image bytes
    pub directive_len: u32,
    /// Number of chunk size pairs
    pub chunk_count: u32,
    /// Declared total compressed size
    pub compressed_size: u32,
    /// Declared total uncompressed size
    pub uncompressed_size: u32,
}

impl EntryPrefix {
    /// Encoded size in bytes
    pub const SIZE: u64 = 40;

    /// Id up to the first NUL
    pub fn id_string(&self) -> String {
        let end = self.id.iter().position(|&b| b == 0).unwrap_or(self.id.len());
        String::from_utf8_lossy(&self.id[..end]).into_owned()
    }

    /// Size of the chunk lists that follow the prefix
    pub fn chunk_table_size(&self) -> u64 {
        u64::from(self.chunk_count) * 8
    }
}

/// One archive entry with its chunk layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Id as stored (at most 8 characters)
    pub id: String,
    /// Absolute offset of the directive text
    pub payload_offset: u32,
    /// Directive text length
    pub directive_len: u32,
    /// Declared total compressed size
    pub compressed_size: u32,
    /// Declared total uncompressed size
    pub uncompressed_size: u32,
    /// Chunk size pairs in payload order
    pub chunks: Vec<ChunkSizes>,
}

impl PakEntry {
    /// Assemble an entry from its prefix and the two size lists
    pub(crate) fn from_parts(prefix: &EntryPrefix, compressed: &[u32], uncompressed: &[u32]) -> Self {
        let chunks = compressed
            .iter()
            .zip(uncompressed)
            .map(|(&c, &u)| ChunkSizes::new(c, u))
            .collect();
        Self {
            id: prefix.id_string(),
            payload_offset: prefix.payload_offset,
            directive_len: prefix.directive_len,
            compressed_size: prefix.compressed_size,
            uncompressed_size: prefix.uncompressed_size,
            chunks,
        }
    }

    /// Group name derived from the id
    pub fn name(&self) -> CanonicalName {
        CanonicalName::new(&self.id)
    }

    /// Number of chunks
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Sum of compressed chunk sizes (bytes occupied after the directive)
    pub fn chunk_compressed_total(&self) -> u64 {
        self.chunks.iter().map(|c| u64::from(c.compressed)).sum()
    }

    /// Sum of uncompressed chunk sizes
    pub fn chunk_uncompressed_total(&self) -> u64 {
        self.chunks.iter().map(|c| u64::from(c.uncompressed)).sum()
    }

    /// Absolute offset of the first image byte
    pub fn image_data_offset(&self) -> u64 {
        u64::from(self.payload_offset) + u64::from(self.directive_len)
    }
}
