//! PAK archive builder
//!
//! Produces archives in the same layout the reader expects: preamble,
//! payload blocks, then the entry table at the end of the file.

use std::io::{Cursor, Read};

use binrw::BinWrite;
use flate2::Compression;
use flate2::read::ZlibEncoder;

use super::error::{PakError, PakResult};
use super::header::{EntryPrefix, PakHeader};

/// One chunk of an entry under construction
#[derive(Debug, Clone)]
pub enum BuilderChunk {
    /// Bytes copied verbatim; compressed size == uncompressed size
    Stored(Vec<u8>),
    /// Bytes compressed as their own zlib stream
    Zlib(Vec<u8>),
    /// Already-encoded bytes with an explicit declared uncompressed size
    Raw {
        /// Bytes written to the archive
        data: Vec<u8>,
        /// Declared uncompressed size
        uncompressed: u32,
    },
}

#[derive(Debug, Clone)]
struct PendingEntry {
    id: [u8; 8],
    directive: Vec<u8>,
    chunks: Vec<(Vec<u8>, u32)>,
}

/// Builder for creating PAK archives
#[derive(Debug, Clone, Default)]
pub struct PakBuilder {
    entries: Vec<PendingEntry>,
}

/// Compress `data` as a single zlib stream
pub fn compress_zlib(data: &[u8]) -> PakResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(data, Compression::default());
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed)?;
    Ok(compressed)
}

fn to_u32(value: usize, what: &str) -> PakResult<u32> {
    u32::try_from(value).map_err(|_| PakError::malformed(format!("{what} does not fit in 32 bits")))
}

impl PakBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry with its directive text and chunks
    ///
    /// Ids longer than 8 bytes are rejected.
    pub fn add_entry(
        mut self,
        id: &str,
        directive: &str,
        chunks: Vec<BuilderChunk>,
    ) -> PakResult<Self> {
        let bytes = id.as_bytes();
        if bytes.len() > 8 {
            return Err(PakError::malformed(format!("entry id '{id}' exceeds 8 bytes")));
        }
        let mut padded = [0u8; 8];
        padded[..bytes.len()].copy_from_slice(bytes);

        let mut encoded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let pair = match chunk {
                BuilderChunk::Stored(data) => {
                    let size = to_u32(data.len(), "stored chunk")?;
                    (data, size)
                }
                BuilderChunk::Zlib(data) => {
                    let size = to_u32(data.len(), "zlib chunk")?;
                    (compress_zlib(&data)?, size)
                }
                BuilderChunk::Raw { data, uncompressed } => (data, uncompressed),
            };
            encoded.push(pair);
        }

        self.entries.push(PendingEntry {
            id: padded,
            directive: directive.as_bytes().to_vec(),
            chunks: encoded,
        });
        Ok(self)
    }

    /// Serialize the archive
    pub fn build(&self) -> PakResult<Vec<u8>> {
        let mut payloads = Vec::new();
        let mut prefixes = Vec::with_capacity(self.entries.len());
        let mut offset = PakHeader::SIZE as usize;

        for entry in &self.entries {
            let compressed_total: usize = entry.chunks.iter().map(|(data, _)| data.len()).sum();
            let uncompressed_total: u64 = entry.chunks.iter().map(|(_, size)| u64::from(*size)).sum();

            prefixes.push(EntryPrefix {
                id: entry.id,
                reserved: [0; 12],
                payload_offset: to_u32(offset, "payload offset")?,
                directive_len: to_u32(entry.directive.len(), "directive length")?,
                chunk_count: to_u32(entry.chunks.len(), "chunk count")?,
                compressed_size: to_u32(compressed_total, "compressed size")?,
                uncompressed_size: u32::try_from(uncompressed_total)
                    .map_err(|_| PakError::malformed("uncompressed size does not fit in 32 bits"))?,
            });

            payloads.extend_from_slice(&entry.directive);
            for (data, _) in &entry.chunks {
                payloads.extend_from_slice(data);
            }
            offset += entry.directive.len() + compressed_total;
        }

        let mut writer = Cursor::new(Vec::with_capacity(offset + self.entries.len() * 64));
        PakHeader {
            reserved: 0,
            info_table_offset: to_u32(offset, "entry table offset")?,
        }
        .write(&mut writer)?;
        std::io::Write::write_all(&mut writer, &payloads)?;

        to_u32(self.entries.len(), "entry count")?.write_le(&mut writer)?;
        for (prefix, entry) in prefixes.iter().zip(&self.entries) {
            prefix.write(&mut writer)?;
            for (data, _) in &entry.chunks {
                to_u32(data.len(), "chunk size")?.write_le(&mut writer)?;
            }
            for (_, size) in &entry.chunks {
                size.write_le(&mut writer)?;
            }
        }

        Ok(writer.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::BinRead;

    #[test]
    fn test_build_layout() {
        let data = PakBuilder::new()
            .add_entry("ABC", "dir", vec![BuilderChunk::Stored(vec![1, 2, 3])])
            .unwrap()
            .build()
            .unwrap();

        let mut cursor = Cursor::new(&data);
        let header = PakHeader::read(&mut cursor).unwrap();
        // preamble + "dir" + 3 stored bytes
        assert_eq!(header.info_table_offset, 14);

        cursor.set_position(u64::from(header.info_table_offset));
        assert_eq!(u32::read_le(&mut cursor).unwrap(), 1);
        let prefix = EntryPrefix::read(&mut cursor).unwrap();
        assert_eq!(prefix.id_string(), "ABC");
        assert_eq!(prefix.payload_offset, 8);
        assert_eq!(prefix.directive_len, 3);
        assert_eq!(prefix.chunk_count, 1);
        assert_eq!(u32::read_le(&mut cursor).unwrap(), 3);
        assert_eq!(u32::read_le(&mut cursor).unwrap(), 3);
    }

    #[test]
    fn test_rejects_long_id() {
        let err = PakBuilder::new()
            .add_entry("TOOLONGID", "", Vec::new())
            .unwrap_err();
        assert!(matches!(err, PakError::MalformedArchive { .. }));
    }
}
