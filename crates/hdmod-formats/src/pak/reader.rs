//! Lazy archive reader

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use binrw::BinRead;
use tracing::{debug, warn};

use super::chunk::{DecodeExhausted, SelectionPolicy, decode_chunks};
use super::error::{PakError, PakResult};
use super::header::{EntryPrefix, PakEntry, PakHeader};

/// One fully decoded entry
#[derive(Debug, Clone)]
pub struct DecodedEntry {
    /// Table record
    pub entry: PakEntry,
    /// Directive text preceding the image bytes
    pub directive: String,
    /// Raw image buffers (DDS or PNG) in payload order
    pub images: Vec<Vec<u8>>,
    /// Partial inflate report, if any
    pub exhausted: Option<DecodeExhausted>,
}

/// Reader over a PAK archive
///
/// Only the preamble and the entry count are read up front; records and
/// payloads are read entry by entry through [`PakReader::entries`].
pub struct PakReader<R: Read + Seek> {
    reader: R,
    file_len: u64,
    header: PakHeader,
    entry_count: u32,
    policy: SelectionPolicy,
}

impl PakReader<BufReader<File>> {
    /// Open an archive from a path
    pub fn open<P: AsRef<Path>>(path: P) -> PakResult<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Opened archive {}", path.as_ref().display());
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> PakReader<R> {
    /// Validate the preamble and entry count of `reader`
    pub fn new(mut reader: R) -> PakResult<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_len < PakHeader::SIZE {
            return Err(PakError::malformed(format!(
                "file is {file_len} bytes, shorter than the {}-byte preamble",
                PakHeader::SIZE
            )));
        }

        let header = PakHeader::read(&mut reader)?;
        let table_offset = u64::from(header.info_table_offset);
        if table_offset + 4 > file_len {
            return Err(PakError::malformed(format!(
                "entry table offset {table_offset} past end of file ({file_len} bytes)"
            )));
        }

        reader.seek(SeekFrom::Start(table_offset))?;
        let entry_count = u32::read_le(&mut reader)?;

        let minimum_table = u64::from(entry_count) * EntryPrefix::SIZE;
        if table_offset + 4 + minimum_table > file_len {
            return Err(PakError::malformed(format!(
                "{entry_count} entries need at least {minimum_table} table bytes at offset {}, file is {file_len} bytes",
                table_offset + 4
            )));
        }

        debug!(
            "Archive table at offset {} holds {} entries",
            table_offset, entry_count
        );

        Ok(Self {
            reader,
            file_len,
            header,
            entry_count,
            policy: SelectionPolicy::default(),
        })
    }

    /// Choose how stored and inflated candidates are selected
    #[must_use]
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Declared number of entries
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// Archive preamble
    pub fn header(&self) -> &PakHeader {
        &self.header
    }

    /// Iterate over decoded entries in table order
    pub fn entries(&mut self) -> Entries<'_, R> {
        let cursor = u64::from(self.header.info_table_offset) + 4;
        Entries {
            reader: self,
            cursor,
            index: 0,
            failed: false,
        }
    }

    /// Read every table record without touching payloads
    pub fn read_entry_table(&mut self) -> PakResult<Vec<PakEntry>> {
        let mut cursor = u64::from(self.header.info_table_offset) + 4;
        let mut entries = Vec::with_capacity(self.entry_count as usize);
        for _ in 0..self.entry_count {
            let (entry, next) = self.read_record(cursor)?;
            entries.push(entry);
            cursor = next;
        }
        Ok(entries)
    }

    fn read_record(&mut self, cursor: u64) -> PakResult<(PakEntry, u64)> {
        if cursor + EntryPrefix::SIZE > self.file_len {
            return Err(PakError::malformed(format!(
                "entry record at offset {cursor} past end of file"
            )));
        }
        self.reader.seek(SeekFrom::Start(cursor))?;
        let prefix = EntryPrefix::read(&mut self.reader)?;

        let sizes_end = cursor + EntryPrefix::SIZE + prefix.chunk_table_size();
        if sizes_end > self.file_len {
            return Err(PakError::malformed(format!(
                "entry '{}' declares {} chunks, size lists run past end of file",
                prefix.id_string(),
                prefix.chunk_count
            )));
        }

        let count = prefix.chunk_count as usize;
        let mut compressed = Vec::with_capacity(count);
        for _ in 0..count {
            compressed.push(u32::read_le(&mut self.reader)?);
        }
        let mut uncompressed = Vec::with_capacity(count);
        for _ in 0..count {
            uncompressed.push(u32::read_le(&mut self.reader)?);
        }

        let entry = PakEntry::from_parts(&prefix, &compressed, &uncompressed);

        let payload_end = entry.image_data_offset() + entry.chunk_compressed_total();
        if payload_end > self.file_len {
            return Err(PakError::malformed(format!(
                "entry '{}' payload ends at {payload_end}, past end of file ({} bytes)",
                entry.id, self.file_len
            )));
        }

        if entry.chunk_uncompressed_total() != u64::from(entry.uncompressed_size) {
            warn!(
                "Entry '{}' chunk sizes sum to {} bytes, header declares {}",
                entry.id,
                entry.chunk_uncompressed_total(),
                entry.uncompressed_size
            );
        }

        Ok((entry, sizes_end))
    }

    fn read_payload(&mut self, entry: PakEntry) -> PakResult<DecodedEntry> {
        self.reader
            .seek(SeekFrom::Start(u64::from(entry.payload_offset)))?;

        let mut directive_bytes = vec![0u8; entry.directive_len as usize];
        self.reader.read_exact(&mut directive_bytes)?;
        let directive = match String::from_utf8(directive_bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("Entry '{}' directive is not valid UTF-8, decoding lossily", entry.id);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let payload_len = usize::try_from(entry.chunk_compressed_total())
            .map_err(|_| PakError::malformed("payload too large for platform"))?;
        let mut payload = vec![0u8; payload_len];
        self.reader.read_exact(&mut payload)?;

        let decoded = decode_chunks(&payload, &entry.chunks, self.policy).map_err(|source| {
            PakError::Entry {
                id: entry.id.clone(),
                source,
            }
        })?;

        Ok(DecodedEntry {
            entry,
            directive,
            images: decoded.images,
            exhausted: decoded.exhausted,
        })
    }
}

/// Iterator over the entries of a [`PakReader`]
///
/// A fatal error is yielded once and ends the iteration; an entry-level
/// error ([`PakError::Entry`]) is yielded and iteration continues.
pub struct Entries<'a, R: Read + Seek> {
    reader: &'a mut PakReader<R>,
    cursor: u64,
    index: u32,
    failed: bool,
}

impl<R: Read + Seek> Iterator for Entries<'_, R> {
    type Item = PakResult<DecodedEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.reader.entry_count {
            return None;
        }

        let (entry, next) = match self.reader.read_record(self.cursor) {
            Ok(record) => record,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        self.cursor = next;
        self.index += 1;

        let result = self.reader.read_payload(entry);
        if let Err(ref e) = result {
            if e.is_fatal() {
                self.failed = true;
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.failed {
            0
        } else {
            (self.reader.entry_count - self.index) as usize
        };
        (0, Some(remaining))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pak::BuilderChunk;
    use crate::test_utils::build_archive;
    use std::io::Cursor;

    #[test]
    fn test_reads_entries_in_order() {
        let data = build_archive(vec![
            ("FIRST", "a\r\n".to_string(), vec![BuilderChunk::Stored(vec![1; 16])]),
            ("SECOND", "b\r\n".to_string(), vec![BuilderChunk::Zlib(vec![2; 64])]),
        ]);

        let mut reader = PakReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.entry_count(), 2);

        let entries: Vec<_> = reader.entries().collect::<PakResult<_>>().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry.id, "FIRST");
        assert_eq!(entries[0].directive, "a\r\n");
        assert_eq!(entries[0].images, vec![vec![1; 16]]);
        assert_eq!(entries[1].entry.id, "SECOND");
        assert_eq!(entries[1].images, vec![vec![2; 64]]);
    }

    #[test]
    fn test_rejects_short_file() {
        let err = PakReader::new(Cursor::new(vec![0u8; 4])).err().unwrap();
        assert!(matches!(err, PakError::MalformedArchive { .. }));
    }

    #[test]
    fn test_rejects_table_offset_past_eof() {
        let mut data = vec![0u8; 8];
        data[4..8].copy_from_slice(&100u32.to_le_bytes());
        let err = PakReader::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, PakError::MalformedArchive { .. }));
    }

    #[test]
    fn test_rejects_entry_count_past_eof() {
        let mut data = build_archive(vec![(
            "ONLY",
            String::new(),
            vec![BuilderChunk::Stored(vec![0; 4])],
        )]);
        let table = u32::from_le_bytes(data[4..8].try_into().unwrap()) as usize;
        data[table..table + 4].copy_from_slice(&1000u32.to_le_bytes());

        let err = PakReader::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, PakError::MalformedArchive { .. }));
    }

    #[test]
    fn test_payload_offset_past_eof_ends_iteration() {
        let mut data = build_archive(vec![(
            "ONLY",
            String::new(),
            vec![BuilderChunk::Stored(vec![0; 4])],
        )]);
        let table = u32::from_le_bytes(data[4..8].try_into().unwrap()) as usize;
        // payload_offset sits after count (4), id (8) and reserved (12)
        let field = table + 4 + 20;
        data[field..field + 4].copy_from_slice(&10_000u32.to_le_bytes());

        let mut reader = PakReader::new(Cursor::new(data)).unwrap();
        let mut entries = reader.entries();
        let first = entries.next().unwrap();
        assert!(matches!(first, Err(PakError::MalformedArchive { .. })));
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_entry_table_only() {
        let data = build_archive(vec![
            ("A", String::new(), vec![BuilderChunk::Stored(vec![0; 3])]),
            (
                "B",
                String::new(),
                vec![BuilderChunk::Stored(vec![0; 2]), BuilderChunk::Zlib(vec![5; 9])],
            ),
        ]);
        let mut reader = PakReader::new(Cursor::new(data)).unwrap();
        let table = reader.read_entry_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].chunk_count(), 2);
        assert_eq!(table[1].uncompressed_size, 11);
        assert_eq!(table[1].chunk_uncompressed_total(), 11);
    }
}
