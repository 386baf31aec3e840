//! PAK container format implementation
//!
//! All integers are little-endian.
//!
//! ```text
//! 0x00  u32  unused
//! 0x04  u32  entry table offset
//! ...        payloads
//! table u32  entry count
//!       per entry:
//!         [u8; 8]   id, NUL padded
//!         [u8; 12]  unused
//!         u32       payload offset
//!         u32       directive length
//!         u32       chunk count (n)
//!         u32       declared compressed size
//!         u32       declared uncompressed size
//!         u32 × n   compressed chunk sizes
//!         u32 × n   uncompressed chunk sizes
//! ```
//!
//! At the payload offset the directive text comes first, immediately
//! followed by the chunk bytes. There is no checksum; corruption shows up as
//! out-of-range offsets or a failed inflate.

mod builder;
mod chunk;
mod error;
mod header;
mod reader;

pub use builder::{BuilderChunk, PakBuilder, compress_zlib};
pub use chunk::{
    ChunkSizes, DecodeExhausted, DecodedPayload, MAX_INFLATE_SIZE, SelectionPolicy, decode_chunks,
    inflate_streams,
};
pub use error::{ChunkError, PakError, PakResult};
pub use header::{EntryPrefix, PakEntry, PakHeader};
pub use reader::{DecodedEntry, Entries, PakReader};
