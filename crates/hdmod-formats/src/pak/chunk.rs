//! Chunk walking and inflate passes
//!
//! An entry's image bytes are a sequence of chunks. A chunk whose compressed
//! size equals its uncompressed size is stored verbatim; every other chunk is
//! a slice of one combined compressed region. That region is a series of
//! back-to-back zlib streams and each stream inflates to one image.

use flate2::{Decompress, FlushDecompress, Status};
use tracing::{debug, warn};

use super::error::ChunkError;

/// Maximum output of a single inflate pass (256 MiB)
///
/// The largest texture atlases in the shipped archives are a few tens of
/// megabytes; anything beyond this is treated as a corrupt stream.
pub const MAX_INFLATE_SIZE: usize = 256 * 1024 * 1024;

/// Compressed and uncompressed size of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSizes {
    /// Bytes occupied in the archive
    pub compressed: u32,
    /// Bytes after decoding
    pub uncompressed: u32,
}

impl ChunkSizes {
    /// Create a size pair
    pub const fn new(compressed: u32, uncompressed: u32) -> Self {
        Self {
            compressed,
            uncompressed,
        }
    }

    /// Stored chunks have equal sizes and are copied verbatim
    pub const fn is_stored(&self) -> bool {
        self.compressed == self.uncompressed
    }
}

/// How to pick between stored bytes and inflated buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Stored bytes win when strictly longer than all inflated buffers together
    #[default]
    LongestWins,
    /// Inflated buffers win whenever the entry has a compressed chunk
    ChunkFlags,
}

/// The compressed region could not be fully consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeExhausted {
    /// Images that inflated completely before the stall
    pub recovered: usize,
    /// Compressed bytes left unconsumed
    pub remaining_bytes: usize,
    /// Why the pass stopped
    pub reason: String,
}

/// Images recovered from one entry
#[derive(Debug, Clone, Default)]
pub struct DecodedPayload {
    /// Raw image buffers in payload order
    pub images: Vec<Vec<u8>>,
    /// Set when inflate stopped before the compressed region was consumed
    pub exhausted: Option<DecodeExhausted>,
}

impl DecodedPayload {
    /// True when every compressed byte was accounted for
    pub fn is_complete(&self) -> bool {
        self.exhausted.is_none()
    }
}

/// Split the payload into stored and compressed accumulators
fn split_chunks(payload: &[u8], chunks: &[ChunkSizes]) -> Result<(Vec<u8>, Vec<u8>), ChunkError> {
    let mut stored = Vec::new();
    let mut compressed = Vec::new();
    let mut cursor = 0usize;

    for (index, chunk) in chunks.iter().enumerate() {
        let size = chunk.compressed as usize;
        let end = cursor
            .checked_add(size)
            .filter(|&end| end <= payload.len())
            .ok_or(ChunkError::Truncated {
                index,
                offset: cursor,
                needed: size,
                available: payload.len(),
            })?;

        if chunk.is_stored() {
            stored.extend_from_slice(&payload[cursor..end]);
        } else {
            compressed.extend_from_slice(&payload[cursor..end]);
        }
        cursor = end;
    }

    Ok((stored, compressed))
}

/// Run one inflate pass, returning the output and the input bytes consumed
fn inflate_pass(input: &[u8]) -> Result<(Vec<u8>, usize), String> {
    let mut inflater = Decompress::new(true);
    let mut output = Vec::with_capacity(input.len().saturating_mul(4).min(MAX_INFLATE_SIZE));

    loop {
        if output.len() == output.capacity() {
            output.reserve(output.capacity().max(64 * 1024));
        }

        let consumed_before = inflater.total_in() as usize;
        let produced_before = inflater.total_out();

        let status = inflater
            .decompress_vec(&input[consumed_before..], &mut output, FlushDecompress::None)
            .map_err(|e| format!("zlib stream error: {e}"))?;

        if output.len() > MAX_INFLATE_SIZE {
            return Err(format!(
                "inflated size exceeds limit of {} bytes",
                MAX_INFLATE_SIZE
            ));
        }

        match status {
            Status::StreamEnd => return Ok((output, inflater.total_in() as usize)),
            Status::Ok | Status::BufError => {
                let consumed = inflater.total_in() as usize;
                let stalled = consumed == consumed_before && inflater.total_out() == produced_before;
                if consumed >= input.len() && stalled {
                    return Err("stream truncated before its end marker".to_string());
                }
                if stalled && output.len() < output.capacity() {
                    return Err("inflate made no progress".to_string());
                }
            }
        }
    }
}

/// Inflate back-to-back zlib streams until the region is consumed or a pass fails
pub fn inflate_streams(compressed: &[u8]) -> (Vec<Vec<u8>>, Option<DecodeExhausted>) {
    let mut images = Vec::new();
    let mut position = 0usize;

    while position < compressed.len() {
        match inflate_pass(&compressed[position..]) {
            Ok((image, consumed)) if consumed > 0 => {
                debug!(
                    "Inflated stream {} at offset {}: {} -> {} bytes",
                    images.len(),
                    position,
                    consumed,
                    image.len()
                );
                images.push(image);
                position += consumed;
            }
            Ok(_) => {
                let exhausted = DecodeExhausted {
                    recovered: images.len(),
                    remaining_bytes: compressed.len() - position,
                    reason: "inflate consumed no input".to_string(),
                };
                return (images, Some(exhausted));
            }
            Err(reason) => {
                let exhausted = DecodeExhausted {
                    recovered: images.len(),
                    remaining_bytes: compressed.len() - position,
                    reason,
                };
                return (images, Some(exhausted));
            }
        }
    }

    (images, None)
}

/// Decode an entry's image bytes into one or more raw image buffers
///
/// `payload` is the region right after the directive text; `chunks` walks it
/// sequentially. A chunk list that points past the region is a hard failure,
/// a compressed region that cannot be fully inflated is reported through
/// [`DecodedPayload::exhausted`] alongside whatever did decode.
pub fn decode_chunks(
    payload: &[u8],
    chunks: &[ChunkSizes],
    policy: SelectionPolicy,
) -> Result<DecodedPayload, ChunkError> {
    let (stored, compressed) = split_chunks(payload, chunks)?;

    let (inflated, exhausted) = if compressed.is_empty() {
        (Vec::new(), None)
    } else {
        inflate_streams(&compressed)
    };

    if let Some(ref e) = exhausted {
        warn!(
            "Inflate stopped after {} image(s) with {} byte(s) left: {}",
            e.recovered, e.remaining_bytes, e.reason
        );
    }

    let use_stored = match policy {
        SelectionPolicy::LongestWins => {
            let inflated_total: usize = inflated.iter().map(Vec::len).sum();
            stored.len() > inflated_total
        }
        SelectionPolicy::ChunkFlags => compressed.is_empty(),
    };

    let images = if use_stored {
        if stored.is_empty() {
            Vec::new()
        } else {
            vec![stored]
        }
    } else {
        inflated
    };

    if images.is_empty() && exhausted.is_none() && !chunks.is_empty() {
        return Err(ChunkError::Empty);
    }

    Ok(DecodedPayload { images, exhausted })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::zlib;

    #[test]
    fn test_single_stored_chunk_is_one_image() {
        let payload: Vec<u8> = (0..100u8).collect();
        let decoded =
            decode_chunks(&payload, &[ChunkSizes::new(100, 100)], SelectionPolicy::default())
                .unwrap();

        assert_eq!(decoded.images.len(), 1);
        assert_eq!(decoded.images[0], payload);
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_stored_chunks_are_concatenated() {
        let payload = b"aaaabbbbbb".to_vec();
        let chunks = [ChunkSizes::new(4, 4), ChunkSizes::new(6, 6)];
        let decoded = decode_chunks(&payload, &chunks, SelectionPolicy::default()).unwrap();
        assert_eq!(decoded.images, vec![payload]);
    }

    #[test]
    fn test_back_to_back_streams_yield_separate_images() {
        let first = vec![1u8; 500];
        let second = vec![2u8; 700];
        let mut payload = zlib(&first);
        let split = payload.len();
        payload.extend(zlib(&second));

        let chunks = [
            ChunkSizes::new(split as u32, first.len() as u32),
            ChunkSizes::new((payload.len() - split) as u32, second.len() as u32),
        ];
        let decoded = decode_chunks(&payload, &chunks, SelectionPolicy::default()).unwrap();

        assert_eq!(decoded.images, vec![first, second]);
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_trailing_garbage_reports_partial() {
        let image = vec![7u8; 300];
        let mut payload = zlib(&image);
        payload.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);

        let chunks = [ChunkSizes::new(payload.len() as u32, 300)];
        let decoded = decode_chunks(&payload, &chunks, SelectionPolicy::default()).unwrap();

        assert_eq!(decoded.images, vec![image]);
        let exhausted = decoded.exhausted.expect("partial decode");
        assert_eq!(exhausted.recovered, 1);
        assert_eq!(exhausted.remaining_bytes, 4);
    }

    #[test]
    fn test_truncated_stream_is_not_an_image() {
        let image: Vec<u8> = (0..4000u32).map(|i| (i * 31 % 251) as u8).collect();
        let compressed = zlib(&image);
        let payload = compressed[..compressed.len() / 2].to_vec();

        let chunks = [ChunkSizes::new(payload.len() as u32, 4000)];
        let decoded = decode_chunks(&payload, &chunks, SelectionPolicy::default()).unwrap();

        assert!(decoded.images.is_empty());
        let exhausted = decoded.exhausted.expect("truncated stream");
        assert_eq!(exhausted.recovered, 0);
        assert_eq!(exhausted.remaining_bytes, payload.len());
    }

    #[test]
    fn test_chunk_walk_past_payload_is_fatal() {
        let payload = vec![0u8; 10];
        let err = decode_chunks(&payload, &[ChunkSizes::new(11, 11)], SelectionPolicy::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ChunkError::Truncated {
                index: 0,
                needed: 11,
                available: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_longest_wins_prefers_longer_stored_bytes() {
        let small = vec![3u8; 40];
        let mut payload = vec![9u8; 64];
        let compressed = zlib(&small);
        payload.extend_from_slice(&compressed);

        let chunks = [
            ChunkSizes::new(64, 64),
            ChunkSizes::new(compressed.len() as u32, 40),
        ];

        let legacy = decode_chunks(&payload, &chunks, SelectionPolicy::LongestWins).unwrap();
        assert_eq!(legacy.images, vec![vec![9u8; 64]]);

        let flagged = decode_chunks(&payload, &chunks, SelectionPolicy::ChunkFlags).unwrap();
        assert_eq!(flagged.images, vec![small]);
    }

    #[test]
    fn test_no_chunks_decodes_to_nothing() {
        let decoded = decode_chunks(&[], &[], SelectionPolicy::default()).unwrap();
        assert!(decoded.images.is_empty());
        assert!(decoded.is_complete());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        proptest! {
            /// Stored chunks always reproduce the payload they cover
            #[test]
            fn stored_chunks_reproduce_payload(sizes in prop::collection::vec(1u32..64, 1..8)) {
                let total: u32 = sizes.iter().sum();
                let payload: Vec<u8> = (0..total).map(|i| (i % 256) as u8).collect();
                let chunks: Vec<_> = sizes.iter().map(|&s| ChunkSizes::new(s, s)).collect();

                let decoded = decode_chunks(&payload, &chunks, SelectionPolicy::ChunkFlags)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(decoded.images, vec![payload]);
            }
        }

        proptest! {
            /// Every complete stream becomes exactly one image
            #[test]
            fn stream_count_matches_image_count(lengths in prop::collection::vec(1usize..2048, 1..5)) {
                let mut payload = Vec::new();
                let mut chunks = Vec::new();
                let mut originals = Vec::new();
                for (i, len) in lengths.iter().enumerate() {
                    let data: Vec<u8> = (0..*len).map(|j| ((i * 7 + j) % 256) as u8).collect();
                    let compressed = zlib(&data);
                    // Keep the pair unequal so the chunk is never mistaken for stored
                    let declared = if compressed.len() == data.len() { data.len() + 1 } else { data.len() };
                    chunks.push(ChunkSizes::new(compressed.len() as u32, declared as u32));
                    payload.extend(compressed);
                    originals.push(data);
                }

                let decoded = decode_chunks(&payload, &chunks, SelectionPolicy::ChunkFlags)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert!(decoded.is_complete());
                prop_assert_eq!(decoded.images, originals);
            }
        }
    }
}
