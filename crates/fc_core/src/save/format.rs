//! Snapshot slice codec.
//!
//! Each slice travels as MessagePack with field names, LZ4-compressed with
//! the size prepended, and a SHA256 checksum appended. The checksum is
//! verified before any decompression so a torn write is rejected outright
//! instead of feeding garbage to the decoder.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use super::error::PersistError;

/// Bumped whenever a slice layout changes shape.
pub const SLICE_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Serialize and compress one snapshot slice.
pub fn encode_slice<T: Serialize>(payload: &T) -> Result<Vec<u8>, PersistError> {
    let msgpack = to_vec_named(&Envelope { version: SLICE_VERSION, payload })?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Verify, decompress and deserialize one snapshot slice.
pub fn decode_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    // Minimum: the 4-byte size prefix plus the checksum.
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(PersistError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated = hasher.finalize();
    if &calculated[..] != checksum_bytes {
        return Err(PersistError::ChecksumMismatch);
    }

    let msgpack =
        decompress_size_prepended(payload).map_err(|_| PersistError::Decompression)?;
    let envelope: Envelope<T> = from_slice(&msgpack)?;

    if envelope.version > SLICE_VERSION {
        return Err(PersistError::VersionMismatch {
            found: envelope.version,
            expected: SLICE_VERSION,
        });
    }

    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::clock::MatchClock;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut clock = MatchClock::default();
        clock.start(12_345);

        let bytes = encode_slice(&clock).unwrap();
        let back: MatchClock = decode_slice(&bytes).unwrap();
        assert_eq!(clock, back);
    }

    #[test]
    fn test_checksum_rejects_corruption() {
        let bytes = {
            let mut bytes = encode_slice(&MatchClock::default()).unwrap();
            let mid = bytes.len() / 2;
            bytes[mid] = bytes[mid].wrapping_add(1);
            bytes
        };
        assert!(matches!(
            decode_slice::<MatchClock>(&bytes),
            Err(PersistError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_truncated_input_is_corrupted() {
        assert!(matches!(
            decode_slice::<MatchClock>(&[0u8; 10]),
            Err(PersistError::Corrupted)
        ));
    }
}
