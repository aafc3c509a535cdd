//! The injected hash function and the canonical node preimage.
//!
//! A node hashes as `H(key || encode_height(height) || value_hash? ||
//! left_hash? || right_hash?)` where absent fields are omitted, not
//! hashed as empty. The height is folded in as a fixed-width 3-byte
//! buffer holding its zigzag varint, zero-padded; the exact bytes are
//! part of the protocol and must match across implementations that
//! intend to verify each other's proofs.

use integer_encoding::VarInt;

/// Width of the encoded height inside the hash preimage.
pub const HEIGHT_ENCODING_LEN: usize = 3;

/// The hash function folded over node preimages.
///
/// Implementations decide the algorithm and the digest width; everything
/// above treats digests as opaque bytes.
pub trait NodeHasher {
    /// Digest `input`.
    fn digest(&self, input: &[u8]) -> Vec<u8>;
}

/// The provided [`NodeHasher`]: 32-byte Blake3.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

impl NodeHasher for Blake3Hasher {
    fn digest(&self, input: &[u8]) -> Vec<u8> {
        blake3::hash(input).as_bytes().to_vec()
    }
}

/// Encode a height for hashing: a zigzag varint in a zero-padded 3-byte
/// buffer, wide enough for any `i16`.
pub fn encode_height(height: i16) -> [u8; HEIGHT_ENCODING_LEN] {
    let mut buf = [0u8; HEIGHT_ENCODING_LEN];
    let written = height.encode_var(&mut buf);
    debug_assert!(written <= HEIGHT_ENCODING_LEN);
    buf
}

/// Assemble the canonical hash preimage from node fields.
pub fn node_hash_input(
    key: &[u8],
    height: i16,
    value_hash: Option<&[u8]>,
    left_hash: Option<&[u8]>,
    right_hash: Option<&[u8]>,
) -> Vec<u8> {
    let mut input = Vec::with_capacity(
        key.len()
            + HEIGHT_ENCODING_LEN
            + value_hash.map_or(0, <[u8]>::len)
            + left_hash.map_or(0, <[u8]>::len)
            + right_hash.map_or(0, <[u8]>::len),
    );

    input.extend_from_slice(key);
    input.extend_from_slice(&encode_height(height));
    if let Some(hash) = value_hash {
        input.extend_from_slice(hash);
    }
    if let Some(hash) = left_hash {
        input.extend_from_slice(hash);
    }
    if let Some(hash) = right_hash {
        input.extend_from_slice(hash);
    }

    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_encoding_is_fixed_width_zigzag() {
        assert_eq!(encode_height(0), [0x00, 0x00, 0x00]);
        assert_eq!(encode_height(1), [0x02, 0x00, 0x00]);
        assert_eq!(encode_height(-1), [0x01, 0x00, 0x00]);
        assert_eq!(encode_height(2), [0x04, 0x00, 0x00]);
        // zigzag(300) = 600 = 0b100_1011000
        assert_eq!(encode_height(300), [0xd8, 0x04, 0x00]);
        // the extremes still fit the 3-byte window
        assert_eq!(encode_height(i16::MAX), [0xfe, 0xff, 0x03]);
        assert_eq!(encode_height(i16::MIN), [0xff, 0xff, 0x03]);
    }

    #[test]
    fn absent_fields_are_omitted_from_the_preimage() {
        let bare = node_hash_input(b"key", 0, None, None, None);
        assert_eq!(bare.len(), 3 + HEIGHT_ENCODING_LEN);

        let with_value = node_hash_input(b"key", 0, Some(b"vh"), None, None);
        assert_eq!(with_value.len(), bare.len() + 2);
        // an empty present field and an absent field hash differently
        // only through the surrounding fields, never padded
        assert_ne!(bare, with_value);
    }

    #[test]
    fn blake3_digest_is_32_bytes() {
        let digest = Blake3Hasher.digest(b"showme");
        assert_eq!(digest.len(), 32);
        assert_eq!(digest, blake3::hash(b"showme").as_bytes().to_vec());
    }
}
