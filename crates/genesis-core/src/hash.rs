//! Digest primitives shared by the transaction, header and PoW code.

use sha2::{Digest, Sha256, Sha512};

/// Bitcoin's double SHA256: SHA256(SHA256(data)).
///
/// Used for the coinbase txid (the merkle root) and the header hash.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Double SHA512: SHA512(SHA512(data)).
///
/// Salt for the first Argon2id stage of the dual proof-of-work.
#[inline]
pub fn double_sha512(data: &[u8]) -> [u8; 64] {
    let first = Sha512::digest(data);
    let second = Sha512::digest(first);
    let mut result = [0u8; 64];
    result.copy_from_slice(&second);
    result
}

/// Reverse the byte order of a 32-byte array.
///
/// Digests are produced in natural (little-endian) order and displayed
/// reversed.
#[inline]
pub fn reverse_bytes(bytes: &[u8; 32]) -> [u8; 32] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Convert a natural-order digest to its display format (reversed hex).
pub fn hash_to_display_hex(hash: &[u8; 32]) -> String {
    hex::encode(reverse_bytes(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256() {
        let hash = double_sha256(b"hello");

        let expected =
            hex::decode("9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50")
                .unwrap();

        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_double_sha512_chains_two_rounds() {
        let once = Sha512::digest(b"genesis");
        let twice = Sha512::digest(once);
        assert_eq!(double_sha512(b"genesis").as_slice(), twice.as_slice());
    }

    #[test]
    fn test_reverse_bytes() {
        let mut original = [0u8; 32];
        for (i, byte) in original.iter_mut().enumerate() {
            *byte = i as u8 + 1;
        }
        let reversed = reverse_bytes(&original);

        assert_eq!(reversed[0], 0x20);
        assert_eq!(reversed[31], 0x01);
    }

    #[test]
    fn test_display_hex_is_reversed() {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        let display = hash_to_display_hex(&hash);
        assert!(display.ends_with("ab"));
        assert!(display.starts_with("00"));
    }
}
