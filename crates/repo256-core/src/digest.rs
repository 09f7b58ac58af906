//! # Content Digest
//!
//! Defines `Digest`, the 32-byte SHA-256 value that addresses every object
//! in the repository. Objects are stored under their digest, requested by
//! their digest, and re-verified against their digest, so this type is the
//! common currency of the whole workspace.
//!
//! Hex rendering is lowercase, fixed width, no separators; `from_hex` is
//! the strict inverse and rejects anything else.

use sha2::{Digest as _, Sha256};

use crate::error::DigestError;

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 32-byte SHA-256 content digest.
///
/// Compared by exact byte equality. `Copy` on purpose: the index tables
/// store digests by value, never by reference into another allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Compute the SHA-256 digest of a byte slice.
    pub fn of(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render the digest as 64 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-char lowercase or uppercase hex string.
    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        if hex.len() != 2 * DIGEST_LEN {
            return Err(DigestError::BadLength { got: hex.len() });
        }
        let mut out = [0u8; DIGEST_LEN];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk).map_err(|_| DigestError::BadDigit(2 * i))?;
            out[i] = u8::from_str_radix(s, 16).map_err(|_| DigestError::BadDigit(2 * i))?;
        }
        Ok(Self(out))
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector_abc() {
        let d = Digest::of(b"abc");
        assert_eq!(
            d.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_known_vector_empty() {
        let d = Digest::of(b"");
        assert_eq!(
            d.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hex_round_trip() {
        let d = Digest::of(b"round trip");
        let parsed = Digest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(matches!(
            Digest::from_hex("abcd"),
            Err(DigestError::BadLength { got: 4 })
        ));
        assert!(Digest::from_hex(&"0".repeat(65)).is_err());
    }

    #[test]
    fn test_from_hex_rejects_bad_digit() {
        let mut hex = "0".repeat(64);
        hex.replace_range(10..11, "g");
        assert!(matches!(
            Digest::from_hex(&hex),
            Err(DigestError::BadDigit(10))
        ));
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let d = Digest::of(b"case");
        let upper = d.to_hex().to_uppercase();
        assert_eq!(Digest::from_hex(&upper).unwrap(), d);
    }

    #[test]
    fn test_display_matches_to_hex() {
        let d = Digest::of(b"display");
        assert_eq!(format!("{d}"), d.to_hex());
    }
}
