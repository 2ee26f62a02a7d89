//! Pure synchronous hashing for content addressing
//!
//! Every digest in the workspace (transaction fingerprints, state commitments)
//! goes through this module so the algorithm is selected in exactly one place.
//!
//! Current algorithm: **SHA-256** (32-byte output)
//!
//! ```
//! use tandem_core::hash::{hash, hasher};
//!
//! let one_shot = hash(b"hello world");
//!
//! let mut h = hasher();
//! h.update(b"hello");
//! h.update(b" world");
//! assert_eq!(h.finalize(), one_shot);
//! ```

use sha2::{Digest, Sha256};
use std::fmt;

/// Hash algorithm used for fingerprints and commitments.
pub trait HashAlgorithm: Send + Sync + fmt::Debug {
    /// Hash arbitrary bytes to a 32-byte digest.
    fn hash(&self, data: &[u8]) -> [u8; 32];

    /// Create an incremental hasher for multi-part input.
    fn hasher(&self) -> Box<dyn Hasher>;
}

/// Incremental hasher for multi-part data.
pub trait Hasher: Send {
    /// Feed more data into the hasher.
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the 32-byte digest.
    fn finalize(self: Box<Self>) -> [u8; 32];
}

/// SHA-256 (FIPS 180-4).
#[derive(Debug, Clone, Copy)]
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn hasher(&self) -> Box<dyn Hasher> {
        Box::new(Sha256Hasher(Sha256::new()))
    }
}

struct Sha256Hasher(Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> [u8; 32] {
        self.0.finalize().into()
    }
}

/// The algorithm used throughout the workspace.
///
/// Changing this constant changes every fingerprint and commitment, so it is a
/// wire-level decision: both ledgers must agree on it.
pub const ALGORITHM: Sha256Algorithm = Sha256Algorithm;

/// Hash `data` with the global algorithm.
#[inline]
pub fn hash(data: &[u8]) -> [u8; 32] {
    ALGORITHM.hash(data)
}

/// Create an incremental hasher using the global algorithm.
#[inline]
pub fn hasher() -> Box<dyn Hasher> {
    ALGORITHM.hasher()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash(b"tandem"), hash(b"tandem"));
        assert_ne!(hash(b"tandem"), hash(b"tandem "));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut h = hasher();
        h.update(b"root");
        h.update(b"/");
        h.update(b"child");
        assert_eq!(h.finalize(), hash(b"root/child"));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256("abc")
        let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert_eq!(hex::encode(hash(b"abc")), expected);
    }
}
