//! # Index Key Types
//!
//! Two key shapes address the repository's in-memory tables:
//!
//! - `SuiteKey` qualifies a content digest with its encoding suite. The
//!   same bytes expected under CCNx and under NDN are distinct objects,
//!   so the digest alone is not a key.
//! - `NameKey` qualifies the raw wire-form name bytes with the suite.
//!   Lookup is exact byte equality; there is no prefix matching.
//!
//! Both types own their data. The name map stores a `SuiteKey` copy as its
//! value, which keeps every table self-contained instead of aliasing
//! another table's key storage.

use crate::digest::{Digest, DIGEST_LEN};
use crate::suite::Suite;

/// A suite-qualified content digest: logically the 33-byte tuple
/// (suite tag ∥ digest). Key type for the `OK`, `ER` and `NO` sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuiteKey {
    suite: Suite,
    digest: Digest,
}

impl SuiteKey {
    pub fn new(suite: Suite, digest: Digest) -> Self {
        Self { suite, digest }
    }

    pub fn suite(&self) -> Suite {
        self.suite
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// The canonical 33-byte wire form: one tag byte then the digest.
    pub fn to_bytes(&self) -> [u8; DIGEST_LEN + 1] {
        let mut out = [0u8; DIGEST_LEN + 1];
        out[0] = self.suite.tag();
        out[1..].copy_from_slice(self.digest.as_bytes());
        out
    }
}

impl std::fmt::Display for SuiteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.digest, self.suite)
    }
}

/// A suite-qualified hierarchical name in its wire form. Key type for the
/// name map. The `name` field holds the encoded name components exactly as
/// they appear inside the packet's name TLV.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameKey {
    suite: Suite,
    name: Vec<u8>,
}

impl NameKey {
    pub fn new(suite: Suite, name: Vec<u8>) -> Self {
        Self { suite, name }
    }

    pub fn suite(&self) -> Suite {
        self.suite
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }
}
