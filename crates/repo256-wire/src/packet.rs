//! # Parsed Packet Model
//!
//! The suite-independent view of one decoded frame. Codecs produce this;
//! the resolver, importer and scanner consume it. The raw frame bytes ride
//! along because replies and stored objects are always the original
//! encoding, emitted verbatim.

use repo256_core::{Digest, NameKey, Suite, SuiteKey};

/// What kind of packet a frame decoded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// A request, naming an object by digest or by hierarchical name.
    Interest,
    /// A served object.
    Content,
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub ptype: PacketType,
    pub suite: Suite,
    /// Raw wire-form name component bytes, `None` for nameless packets.
    pub name: Option<Vec<u8>>,
    /// The digest an Interest restricts its answer to, if any.
    pub digest_restriction: Option<Digest>,
    /// Digest of this packet under its suite's coverage rule. For Content
    /// packets this is the value the object is addressed by.
    pub digest: Digest,
    /// The frame span as received or stored, switch framing excluded.
    pub bytes: Vec<u8>,
}

impl Packet {
    /// The suite-qualified key of this packet's own digest.
    pub fn suite_key(&self) -> SuiteKey {
        SuiteKey::new(self.suite, self.digest)
    }

    /// The name-map key, if the packet carries a name.
    pub fn name_key(&self) -> Option<NameKey> {
        self.name
            .as_ref()
            .map(|n| NameKey::new(self.suite, n.clone()))
    }
}
