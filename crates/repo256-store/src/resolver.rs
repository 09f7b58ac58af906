//! # Lookup Resolver
//!
//! Turns a parsed Interest into a reply buffer, or into a silent drop.
//! Resolution is two steps: map the Interest to a suite-qualified digest
//! key (via the hash restriction or the name map), then load the object
//! bytes under the rules of the operating mode.
//!
//! File mode's invariant sits here: the serving path never emits bytes
//! whose recomputed digest disagrees with the digest the requester asked
//! for. Verification failures are remembered in the negative caches, so
//! each bad key costs disk I/O at most once.

use std::fs;

use tracing::{debug, warn};

use repo256_core::SuiteKey;
use repo256_wire::{decode_with_suite, Packet, PacketType};

use crate::{layout, Mode, Repository};

impl Repository {
    /// Resolve one Interest. `Some` carries the reply bytes to enqueue on
    /// the originating interface; `None` means drop, already logged.
    pub fn resolve(&mut self, interest: &Packet) -> Option<Vec<u8>> {
        let reply = if interest.ptype != PacketType::Interest {
            debug!(suite = %interest.suite, "not an interest, dropping");
            None
        } else {
            match self.resolve_key(interest) {
                Some(key) => match self.mode() {
                    Mode::Ndx => self.read_trusted(key),
                    Mode::File => self.read_verified(key),
                },
                None => None,
            }
        };
        match &reply {
            Some(_) => self.stats_mut().replies += 1,
            None => self.stats_mut().drops += 1,
        }
        reply
    }

    /// Map the Interest to the key of the object it asks for.
    fn resolve_key(&self, interest: &Packet) -> Option<SuiteKey> {
        if let Some(digest) = interest.digest_restriction {
            let key = SuiteKey::new(interest.suite, digest);
            debug!(%key, "lookup by digest");
            if self.mode() == Mode::Ndx && !self.index().ok_contains(&key) {
                debug!(%key, "digest not indexed, dropping");
                return None;
            }
            Some(key)
        } else if let Some(name_key) = interest.name_key() {
            debug!(
                suite = %interest.suite,
                name_len = name_key.name().len(),
                "lookup by name"
            );
            match self.index().nm_lookup(&name_key) {
                Some(key) => {
                    debug!(%key, "name resolved");
                    Some(key)
                }
                None => {
                    debug!("name not indexed, dropping");
                    None
                }
            }
        } else {
            debug!("interest carries neither digest nor name, dropping");
            None
        }
    }

    /// Index-mode load: the index vouched for the file, so any read
    /// failure is disk corruption worth a warning, not a cache entry.
    fn read_trusted(&mut self, key: SuiteKey) -> Option<Vec<u8>> {
        let path = layout::digest_path(self.root(), &key.digest());
        self.stats_mut().disk_probes += 1;
        match layout::read_object(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(%key, %err, "indexed object unreadable, dropping");
                None
            }
        }
    }

    /// File-mode load: negative caches first, then stat, read, re-parse,
    /// and digest comparison. Failures demote the key.
    fn read_verified(&mut self, key: SuiteKey) -> Option<Vec<u8>> {
        if self.index().er_contains(&key) {
            debug!(%key, "negative cache hit (corrupt), dropping");
            return None;
        }
        if self.index().no_contains(&key) {
            debug!(%key, "negative cache hit (absent), dropping");
            return None;
        }

        let path = layout::digest_path(self.root(), &key.digest());
        self.stats_mut().disk_probes += 1;

        if fs::metadata(&path).is_err() {
            debug!(%key, "object absent, remembered");
            self.index_mut().demote_no(key);
            return None;
        }
        let bytes = match layout::read_object(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(%key, %err, "object unreadable, remembered as corrupt");
                self.index_mut().demote_er(key);
                return None;
            }
        };

        let mut offset = 0;
        let verified = match decode_with_suite(key.suite(), &bytes, &mut offset) {
            Ok(pkt) => offset == bytes.len() && pkt.digest == key.digest(),
            Err(_) => false,
        };
        if !verified {
            debug!(%key, "verification failed, remembered as corrupt");
            self.index_mut().demote_er(key);
            return None;
        }
        Some(bytes)
    }
}
