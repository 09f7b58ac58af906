//! # Index Tables
//!
//! Four in-memory associative structures track what the repository knows
//! about its on-disk objects:
//!
//! | Table | Meaning |
//! |-------|---------|
//! | `ok`  | digest verified present at its canonical path |
//! | `er`  | file exists but failed verification |
//! | `no`  | file known absent |
//! | `nm`  | wire name, mapped to the `ok` key it resolves to |
//!
//! A `SuiteKey` lives in at most one of `ok`/`er`/`no` at any instant.
//! That invariant is enforced structurally: `ok_insert` clears the
//! negative caches for the key, and the `demote_*` operations remove it
//! from `ok`. Demotion is how file mode records that the disk, which it
//! treats as authoritative, contradicts an earlier scan.
//!
//! `nm` stores a copy of the `SuiteKey` (33 bytes per named entry), so no
//! table aliases another table's storage. First writer wins on name
//! collisions.

use std::collections::{HashMap, HashSet};

use repo256_core::{NameKey, SuiteKey};

/// The four index tables. Owned by a `Repository`; never shared.
#[derive(Debug, Default)]
pub struct Index {
    ok: HashSet<SuiteKey>,
    er: HashSet<SuiteKey>,
    no: HashSet<SuiteKey>,
    nm: HashMap<NameKey, SuiteKey>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verified-present key. Clears any stale negative-cache
    /// entry. Returns `true` if the key was newly inserted.
    pub fn ok_insert(&mut self, key: SuiteKey) -> bool {
        self.er.remove(&key);
        self.no.remove(&key);
        self.ok.insert(key)
    }

    pub fn ok_contains(&self, key: &SuiteKey) -> bool {
        self.ok.contains(key)
    }

    pub fn er_contains(&self, key: &SuiteKey) -> bool {
        self.er.contains(key)
    }

    pub fn no_contains(&self, key: &SuiteKey) -> bool {
        self.no.contains(key)
    }

    /// Record that the file for `key` exists but fails verification.
    pub fn demote_er(&mut self, key: SuiteKey) {
        self.ok.remove(&key);
        self.no.remove(&key);
        self.er.insert(key);
    }

    /// Record that the file for `key` does not exist.
    pub fn demote_no(&mut self, key: SuiteKey) {
        self.ok.remove(&key);
        self.er.remove(&key);
        self.no.insert(key);
    }

    /// Exact-match name lookup.
    pub fn nm_lookup(&self, name: &NameKey) -> Option<SuiteKey> {
        self.nm.get(name).copied()
    }

    /// Bind a name to a key unless the name is already bound. Returns
    /// `true` if this call created the binding.
    pub fn nm_insert_if_absent(&mut self, name: NameKey, key: SuiteKey) -> bool {
        match self.nm.entry(name) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(key);
                true
            }
        }
    }

    pub fn ok_len(&self) -> usize {
        self.ok.len()
    }

    pub fn er_len(&self) -> usize {
        self.er.len()
    }

    pub fn no_len(&self) -> usize {
        self.no.len()
    }

    pub fn nm_len(&self) -> usize {
        self.nm.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo256_core::{Digest, Suite};

    fn key(label: &str) -> SuiteKey {
        SuiteKey::new(Suite::Ndn, Digest::of(label.as_bytes()))
    }

    #[test]
    fn test_ok_insert_and_lookup() {
        let mut idx = Index::new();
        let k = key("a");
        assert!(!idx.ok_contains(&k));
        assert!(idx.ok_insert(k));
        assert!(idx.ok_contains(&k));
        assert!(!idx.ok_insert(k));
        assert_eq!(idx.ok_len(), 1);
    }

    #[test]
    fn test_demotions_keep_tables_disjoint() {
        let mut idx = Index::new();
        let k = key("b");

        idx.ok_insert(k);
        idx.demote_er(k);
        assert!(!idx.ok_contains(&k));
        assert!(idx.er_contains(&k));
        assert!(!idx.no_contains(&k));

        idx.demote_no(k);
        assert!(!idx.er_contains(&k));
        assert!(idx.no_contains(&k));

        idx.ok_insert(k);
        assert!(idx.ok_contains(&k));
        assert!(!idx.er_contains(&k));
        assert!(!idx.no_contains(&k));
    }

    #[test]
    fn test_nm_first_writer_wins() {
        let mut idx = Index::new();
        let first = key("first");
        let second = key("second");
        let name = NameKey::new(Suite::Ndn, b"/a/b".to_vec());

        assert!(idx.nm_insert_if_absent(name.clone(), first));
        assert!(!idx.nm_insert_if_absent(name.clone(), second));
        assert_eq!(idx.nm_lookup(&name), Some(first));
        assert_eq!(idx.nm_len(), 1);
    }

    #[test]
    fn test_nm_lookup_is_suite_qualified() {
        let mut idx = Index::new();
        let k = key("obj");
        idx.nm_insert_if_absent(NameKey::new(Suite::Ndn, b"n".to_vec()), k);
        assert_eq!(idx.nm_lookup(&NameKey::new(Suite::Ccnx, b"n".to_vec())), None);
    }

    #[test]
    fn test_suite_qualified_keys_are_distinct() {
        let mut idx = Index::new();
        let d = Digest::of(b"same bytes");
        idx.ok_insert(SuiteKey::new(Suite::Ccnx, d));
        assert!(!idx.ok_contains(&SuiteKey::new(Suite::Ndn, d)));
    }
}
