//! # repo256-store — Storage Engine
//!
//! Everything between the wire and the disk:
//!
//! - `layout` — the digest-addressed fan-out tree and the `zz/` name links.
//! - `index` — the `ok`/`er`/`no`/`nm` tables.
//! - `Repository` — the index plus root and mode, owned by the event loop;
//!   `resolver` resolves Interests against it, `scanner` populates it at
//!   boot.
//! - `importer` — one-shot ingestion into a repository root.
//!
//! ## Operating Modes
//!
//! **Index mode** (`ndx`) trusts the startup scan: a request is answered
//! only if the scan saw the object, and the file is served without
//! re-verification. **File mode** treats the disk as authoritative: every
//! hit is re-parsed and its digest recomputed before the bytes go out, and
//! failures feed the `er`/`no` negative caches so a bad digest costs disk
//! I/O at most once.

pub mod importer;
pub mod index;
pub mod layout;
pub mod resolver;
pub mod scanner;

pub use importer::{import, ImportSummary};
pub use index::Index;
pub use scanner::ScanSummary;

use std::path::{Path, PathBuf};

/// The repository's trust model, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read through to the filesystem, re-verifying every hit.
    File,
    /// Serve from the scanned index without re-verification.
    Ndx,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Ndx => "ndx",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serving-path counters. Single-threaded, so plain integers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    /// stat/open/read attempts against object files.
    pub disk_probes: u64,
    /// Interests answered with a reply buffer.
    pub replies: u64,
    /// Interests dropped, for whatever reason.
    pub drops: u64,
}

/// The object repository: root directory, mode, index tables, counters.
///
/// A plain value with no interior locking; the event loop owns it and all
/// request handling goes through `&mut self`.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    mode: Mode,
    index: Index,
    stats: Stats,
}

impl Repository {
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            root: root.into(),
            mode,
            index: Index::new(),
            stats: Stats::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub(crate) fn index_mut(&mut self) -> &mut Index {
        &mut self.index
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }
}
