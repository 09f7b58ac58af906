//! # Startup Scanner
//!
//! Populates the index from the files already on disk. Index mode walks
//! the whole repository root and insists that every object sit at the
//! canonical path for its digest; file mode walks only the `zz/` link
//! directory and follows the symlinks, since the disk will be re-verified
//! on every hit anyway.
//!
//! Scanning is idempotent: the tables are sets, so a second walk adds
//! nothing.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use repo256_core::RepoError;
use repo256_wire::{decode_frame, PacketType};

use crate::{layout, Mode, Repository};

/// What a scan found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Objects entered into the `ok` table.
    pub loaded: usize,
    /// Name bindings created in the `nm` table.
    pub named: usize,
    /// Files ignored: unparsable, misplaced, or with an already-bound name.
    pub skipped: usize,
}

impl Repository {
    /// Walk the on-disk tree and populate the index.
    pub fn scan(&mut self) -> Result<ScanSummary, RepoError> {
        let start = match self.mode() {
            Mode::Ndx => self.root().to_path_buf(),
            Mode::File => self.root().join(layout::LINK_DIR),
        };
        let mut summary = ScanSummary::default();
        self.walk(&start, &mut summary)?;
        Ok(summary)
    }

    fn walk(&mut self, dir: &Path, summary: &mut ScanSummary) -> Result<(), RepoError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                // A missing zz/ directory just means an empty repo.
                debug!(dir = %dir.display(), %err, "cannot open directory, skipping");
                return Ok(());
            }
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                let dotted = entry.file_name().to_string_lossy().starts_with('.');
                if !dotted {
                    self.walk(&path, summary)?;
                }
            } else if file_type.is_file() {
                self.add_object(&path, summary);
            } else if file_type.is_symlink() && self.mode() == Mode::File {
                self.add_object(&path, summary);
            }
        }
        Ok(())
    }

    fn add_object(&mut self, path: &Path, summary: &mut ScanSummary) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(file = %path.display(), %err, "unreadable, skipped");
                summary.skipped += 1;
                return;
            }
        };

        let mut offset = 0;
        let pkt = match decode_frame(&bytes, &mut offset) {
            Ok(pkt) if pkt.ptype == PacketType::Content && offset == bytes.len() => pkt,
            Ok(_) => {
                debug!(file = %path.display(), "not a single content object, skipped");
                summary.skipped += 1;
                return;
            }
            Err(err) => {
                debug!(file = %path.display(), %err, "parse failure, skipped");
                summary.skipped += 1;
                return;
            }
        };

        if self.mode() == Mode::Ndx {
            // The on-disk layout is authoritative: a file not at the
            // canonical path for its own digest is somebody's mistake.
            let canonical = layout::digest_path(self.root(), &pkt.digest);
            if canonical.as_path() != path {
                warn!(file = %path.display(), "wrong digest for file, ignored");
                summary.skipped += 1;
                return;
            }
        }

        let key = pkt.suite_key();
        if self.index_mut().ok_insert(key) {
            summary.loaded += 1;
        }
        if let Some(name_key) = pkt.name_key() {
            match self.index().nm_lookup(&name_key) {
                None => {
                    self.index_mut().nm_insert_if_absent(name_key, key);
                    summary.named += 1;
                }
                Some(existing) if existing == key => {}
                Some(_) => {
                    warn!(file = %path.display(), %key, "name already bound, file omitted");
                    summary.skipped += 1;
                }
            }
        }
    }
}
