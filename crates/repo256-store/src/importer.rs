//! # One-Shot Importer
//!
//! Ingests a source directory into a repository root and exits: each file
//! that parses as a content object is written to its canonical
//! digest-addressed path, and named objects get a relative symlink under
//! `zz/`. Existing files and links are left untouched, so importing the
//! same source twice is a no-op the second time.
//!
//! Individual bad inputs are skipped with a debug message; only real I/O
//! trouble (unreadable source root, failed mkdir/write into the repo)
//! fails the run.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;

use tracing::{debug, info};

use repo256_core::RepoError;
use repo256_wire::{decode_frame, PacketType};

use crate::layout;

/// What an import run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Object files newly written.
    pub stored: usize,
    /// Name symlinks newly created.
    pub linked: usize,
    /// Source files skipped (unparsable or not content objects).
    pub skipped: usize,
}

/// Recursively ingest `source` into the repository at `root`.
pub fn import(root: &Path, source: &Path) -> Result<ImportSummary, RepoError> {
    let mut summary = ImportSummary::default();
    walk(root, source, &mut summary)?;
    Ok(summary)
}

fn walk(root: &Path, dir: &Path, summary: &mut ImportSummary) -> Result<(), RepoError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            let dotted = entry.file_name().to_string_lossy().starts_with('.');
            if !dotted {
                walk(root, &path, summary)?;
            }
        } else if file_type.is_file() || file_type.is_symlink() {
            import_file(root, &path, summary)?;
        }
    }
    Ok(())
}

fn import_file(root: &Path, path: &Path, summary: &mut ImportSummary) -> Result<(), RepoError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(file = %path.display(), %err, "unreadable, skipped");
            summary.skipped += 1;
            return Ok(());
        }
    };

    let mut offset = 0;
    let pkt = match decode_frame(&bytes, &mut offset) {
        Ok(pkt) if pkt.ptype == PacketType::Content && offset == bytes.len() => pkt,
        Ok(_) => {
            debug!(file = %path.display(), "not a single content object, skipped");
            summary.skipped += 1;
            return Ok(());
        }
        Err(err) => {
            debug!(file = %path.display(), %err, "parse failure, skipped");
            summary.skipped += 1;
            return Ok(());
        }
    };

    let hex = pkt.digest.to_hex();
    let dst = layout::digest_path(root, &pkt.digest);
    if !dst.exists() {
        debug!(file = %dst.display(), "creating");
        layout::ensure_fanout_dir(root, &hex[..2])?;
        layout::write_object(&dst, &pkt.bytes)?;
        summary.stored += 1;
    }

    if pkt.name.is_some() {
        let link = layout::link_path(root, &pkt.digest);
        // symlink_metadata: an existing link must not be followed here,
        // only noticed.
        if fs::symlink_metadata(&link).is_err() {
            layout::ensure_fanout_dir(root, layout::LINK_DIR)?;
            symlink(layout::link_target(&pkt.digest), &link)?;
            summary.linked += 1;
        } else {
            info!(link = %link.display(), "already exists, ignored");
        }
    }
    Ok(())
}
