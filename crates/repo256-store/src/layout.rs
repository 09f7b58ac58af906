//! # On-Disk Layout
//!
//! Objects live under a two-level fan-out keyed by the first digest byte:
//!
//! ```text
//! <root>/<XX>/<YY...>      object file, XX = hex of digest[0], YY... = 62 hex chars
//! <root>/zz/<64 hex>       name symlink, target ../<XX>/<YY...>
//! ```
//!
//! `zz` never collides with a fan-out directory because fan-out names are
//! hex. Distinct digests map to distinct paths by construction.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use repo256_core::Digest;

/// Directory holding the name symlinks.
pub const LINK_DIR: &str = "zz";

/// Canonical object path for a digest: `root/XX/YY...`.
pub fn digest_path(root: &Path, digest: &Digest) -> PathBuf {
    let hex = digest.to_hex();
    root.join(&hex[..2]).join(&hex[2..])
}

/// Symlink path for a named object: `root/zz/<64 hex>`.
pub fn link_path(root: &Path, digest: &Digest) -> PathBuf {
    root.join(LINK_DIR).join(digest.to_hex())
}

/// Relative symlink target from inside `zz/`: `../XX/YY...`.
pub fn link_target(digest: &Digest) -> PathBuf {
    let hex = digest.to_hex();
    PathBuf::from(format!("../{}/{}", &hex[..2], &hex[2..]))
}

/// Create `root/<prefix>` if absent. Idempotent.
pub fn ensure_fanout_dir(root: &Path, prefix: &str) -> io::Result<()> {
    match fs::create_dir(root.join(prefix)) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(err) => Err(err),
    }
}

/// Read a whole object file.
pub fn read_object(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Write a new object file, truncating any prior contents.
pub fn write_object(path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::write(path, bytes)
}
