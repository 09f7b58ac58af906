//! # Error Types
//!
//! The shared error hierarchy for the workspace. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Decode failures carry enough position/context to be logged and then
//!   dropped; no error ever goes back out on the wire.
//! - Configuration errors are fatal at startup and surface through the
//!   binary's exit code.
//! - I/O errors on the serving path are absorbed by the resolver and fold
//!   into the negative caches; only startup I/O propagates.

use thiserror::Error;

/// Top-level error type for repo256.
#[derive(Error, Debug)]
pub enum RepoError {
    /// A frame could not be decoded under any supported suite.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid startup configuration. Fatal.
    #[error("config error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while decoding a wire frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte stream announced or sniffed as no supported suite.
    #[error("unknown encoding suite (first byte 0x{first_byte:02x})")]
    UnknownSuite {
        /// First payload byte after any switch framing.
        first_byte: u8,
    },

    /// The frame ended before the announced length.
    #[error("frame truncated at offset {0}")]
    Truncated(usize),

    /// A CCNx fixed header carried an unsupported version.
    #[error("unsupported packet version 0x{0:02x}")]
    BadVersion(u8),

    /// A TLV was structurally invalid for its context.
    #[error("malformed {0} TLV")]
    BadTlv(&'static str),
}

/// Error parsing a hex-encoded digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// Wrong string length; digests are exactly 64 hex chars.
    #[error("expected 64 hex chars, got {got}")]
    BadLength {
        /// Actual length of the rejected string.
        got: usize,
    },

    /// A character was not a hex digit.
    #[error("invalid hex digit at position {0}")]
    BadDigit(usize),
}
