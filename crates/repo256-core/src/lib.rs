//! # repo256-core — Foundational Types
//!
//! This crate is the bedrock of the repo256 workspace. It defines the
//! primitives every other crate builds on: the content digest, the
//! wire-encoding suite tag, the two index key types, and the error
//! hierarchy. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Digest` is a 32-byte
//!    value type with its own hex rendering; no bare `[u8; 32]` or hex
//!    strings cross module boundaries.
//!
//! 2. **Closed suite enumeration.** `Suite` is an exhaustive enum. Codec
//!    dispatch is a `match`, never a registry: adding an encoding forces
//!    every consumer to handle it at compile time.
//!
//! 3. **Owning key types.** `SuiteKey` is `Copy`; `NameKey` owns its name
//!    bytes. Index tables store copies, so no entry can alias another
//!    table's allocation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `repo256-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod key;
pub mod suite;

// Re-export primary types for ergonomic imports.
pub use digest::{Digest, DIGEST_LEN};
pub use error::{DecodeError, DigestError, RepoError};
pub use key::{NameKey, SuiteKey};
pub use suite::Suite;
