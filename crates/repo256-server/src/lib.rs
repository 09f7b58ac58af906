//! # repo256-server — Serving Layer
//!
//! Binds datagram interfaces, accepts Interests, and hands them to the
//! storage engine:
//!
//! - `iface` — UDP and UNIX datagram transports behind one interface type.
//! - `face` — per-peer identity, created on first contact.
//! - `dispatch` — iterates the frames of one datagram through the resolver.
//! - `run` — the event loop: per-interface reader tasks and transmit
//!   queues around a single dispatcher that owns all mutable state.
//!
//! The loop is cooperative and effectively single-threaded: the
//! `Repository` lives on the dispatcher, request handling between
//! readiness events is synchronous, and shutdown is a `watch` flag
//! observed between datagrams.

pub mod dispatch;
pub mod face;
pub mod iface;
pub mod run;

pub use dispatch::dispatch;
pub use face::FaceTable;
pub use iface::{Interface, PeerAddr, MAX_DATAGRAM};
pub use run::run;
