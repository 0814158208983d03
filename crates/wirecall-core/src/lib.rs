//! wirecall core: transport-agnostic envelopes and the shared error type.
//!
//! This crate defines the wire-level contract between a worker and its
//! controller. It carries no transport or runtime dependencies so both sides
//! (and test tooling) can reuse it.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `WireCallError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, Result, WireCallError};
