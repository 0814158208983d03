//! Wire envelopes exchanged over a text channel.
//!
//! Both directions are JSON arrays:
//! - request: `[id, payload]` or `[id, payload, type]`
//! - reply: `[id, null, result]` or `[id, {"message": ...}]`
//!
//! All parsers are panic-free: malformed input is reported as
//! `WireCallError::Decode` instead of panicking or indexing raw arrays.

pub mod reply;
pub mod request;

pub use reply::{ErrorDescriptor, Reply};
pub use request::Request;
