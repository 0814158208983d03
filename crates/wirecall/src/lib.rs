//! Top-level facade crate for wirecall.
//!
//! Re-exports the core envelopes and the worker library so users can depend on
//! a single crate.

pub mod core {
    pub use wirecall_core::*;
}

pub mod worker {
    pub use wirecall_worker::*;
}
