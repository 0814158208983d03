//! Dispatch layer.
//!
//! Re-exports the dispatcher, handler model, and typed adapters so downstream
//! consumers can depend on this module directly.

pub mod dispatcher;
pub mod handler;

pub use dispatcher::{Dispatched, Dispatcher, HandlerConfig, Registry};
pub use handler::{
    typed, typed_async, Handler, HandlerError, HandlerResult, Outcome, SharedHandler,
};
