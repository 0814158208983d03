//! wirecall worker library entry.
//!
//! This crate wires the handler model, dispatcher, transports, and serve loop
//! into a worker that answers correlated call requests over a text channel.
//! The controller-side [`client::WorkerClient`] speaks the same protocol and
//! is used by the integration tests.

pub mod client;
pub mod config;
pub mod diag;
pub mod dispatch;
pub mod transport;
pub mod worker;

pub use client::{CallError, WorkerClient};
pub use diag::{CapturingSink, DiagnosticSink, TracingSink};
pub use dispatch::{
    typed, typed_async, Dispatched, Dispatcher, Handler, HandlerConfig, HandlerError,
    HandlerResult, Outcome, Registry,
};
pub use transport::{ChannelTransport, LineTransport, StdioTransport, Transport};
pub use worker::{ServeStats, Worker, WorkerHandle, WorkerSettings};
