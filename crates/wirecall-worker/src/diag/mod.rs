//! Worker-side diagnostics for handler failures.
//!
//! The caller only ever sees the error message; the sink gets the full error
//! (including its source chain) for local debugging. Routing failures
//! ("no handler") are not reported here.

use std::error::Error as StdError;
use std::sync::Mutex;

use serde_json::Value;

use crate::dispatch::HandlerError;

/// Receives every handler execution failure before its reply is sent.
pub trait DiagnosticSink: Send + Sync {
    fn handler_failed(&self, id: &Value, error: &HandlerError);
}

/// Default sink: logs through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn handler_failed(&self, id: &Value, error: &HandlerError) {
        let chain = source_chain(error);
        if chain.is_empty() {
            tracing::error!(%id, error = %error, "worker caught an error");
        } else {
            tracing::error!(%id, error = %error, caused_by = %chain.join(": "), "worker caught an error");
        }
    }
}

fn source_chain(error: &HandlerError) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = error.source();
    while let Some(e) = cur {
        out.push(e.to_string());
        cur = e.source();
    }
    out
}

/// Sink that records `(id, message)` pairs. Intended for tests.
#[derive(Debug, Default)]
pub struct CapturingSink {
    seen: Mutex<Vec<(Value, String)>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self) -> Vec<(Value, String)> {
        match self.seen.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.captured().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CapturingSink {
    fn handler_failed(&self, id: &Value, error: &HandlerError) {
        let mut g = match self.seen.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        g.push((id.clone(), error.message().to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chain_walks_sources() {
        let inner = serde_json::from_str::<u8>("x").unwrap_err();
        let err = HandlerError::from_error(inner);
        assert_eq!(source_chain(&err).len(), 1);
        assert!(source_chain(&HandlerError::new("plain")).is_empty());
    }

    #[test]
    fn capturing_sink_records_messages() {
        let sink = CapturingSink::new();
        sink.handler_failed(&json!(3), &HandlerError::new("boom"));
        assert_eq!(sink.captured(), vec![(json!(3), "boom".to_string())]);
    }
}
