use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;

use wirecall_core::error::Result;
use wirecall_core::protocol::{Reply, Request};

use crate::diag::{DiagnosticSink, TracingSink};
use crate::dispatch::handler::{Handler, HandlerError, HandlerResult, Outcome, SharedHandler};

/// Label -> handler mapping.
#[derive(Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, SharedHandler>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Builder-style insert. A repeated label replaces the earlier handler.
    pub fn on<H: Handler + 'static>(mut self, label: impl Into<String>, handler: H) -> Self {
        self.insert(label, Arc::new(handler));
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, handler: SharedHandler) {
        self.handlers.insert(label.into(), handler);
    }

    pub fn get(&self, label: &str) -> Option<&SharedHandler> {
        self.handlers.get(label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

/// Exactly one of the two handler configurations.
#[derive(Clone)]
pub enum HandlerConfig {
    /// Single handler for requests without a type label.
    Default(SharedHandler),
    /// Named handlers; no default.
    Registry(Registry),
}

/// Result of dispatching one request.
pub enum Dispatched {
    /// Reply is ready (routing error, sync failure, or immediate value).
    Ready(Reply),
    /// Reply is produced once the handler's deferred value settles.
    Pending(BoxFuture<'static, Reply>),
}

impl Dispatched {
    /// Wait for the reply regardless of variant.
    pub async fn into_reply(self) -> Reply {
        match self {
            Dispatched::Ready(r) => r,
            Dispatched::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatched::Ready(r) => f.debug_tuple("Ready").field(r).finish(),
            Dispatched::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Routes decoded requests to handlers and normalizes every outcome into
/// exactly one [`Reply`].
///
/// Configuration is fixed at construction, so dispatch needs no locking.
pub struct Dispatcher {
    config: HandlerConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Dispatcher {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn from_default_handler<H: Handler + 'static>(handler: H) -> Self {
        Self::new(HandlerConfig::Default(Arc::new(handler)))
    }

    pub fn from_registry(registry: Registry) -> Self {
        Self::new(HandlerConfig::Registry(registry))
    }

    /// Replace the diagnostic sink (defaults to [`TracingSink`]).
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn has_default(&self) -> bool {
        matches!(self.config, HandlerConfig::Default(_))
    }

    pub fn registered_labels(&self) -> Vec<&str> {
        match &self.config {
            HandlerConfig::Default(_) => Vec::new(),
            HandlerConfig::Registry(r) => r.labels(),
        }
    }

    fn resolve(&self, label: Option<&str>) -> std::result::Result<&SharedHandler, String> {
        match (label, &self.config) {
            (None, HandlerConfig::Default(h)) => Ok(h),
            (None, HandlerConfig::Registry(_)) => {
                Err("No default message handler registered".to_string())
            }
            (Some(label), HandlerConfig::Registry(r)) => r
                .get(label)
                .ok_or_else(|| format!("No message handler registered for type: \"{label}\"")),
            (Some(label), HandlerConfig::Default(_)) => Err(format!(
                "No message handler registered for type: \"{label}\""
            )),
        }
    }

    /// Decode transport text and dispatch it.
    ///
    /// Decode failures are returned to the caller; no reply is produced for
    /// them.
    pub fn dispatch_text(&self, text: &str) -> Result<Dispatched> {
        let req = Request::decode(text)?;
        Ok(self.dispatch(req))
    }

    /// Dispatch one decoded request.
    ///
    /// The handler runs synchronously here. Panics are caught and treated
    /// like a returned error.
    pub fn dispatch(&self, req: Request) -> Dispatched {
        let Request { id, payload, label } = req;

        let handler = match self.resolve(label.as_deref()) {
            Ok(h) => Arc::clone(h),
            Err(message) => {
                tracing::debug!(%id, label = ?label, "no handler for request");
                return Dispatched::Ready(Reply::failure(id, message));
            }
        };

        let called: HandlerResult<Outcome> =
            std::panic::catch_unwind(AssertUnwindSafe(move || handler.call(payload)))
                .unwrap_or_else(|p| Err(HandlerError::from_panic(p)));

        match called {
            Ok(Outcome::Immediate(value)) => Dispatched::Ready(Reply::success(id, value)),
            Err(err) => Dispatched::Ready(self.failed(id, &err)),
            Ok(Outcome::Deferred(fut)) => {
                let sink = Arc::clone(&self.sink);
                Dispatched::Pending(
                    async move {
                        let settled = AssertUnwindSafe(fut)
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|p| Err(HandlerError::from_panic(p)));
                        settle(sink.as_ref(), id, settled)
                    }
                    .boxed(),
                )
            }
        }
    }

    /// Decode, dispatch, and wait for the reply.
    pub async fn handle(&self, text: &str) -> Result<Reply> {
        Ok(self.dispatch_text(text)?.into_reply().await)
    }

    fn failed(&self, id: Value, err: &HandlerError) -> Reply {
        self.sink.handler_failed(&id, err);
        Reply::failure(id, err.message())
    }
}

fn settle(sink: &dyn DiagnosticSink, id: Value, settled: HandlerResult<Value>) -> Reply {
    match settled {
        Ok(value) => Reply::success(id, value),
        Err(err) => {
            sink.handler_failed(&id, &err);
            Reply::failure(id, err.message())
        }
    }
}
