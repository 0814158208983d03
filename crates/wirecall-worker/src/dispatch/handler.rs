//! Handler model.
//!
//! A handler takes the request payload and either fails synchronously
//! (`Err`) or yields an [`Outcome`]: a value that is ready now, or a deferred
//! computation that settles later.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use wirecall_core::error::WireCallError;

/// Result type returned by handlers.
pub type HandlerResult<T> = std::result::Result<T, HandlerError>;

/// Handler execution failure.
///
/// Only `message` is sent back to the caller. `source` is kept for the
/// worker-side diagnostic sink.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an arbitrary error; its `Display` output becomes the message.
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Build from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::new(message)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for HandlerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::from_error(err)
    }
}

impl From<WireCallError> for HandlerError {
    fn from(err: WireCallError) -> Self {
        Self::from_error(err)
    }
}

/// Value produced by a successful handler call.
pub enum Outcome {
    /// Result is ready now.
    Immediate(Value),
    /// Result settles later; the reply waits for it.
    Deferred(BoxFuture<'static, HandlerResult<Value>>),
}

impl Outcome {
    pub fn immediate(value: Value) -> Self {
        Outcome::Immediate(value)
    }

    /// Serialize `value` into an immediate outcome.
    pub fn ok<T: Serialize>(value: T) -> HandlerResult<Self> {
        Ok(Outcome::Immediate(serde_json::to_value(value)?))
    }

    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = HandlerResult<Value>> + Send + 'static,
    {
        Outcome::Deferred(fut.boxed())
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Immediate(v) => f.debug_tuple("Immediate").field(v).finish(),
            Outcome::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Message handler.
pub trait Handler: Send + Sync {
    fn call(&self, payload: Value) -> HandlerResult<Outcome>;
}

impl<F> Handler for F
where
    F: Fn(Value) -> HandlerResult<Outcome> + Send + Sync,
{
    fn call(&self, payload: Value) -> HandlerResult<Outcome> {
        (self)(payload)
    }
}

/// Shared handler reference.
pub type SharedHandler = Arc<dyn Handler>;

/// Adapter for synchronous handlers with typed request/response.
///
/// Payload deserialization failures surface as handler errors.
pub fn typed<Req, Resp, E, F>(func: F) -> impl Handler
where
    Req: DeserializeOwned + 'static,
    Resp: Serialize + 'static,
    E: Into<HandlerError> + 'static,
    F: Fn(Req) -> std::result::Result<Resp, E> + Send + Sync + 'static,
{
    move |payload: Value| -> HandlerResult<Outcome> {
        let req: Req = serde_json::from_value(payload)?;
        let resp = func(req).map_err(Into::<HandlerError>::into)?;
        Outcome::ok(resp)
    }
}

/// Adapter for async handlers with typed request/response.
pub fn typed_async<Req, Resp, E, F, Fut>(func: F) -> impl Handler
where
    Req: DeserializeOwned + 'static,
    Resp: Serialize + 'static,
    E: Into<HandlerError> + 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Resp, E>> + Send + 'static,
{
    move |payload: Value| -> HandlerResult<Outcome> {
        let req: Req = serde_json::from_value(payload)?;
        let fut = func(req);
        Ok(Outcome::deferred(async move {
            let resp = fut.await.map_err(Into::<HandlerError>::into)?;
            Ok::<Value, HandlerError>(serde_json::to_value(resp)?)
        }))
    }
}
