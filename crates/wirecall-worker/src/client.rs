//! Controller-side client.
//!
//! Sends requests with fresh numeric correlation ids and resolves each call
//! when the reply carrying the same id comes back. Replies may arrive in any
//! order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use wirecall_core::error::WireCallError;
use wirecall_core::protocol::{Reply, Request};

use crate::transport::Transport;

/// Why a call did not produce a value.
#[derive(Debug, Error)]
pub enum CallError {
    /// The worker replied with an error descriptor.
    #[error("{message}")]
    Remote { message: String },
    /// The channel closed before the reply arrived.
    #[error("worker channel closed")]
    Closed,
    /// Encoding or transport failure on this side.
    #[error(transparent)]
    Wire(#[from] WireCallError),
    /// The result did not match the requested type.
    #[error("unexpected result shape: {0}")]
    Result(#[from] serde_json::Error),
}

type Pending = DashMap<u64, oneshot::Sender<Reply>>;

pub struct WorkerClient {
    transport: Arc<dyn Transport>,
    pending: Arc<Pending>,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    reader: tokio::task::JoinHandle<()>,
}

impl WorkerClient {
    /// Start the reply reader on a tokio task.
    pub fn start<T: Transport + 'static>(transport: T) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let pending: Arc<Pending> = Arc::new(DashMap::new());
        let closed = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(read_replies(
            Arc::clone(&transport),
            Arc::clone(&pending),
            Arc::clone(&closed),
        ));

        Self {
            transport,
            pending,
            closed,
            next_id: AtomicU64::new(1),
            reader,
        }
    }

    /// Call the worker's default handler.
    pub async fn call(&self, payload: Value) -> Result<Value, CallError> {
        self.call_inner(None, payload).await
    }

    /// Call the handler registered under `label`.
    pub async fn call_type(&self, label: &str, payload: Value) -> Result<Value, CallError> {
        self.call_inner(Some(label.to_string()), payload).await
    }

    /// Typed call; `label = None` targets the default handler.
    pub async fn call_typed<Req, Resp>(
        &self,
        label: Option<&str>,
        request: &Req,
    ) -> Result<Resp, CallError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_value(request)?;
        let value = self.call_inner(label.map(str::to_string), payload).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Calls still waiting for a reply.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Close the sending side; the worker drains and stops.
    pub async fn close(&self) -> Result<(), CallError> {
        self.transport.close().await?;
        Ok(())
    }

    async fn call_inner(&self, label: Option<String>, payload: Value) -> Result<Value, CallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = Request::new(Value::from(id), payload, label).encode()?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        // Reader may have shut down between the insert and now.
        if self.closed.load(Ordering::SeqCst) {
            self.pending.remove(&id);
            return Err(CallError::Closed);
        }

        if let Err(e) = self.transport.send(text).await {
            self.pending.remove(&id);
            return Err(e.into());
        }

        let reply = rx.await.map_err(|_| CallError::Closed)?;
        reply
            .outcome
            .map_err(|desc| CallError::Remote {
                message: desc.message,
            })
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_replies(transport: Arc<dyn Transport>, pending: Arc<Pending>, closed: Arc<AtomicBool>) {
    loop {
        let text = match transport.recv().await {
            Ok(Some(text)) => text,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "reply channel failed");
                break;
            }
        };

        let reply = match Reply::decode(&text) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable reply");
                continue;
            }
        };

        let waiter = reply.id.as_u64().and_then(|id| pending.remove(&id));
        match waiter {
            Some((_, tx)) => {
                let _ = tx.send(reply);
            }
            None => tracing::warn!(id = %reply.id, "reply for unknown call"),
        }
    }

    closed.store(true, Ordering::SeqCst);
    // Dropping the senders fails every outstanding call with `Closed`.
    pending.clear();
    tracing::debug!("reply reader stopped");
}
