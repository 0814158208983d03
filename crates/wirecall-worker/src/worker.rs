//! Worker serve loop.
//!
//! Requests are decoded and dispatched one at a time in arrival order.
//! Deferred replies are polled alongside the receive side on the same task,
//! so replies go out in settlement order, not arrival order.

use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};

use wirecall_core::error::Result;
use wirecall_core::protocol::Reply;

use crate::config::{DecodeErrorPolicy, WorkerSection};
use crate::dispatch::{Dispatched, Dispatcher};
use crate::transport::Transport;

/// Runtime knobs for [`Worker`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerSettings {
    pub on_decode_error: DecodeErrorPolicy,
}

impl From<&WorkerSection> for WorkerSettings {
    fn from(section: &WorkerSection) -> Self {
        Self {
            on_decode_error: section.on_decode_error,
        }
    }
}

/// Counters returned when serving stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Payloads received from the transport.
    pub received: u64,
    /// Replies sent.
    pub replied: u64,
    /// Payloads dropped because they did not decode.
    pub dropped: u64,
}

pub struct Worker {
    dispatcher: Arc<Dispatcher>,
    settings: WorkerSettings,
}

impl Worker {
    pub fn new(dispatcher: Dispatcher, settings: WorkerSettings) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            settings,
        }
    }

    /// Serve until the peer closes and every pending reply has been sent.
    ///
    /// Returns early with an error on transport failure, or on undecodable
    /// input when the policy is [`DecodeErrorPolicy::Fail`]. A deferred value
    /// that never settles keeps this future alive.
    pub async fn serve<T: Transport + ?Sized>(&self, transport: &T) -> Result<ServeStats> {
        let mut stats = ServeStats::default();
        let mut pending = FuturesUnordered::new();
        let mut open = true;

        loop {
            tokio::select! {
                incoming = transport.recv(), if open => {
                    let Some(text) = incoming? else {
                        tracing::debug!(pending = pending.len(), "transport closed; draining");
                        open = false;
                        continue;
                    };
                    stats.received += 1;

                    match self.dispatcher.dispatch_text(&text) {
                        Ok(Dispatched::Ready(reply)) => {
                            send_reply(transport, &reply).await?;
                            stats.replied += 1;
                        }
                        Ok(Dispatched::Pending(fut)) => pending.push(fut),
                        Err(e) => match self.settings.on_decode_error {
                            DecodeErrorPolicy::Drop => {
                                tracing::warn!(code = e.code().as_str(), error = %e, "dropping undecodable request");
                                stats.dropped += 1;
                            }
                            DecodeErrorPolicy::Fail => {
                                tracing::error!(code = e.code().as_str(), error = %e, "undecodable request; stopping");
                                return Err(e);
                            }
                        },
                    }
                }

                Some(reply) = pending.next(), if !pending.is_empty() => {
                    send_reply(transport, &reply).await?;
                    stats.replied += 1;
                }

                else => break,
            }
        }

        tracing::info!(
            received = stats.received,
            replied = stats.replied,
            dropped = stats.dropped,
            "worker stopped"
        );
        Ok(stats)
    }

    /// Run [`Worker::serve`] on a tokio task that owns the transport.
    pub fn spawn<T: Transport + 'static>(self, transport: T) -> WorkerHandle {
        let handle = tokio::spawn(async move { self.serve(&transport).await });
        WorkerHandle { handle }
    }
}

async fn send_reply<T: Transport + ?Sized>(transport: &T, reply: &Reply) -> Result<()> {
    let text = reply.encode()?;
    tracing::trace!(id = %reply.id, ok = reply.is_success(), "sending reply");
    transport.send(text).await
}

pub struct WorkerHandle {
    handle: tokio::task::JoinHandle<Result<ServeStats>>,
}

impl WorkerHandle {
    /// Abort the serve task. Pending replies are lost.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Wait for the serve task to finish on its own.
    pub async fn join(self) -> Result<ServeStats> {
        match self.handle.await {
            Ok(res) => res,
            Err(e) => Err(wirecall_core::WireCallError::Internal(format!(
                "worker task failed: {e}"
            ))),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
