//! Text message transports.
//!
//! A transport moves opaque text payloads in both directions, reliably and in
//! order. The worker and the client only ever see whole payloads; framing is
//! the transport's business.

pub mod channel;
pub mod stdio;

use std::sync::Arc;

use async_trait::async_trait;

use wirecall_core::error::Result;

pub use channel::ChannelTransport;
pub use stdio::{LineTransport, StdioTransport};

/// Bidirectional text channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one payload.
    async fn send(&self, text: String) -> Result<()>;

    /// Receive the next payload. `Ok(None)` means the peer closed its side.
    async fn recv(&self) -> Result<Option<String>>;

    /// Close the sending side. Later `send` calls fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, text: String) -> Result<()> {
        (**self).send(text).await
    }

    async fn recv(&self) -> Result<Option<String>> {
        (**self).recv().await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}
