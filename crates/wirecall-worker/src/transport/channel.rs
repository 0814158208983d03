//! In-process transport over a pair of bounded tokio mpsc channels.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use wirecall_core::error::{Result, WireCallError};

use super::Transport;

/// One end of an in-process channel pair.
#[derive(Debug)]
pub struct ChannelTransport {
    tx: Mutex<Option<mpsc::Sender<String>>>,
    rx: Mutex<mpsc::Receiver<String>>,
}

impl ChannelTransport {
    /// Create two connected ends. Each direction buffers up to `capacity`
    /// payloads (minimum 1).
    pub fn pair(capacity: usize) -> (Self, Self) {
        let cap = capacity.max(1);
        let (a_tx, b_rx) = mpsc::channel(cap);
        let (b_tx, a_rx) = mpsc::channel(cap);
        (Self::new(a_tx, a_rx), Self::new(b_tx, b_rx))
    }

    fn new(tx: mpsc::Sender<String>, rx: mpsc::Receiver<String>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(rx),
        }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, text: String) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| WireCallError::Transport("channel closed locally".into()))?;
        tx.send(text)
            .await
            .map_err(|_| WireCallError::Transport("peer dropped channel".into()))
    }

    async fn recv(&self) -> Result<Option<String>> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<()> {
        self.tx.lock().await.take();
        Ok(())
    }
}
