//! Newline-delimited text over a byte stream pair.
//!
//! [`StdioTransport`] runs it over the process's stdin/stdout, which is how the
//! worker talks to a controller that spawned it. Payloads must not contain
//! raw newlines (compact JSON never does).

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::{mpsc, Mutex};

use wirecall_core::error::{Result, WireCallError};

use super::Transport;

/// Line transport. A background task pumps reader lines into a bounded
/// buffer so `recv` stays cancel-safe.
#[derive(Debug)]
pub struct LineTransport<W> {
    lines: Mutex<mpsc::Receiver<String>>,
    out: Mutex<Option<W>>,
}

/// Line transport over the process's stdin/stdout.
pub type StdioTransport = LineTransport<Stdout>;

impl LineTransport<Stdout> {
    /// Must be called from within a tokio runtime.
    pub fn new(capacity: usize) -> Self {
        Self::from_io(tokio::io::stdin(), tokio::io::stdout(), capacity)
    }
}

impl<W: AsyncWrite + Unpin + Send> LineTransport<W> {
    /// Must be called from within a tokio runtime.
    pub fn from_io<R>(reader: R, writer: W, capacity: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(pump_lines(reader, tx));

        Self {
            lines: Mutex::new(rx),
            out: Mutex::new(Some(writer)),
        }
    }
}

async fn pump_lines<R: AsyncRead + Unpin>(reader: R, tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "line read failed");
                break;
            }
        }
    }
    tracing::debug!("line reader closed");
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Transport for LineTransport<W> {
    async fn send(&self, text: String) -> Result<()> {
        let mut guard = self.out.lock().await;
        let out = guard
            .as_mut()
            .ok_or_else(|| WireCallError::Transport("writer closed".into()))?;

        let mut line = text.into_bytes();
        line.push(b'\n');
        out.write_all(&line)
            .await
            .map_err(|e| WireCallError::Transport(format!("line write failed: {e}")))?;
        out.flush()
            .await
            .map_err(|e| WireCallError::Transport(format!("line flush failed: {e}")))
    }

    async fn recv(&self) -> Result<Option<String>> {
        Ok(self.lines.lock().await.recv().await)
    }

    async fn close(&self) -> Result<()> {
        if let Some(mut out) = self.out.lock().await.take() {
            out.shutdown()
                .await
                .map_err(|e| WireCallError::Transport(format!("line shutdown failed: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, split, AsyncReadExt};

    #[tokio::test]
    async fn reads_lines_and_skips_blanks() {
        let (ours, theirs) = duplex(256);
        let (r, w) = split(ours);
        let t = LineTransport::from_io(r, w, 4);

        let (_peer_r, mut peer_w) = split(theirs);
        peer_w.write_all(b"[1,2]\n\n   \n[3,4,\"add\"]\n").await.unwrap();
        peer_w.shutdown().await.unwrap();

        assert_eq!(t.recv().await.unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(t.recv().await.unwrap().as_deref(), Some(r#"[3,4,"add"]"#));
        assert!(t.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn send_writes_one_line_per_payload() {
        let (ours, theirs) = duplex(256);
        let (r, w) = split(ours);
        let t = LineTransport::from_io(r, w, 4);

        t.send("[1,null,2]".into()).await.unwrap();
        t.send(r#"[2,{"message":"x"}]"#.into()).await.unwrap();

        let (peer_r, _peer_w) = split(theirs);
        let mut lines = BufReader::new(peer_r).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("[1,null,2]"));
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some(r#"[2,{"message":"x"}]"#)
        );
    }

    #[tokio::test]
    async fn close_ends_peer_stream_and_refuses_sends() {
        let (ours, theirs) = duplex(256);
        let (r, w) = split(ours);
        let t = LineTransport::from_io(r, w, 4);

        t.send("[1,null,1]".into()).await.unwrap();
        t.close().await.unwrap();

        let (mut peer_r, _peer_w) = split(theirs);
        let mut seen = String::new();
        peer_r.read_to_string(&mut seen).await.unwrap();
        assert_eq!(seen, "[1,null,1]\n");

        let err = t.send("[2,null,2]".into()).await.unwrap_err();
        assert_eq!(err.code().as_str(), "TRANSPORT");
    }
}
