//! wirecall worker process.
//!
//! Serves newline-delimited requests on stdin and writes replies to stdout.
//! Logs go to stderr.
//!
//! Usage: `wirecall-worker [config.yaml]` (defaults to `wirecall.yaml` when
//! present, built-in defaults otherwise).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

use wirecall_core::error::Result;
use wirecall_worker::{
    config, typed, typed_async, Dispatcher, HandlerError, HandlerResult, Outcome, Registry,
    StdioTransport, Worker, WorkerSettings,
};

#[derive(Debug, Deserialize)]
struct AddReq {
    a: i64,
    b: i64,
}

#[derive(Debug, Serialize)]
struct AddResp {
    sum: i64,
}

fn demo_registry() -> Registry {
    Registry::new()
        .on("echo", |v: Value| -> HandlerResult<Outcome> {
            Ok(Outcome::immediate(v))
        })
        .on(
            "add",
            typed(|req: AddReq| {
                req.a
                    .checked_add(req.b)
                    .map(|sum| AddResp { sum })
                    .ok_or_else(|| HandlerError::new("integer overflow"))
            }),
        )
        .on(
            "sleep",
            typed_async(|ms: u64| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, HandlerError>(ms)
            }),
        )
        .on("fail", |v: Value| -> HandlerResult<Outcome> {
            let msg = v.as_str().unwrap_or("requested failure").to_string();
            Err(HandlerError::new(msg))
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wirecall.yaml".to_string());
    let cfg = config::load_or_default(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log.filter.as_str()));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dispatcher = Dispatcher::from_registry(demo_registry());
    tracing::info!(config = %path, handlers = ?dispatcher.registered_labels(), "wirecall-worker starting");

    let worker = Worker::new(dispatcher, WorkerSettings::from(&cfg.worker));
    let transport = StdioTransport::new(cfg.worker.channel_capacity);
    worker.serve(&transport).await?;

    Ok(())
}
