//! End-to-end: client and worker over an in-process channel pair.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Notify;

use wirecall_worker::{
    typed, typed_async, CallError, CapturingSink, ChannelTransport, Dispatcher, HandlerError,
    HandlerResult, Outcome, Registry, Transport, Worker, WorkerClient, WorkerSettings,
};

fn start(dispatcher: Dispatcher) -> (WorkerClient, wirecall_worker::WorkerHandle) {
    let (client_end, worker_end) = ChannelTransport::pair(64);
    let handle = Worker::new(dispatcher, WorkerSettings::default()).spawn(worker_end);
    (WorkerClient::start(client_end), handle)
}

fn remote_message(res: Result<Value, CallError>) -> String {
    match res {
        Err(CallError::Remote { message }) => message,
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn add_scenario_over_raw_wire() {
    let registry = Registry::new().on("add", typed(|n: i64| Ok::<_, HandlerError>(n + 1)));
    let (controller, worker_end) = ChannelTransport::pair(4);
    let handle = Worker::new(Dispatcher::from_registry(registry), WorkerSettings::default())
        .spawn(worker_end);

    controller.send(r#"[42,5,"add"]"#.into()).await.unwrap();
    assert_eq!(
        controller.recv().await.unwrap().as_deref(),
        Some("[42,null,6]")
    );

    controller.close().await.unwrap();
    let stats = handle.join().await.unwrap();
    assert_eq!(stats.replied, 1);
}

#[tokio::test]
async fn rejected_default_scenario_over_raw_wire() {
    let sink = Arc::new(CapturingSink::new());
    let dispatcher = Dispatcher::from_default_handler(|_v: Value| -> HandlerResult<Outcome> {
        Ok(Outcome::deferred(async {
            Err::<Value, HandlerError>(HandlerError::new("boom"))
        }))
    })
    .with_diagnostics(sink.clone());

    let (controller, worker_end) = ChannelTransport::pair(4);
    let _handle = Worker::new(dispatcher, WorkerSettings::default()).spawn(worker_end);

    controller.send("[7,null]".into()).await.unwrap();
    assert_eq!(
        controller.recv().await.unwrap().as_deref(),
        Some(r#"[7,{"message":"boom"}]"#)
    );
    assert_eq!(sink.captured(), vec![(json!(7), "boom".to_string())]);
}

#[tokio::test]
async fn client_sees_values_and_errors() {
    let registry = Registry::new()
        .on("double", typed(|n: i64| Ok::<_, HandlerError>(n * 2)))
        .on(
            "later",
            typed_async(|s: String| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, HandlerError>(s.to_uppercase())
            }),
        )
        .on("bad", |_v: Value| -> HandlerResult<Outcome> {
            Err(HandlerError::new("bad things"))
        });
    let (client, _handle) = start(Dispatcher::from_registry(registry));

    assert_eq!(client.call_type("double", json!(21)).await.unwrap(), json!(42));
    assert_eq!(client.call_type("later", json!("hi")).await.unwrap(), json!("HI"));
    assert_eq!(remote_message(client.call_type("bad", Value::Null).await), "bad things");
    assert_eq!(
        remote_message(client.call_type("nope", Value::Null).await),
        "No message handler registered for type: \"nope\""
    );
    assert_eq!(
        remote_message(client.call(Value::Null).await),
        "No default message handler registered"
    );

    let n: i64 = client.call_typed(Some("double"), &4).await.unwrap();
    assert_eq!(n, 8);
}

#[tokio::test]
async fn concurrent_calls_are_isolated() {
    let gate = Arc::new(Notify::new());
    let g = Arc::clone(&gate);

    let registry = Registry::new()
        .on("blocked", move |v: Value| -> HandlerResult<Outcome> {
            let g = Arc::clone(&g);
            Ok(Outcome::deferred(async move {
                g.notified().await;
                Ok::<Value, HandlerError>(v)
            }))
        })
        .on("free", |v: Value| -> HandlerResult<Outcome> {
            Ok(Outcome::immediate(v))
        });
    let (client, _handle) = start(Dispatcher::from_registry(registry));
    let client = Arc::new(client);

    let c = Arc::clone(&client);
    let blocked = tokio::spawn(async move { c.call_type("blocked", json!("a")).await });

    // The free call completes while the blocked one is still in flight.
    assert_eq!(client.call_type("free", json!("b")).await.unwrap(), json!("b"));
    assert!(!blocked.is_finished());

    gate.notify_one();
    assert_eq!(blocked.await.unwrap().unwrap(), json!("a"));
}

#[tokio::test]
async fn closing_client_drains_worker() {
    let (client, handle) = start(Dispatcher::from_default_handler(
        |v: Value| -> HandlerResult<Outcome> { Ok(Outcome::immediate(v)) },
    ));

    assert_eq!(client.call(json!([1, 2])).await.unwrap(), json!([1, 2]));
    client.close().await.unwrap();

    let stats = handle.join().await.unwrap();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.replied, 1);
}
