//! Benchmarks for calls through a live session pair.
//!
//! Run with: `cargo bench --package mcpmux-benches --bench session`

// Allow missing docs for criterion_group! macro generated functions
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use futures::future::join_all;
use mcpmux_core::capability::{ClientCapabilities, ClientInfo, ServerCapabilities, ServerInfo};
use mcpmux_core::types::{CallToolResult, Tool};
use mcpmux_server::ServerBuilder;
use mcpmux_session::{Session, SessionBuilder};
use mcpmux_transport::MemoryTransport;
use serde_json::json;
use tokio::runtime::Runtime;

fn client_builder() -> SessionBuilder {
    SessionBuilder::client(ClientInfo::new("bench", "1.0.0"), ClientCapabilities::new())
}

/// A raw session pair whose server echoes its params.
fn echo_pair(rt: &Runtime) -> (Session, Session) {
    rt.block_on(async {
        let (client_end, server_end) = MemoryTransport::pair();
        let server = SessionBuilder::server(ServerInfo::new("echo", "1.0.0"), ServerCapabilities::new())
            .serve_callback("echo", |_, params| async move { Ok(params.unwrap_or_default()) })
            .connect(server_end)
            .await
            .unwrap();
        let client = client_builder().connect(client_end).await.unwrap();
        (client, server)
    })
}

fn bench_session_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_call");
    let rt = Runtime::new().unwrap();
    let (client, _server) = echo_pair(&rt);
    group.throughput(Throughput::Elements(1));

    group.bench_function("echo_empty", |b| {
        b.to_async(&rt)
            .iter(|| async { client.call("echo", None).await.unwrap() });
    });

    let payload = json!({"items": (0..100).collect::<Vec<_>>(), "label": "payload"});
    group.bench_function("echo_payload", |b| {
        b.to_async(&rt).iter(|| async {
            client
                .call("echo", Some(black_box(payload.clone())))
                .await
                .unwrap()
        });
    });

    group.finish();
}

fn bench_concurrent_calls(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_concurrent_calls");
    let rt = Runtime::new().unwrap();
    let (client, _server) = echo_pair(&rt);

    for batch in [1u64, 10, 50] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            b.to_async(&rt).iter(|| async {
                let calls = (0..batch).map(|i| client.call("echo", Some(json!(i))));
                for result in join_all(calls).await {
                    result.unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_tool_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_tool_call");
    let rt = Runtime::new().unwrap();
    let client = rt.block_on(async {
        let server = ServerBuilder::new("Tool Example", "1.0.0")
            .tool(Tool::new("sum"), |args, _| async move {
                let a = args["a"].as_i64().unwrap_or_default();
                let b = args["b"].as_i64().unwrap_or_default();
                Ok(CallToolResult::text((a + b).to_string()))
            })
            .build();
        let (client_end, server_end) = MemoryTransport::pair();
        server.serve(server_end).await.unwrap();
        client_builder().connect(client_end).await.unwrap()
    });

    let params = json!({"name": "sum", "arguments": {"a": 5, "b": 3}});
    group.bench_function("sum", |b| {
        b.to_async(&rt).iter(|| async {
            client
                .call("tools/call", Some(black_box(params.clone())))
                .await
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_session_call,
    bench_concurrent_calls,
    bench_tool_call,
);

criterion_main!(benches);
