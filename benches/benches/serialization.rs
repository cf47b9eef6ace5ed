//! Benchmarks for JSON-RPC message encoding and frame parsing.
//!
//! Run with: `cargo bench --package mcpmux-benches --bench serialization`

// Allow missing docs for criterion_group! macro generated functions
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mcpmux_core::{
    protocol::{Message, Notification, Request, RequestId, Response},
    types::{CallToolResult, Tool},
};
use serde_json::{Value, json};

fn minimal_request() -> Message {
    Request::with_params("tools/call", RequestId::Number(1), json!({"name": "sum"})).into()
}

fn complex_request() -> Message {
    Request::with_params(
        "tools/call",
        RequestId::String("req-12345".into()),
        json!({
            "name": "long_running_task",
            "arguments": {
                "task_name": "reindex",
                "steps": 50,
                "options": {
                    "limit": 100,
                    "fields": ["id", "name", "email", "created_at", "updated_at"]
                }
            },
            "_meta": {"progressToken": "abc123"}
        }),
    )
    .into()
}

fn progress_notification() -> Message {
    Notification::with_params(
        "notifications/progress",
        json!({"progressToken": "abc123", "progress": 0.5, "total": 1.0, "message": "Step 25/50"}),
    )
    .into()
}

fn large_response() -> Message {
    let content: Vec<Value> = (0..100)
        .map(|i| json!({"type": "text", "text": format!("Result item {i} with enough text to look like real output")}))
        .collect();
    Response::success(RequestId::Number(99999), json!({"content": content, "isError": false})).into()
}

fn tool_definition() -> Tool {
    Tool::new("get_weather")
        .description("Get weather for a city.")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "unit": {"type": "string", "default": "celsius"}
            },
            "required": ["city"]
        }))
}

fn bench_message_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_encode");
    group.throughput(Throughput::Elements(1));

    for (name, message) in [
        ("minimal_request", minimal_request()),
        ("complex_request", complex_request()),
        ("progress", progress_notification()),
        ("large_response", large_response()),
    ] {
        group.bench_with_input(BenchmarkId::new(name, "to_string"), &message, |b, msg| {
            b.iter(|| serde_json::to_string(black_box(msg)).unwrap());
        });
    }

    group.finish();
}

fn bench_message_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_parse");

    for (name, message) in [
        ("minimal_request", minimal_request()),
        ("complex_request", complex_request()),
        ("progress", progress_notification()),
        ("large_response", large_response()),
    ] {
        let frame = serde_json::to_vec(&message).unwrap();
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, frame.len()), &frame, |b, frame| {
            b.iter(|| Message::parse(black_box(frame)).unwrap());
        });
    }

    group.finish();
}

fn bench_tool_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("tool_serialization");

    let tool = tool_definition();
    let result = CallToolResult::text("Weather in London: 22degreesC");

    group.bench_with_input(BenchmarkId::new("tool", "to_string"), &tool, |b, t| {
        b.iter(|| serde_json::to_string(black_box(t)).unwrap());
    });

    group.bench_with_input(BenchmarkId::new("result", "to_string"), &result, |b, r| {
        b.iter(|| serde_json::to_string(black_box(r)).unwrap());
    });

    let tool_json = serde_json::to_string(&tool).unwrap();
    group.bench_with_input(BenchmarkId::new("tool", "from_str"), &tool_json, |b, json| {
        b.iter(|| serde_json::from_str::<Tool>(black_box(json)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_message_encode,
    bench_message_parse,
    bench_tool_serialization,
);

criterion_main!(benches);
