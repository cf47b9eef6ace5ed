//! Benchmarks for mcpmux.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench --package mcpmux-benches
//! cargo bench --package mcpmux-benches --bench serialization
//! cargo bench --package mcpmux-benches --bench session -- --sample-size 10
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports.
//!
//! ## Benchmark Groups
//!
//! ### Serialization (`benches/serialization.rs`)
//! - `message_encode`: requests, responses and notifications to JSON
//! - `message_parse`: `Message::parse` on wire frames, validation included
//! - `tool_serialization`: tool definitions and results
//!
//! ### Session (`benches/session.rs`)
//! - `session_call`: one `call` answered over a `MemoryTransport`
//! - `session_concurrent_calls`: batches of calls in flight at once
//! - `session_tool_call`: `tools/call` through a full server registry

// This is a benchmark-only crate, no library code needed.
