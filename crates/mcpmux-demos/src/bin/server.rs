//! Run one of the example servers.
//!
//! ```bash
//! server <server-name> [stdio|sse|streamable-http]
//! ```
//!
//! Logs go to stderr (filtered by `RUST_LOG`); stdout carries the protocol.

use clap::{Parser, ValueEnum};
use mcpmux_transport::StdioTransport;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    Stdio,
    Sse,
    StreamableHttp,
}

#[derive(Parser, Debug)]
#[command(name = "server", version, about = "Run an example MCP server")]
struct Args {
    /// Example server to run.
    name: Option<String>,

    /// How to talk to the client.
    #[arg(value_enum, default_value_t = TransportKind::Stdio)]
    transport: TransportKind,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let Some(name) = args.name else {
        eprintln!("{}", mcpmux_demos::usage());
        return Ok(ExitCode::FAILURE);
    };
    let Some(server) = mcpmux_demos::server(&name) else {
        eprintln!("Error: Server '{name}' not found");
        eprintln!("{}", mcpmux_demos::usage());
        return Ok(ExitCode::FAILURE);
    };
    if args.transport != TransportKind::Stdio {
        let transport = args.transport.to_possible_value().map_or_else(
            || format!("{:?}", args.transport),
            |value| value.get_name().to_string(),
        );
        eprintln!("Error: unsupported transport '{transport}'; only stdio is available");
        return Ok(ExitCode::FAILURE);
    }

    init_logging();
    info!(server = %name, "starting on stdio");

    tokio::select! {
        result = server.run(StdioTransport::stdio()) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("interrupted");
        }
    }
    Ok(ExitCode::SUCCESS)
}
