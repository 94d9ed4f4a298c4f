//! `bridge-cli`: the command-line surface over the request engine (spec
//! §2 L7). Parses one tool invocation, runs it against a backend, and prints
//! the shared `{ok, action, …}` envelope to stdout — non-zero exit on
//! handler failure, matching spec §4's "CLI surface" contract.

mod args;
mod dispatch;

use std::sync::Arc;

use clap::Parser;

use args::Cli;
use bridge_backend::mock::MockBackend;
use bridge_backend::Backend;
use bridge_server::{BridgeConfig, Server};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    if !cli.mock {
        anyhow::bail!(
            "no platform backend is built into this binary yet; pass --mock to run against \
             the in-memory fixture backend"
        );
    }

    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
    let server = Server::new(backend, BridgeConfig::default());

    let value = dispatch::run(&server, cli.command)?;
    let ok = value.get("ok").and_then(serde_json::Value::as_bool).unwrap_or(true);

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{value}");
    }

    if ok {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
