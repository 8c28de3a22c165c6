//! assistant-relay e2e test runner
//!
//! Default (no args): spawns one relay instance per scenario against a stub
//! upstream, runs all tests, kills them.
//!
//!   cargo run                          # auto-detect relay binary, run all tests
//!   cargo run -- list                  # list all tests
//!   cargo run -- --filter direct/      # run a subset

mod backend;
mod client;
mod runner;
mod tests;
mod types;

use clap::{Parser, Subcommand};
use colored::Colorize;
use runner::{list_tests, run_tests, TestContext};
use tests::all_tests;

/// Default relay binary candidates, tried in order
const DEFAULT_RELAY_BINS: &[&str] =
    &["../target/release/assistant-relay", "../target/debug/assistant-relay"];

/// Stub upstream port - serves both the hosted backend and the provider paths
const BACKEND_PORT: u16 = 18180;

const PASSTHROUGH_PORT: u16 = 18181;
const DIRECT_PORT: u16 = 18182;
const DIRECT_NOKEY_PORT: u16 = 18183;
const UNREACHABLE_PORT: u16 = 18184;

/// One relay instance per scenario: (config file, listen port)
///
/// Ports must match the config files; the configs point at BACKEND_PORT
/// (except the unreachable one, which points at a dead port on purpose).
const RELAY_INSTANCES: &[(&str, u16)] = &[
    ("test_configs/passthrough.yaml", PASSTHROUGH_PORT),
    ("test_configs/direct.yaml", DIRECT_PORT),
    ("test_configs/direct_nokey.yaml", DIRECT_NOKEY_PORT),
    ("test_configs/passthrough_unreachable.yaml", UNREACHABLE_PORT),
];

#[derive(Parser)]
#[command(
    name = "e2e",
    about = "End-to-end tests for assistant-relay",
    long_about = "Runs all e2e tests by default (no arguments needed).\n\
                  Spawns one relay per scenario automatically, runs tests, then kills them."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Only run tests whose name contains this string
    #[arg(long, short, global = true)]
    filter: Option<String>,

    /// Path to the assistant-relay binary (default: try release, then debug)
    #[arg(long, global = true)]
    relay_bin: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List all available tests
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::List) => {
            list_tests(&all_tests());
            Ok(())
        }

        // ── No subcommand: default full run ──────────────────────────────────
        None => {
            let relay_bin = match cli.relay_bin {
                Some(p) => p,
                None => find_relay_bin()?,
            };
            spawn_and_run(relay_bin, cli.filter).await
        }
    }
}

/// Boot the stub upstream and all relay instances, run the suite, tear down
async fn spawn_and_run(relay_bin: String, filter: Option<String>) -> anyhow::Result<()> {
    println!("Starting stub upstream on port {}...", BACKEND_PORT);
    let backend_state = backend::start(BACKEND_PORT).await?;
    println!("Stub upstream running on 127.0.0.1:{}", BACKEND_PORT);

    let mut relays = Vec::new();
    for (config, port) in RELAY_INSTANCES {
        relays.push(spawn_relay(&relay_bin, config, *port).await?);
    }
    println!("All relay instances are ready!\n");

    let ctx = TestContext {
        passthrough_addr: format!("127.0.0.1:{}", PASSTHROUGH_PORT),
        direct_addr: format!("127.0.0.1:{}", DIRECT_PORT),
        direct_nokey_addr: format!("127.0.0.1:{}", DIRECT_NOKEY_PORT),
        unreachable_addr: format!("127.0.0.1:{}", UNREACHABLE_PORT),
        backend_state,
        http_client: client::build_client(),
    };

    let results = run_tests(all_tests(), ctx, filter.as_deref()).await;

    for mut relay in relays {
        relay.kill().await.ok();
    }

    exit_on_failure(&results);
    Ok(())
}

/// Spawn one relay instance and wait until its /health answers
async fn spawn_relay(
    bin: &str,
    config: &str,
    port: u16,
) -> anyhow::Result<tokio::process::Child> {
    println!("Spawning relay: {} run --config {}", bin, config);
    let child = tokio::process::Command::new(bin)
        .arg("run")
        .arg("--config")
        .arg(config)
        // The host environment must not override the test configs
        .env_remove("BACKEND_ASSISTANT_URL")
        .env_remove("BACKEND_TOKEN")
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL")
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", bin, e))?;

    let addr = format!("127.0.0.1:{}", port);
    wait_for_relay(&addr).await?;
    Ok(child)
}

/// Find the relay binary, trying release then debug builds
fn find_relay_bin() -> anyhow::Result<String> {
    for candidate in DEFAULT_RELAY_BINS {
        if std::path::Path::new(candidate).exists() {
            println!("Using relay binary: {}", candidate.bright_cyan());
            return Ok(candidate.to_string());
        }
    }
    Err(anyhow::anyhow!(
        "No relay binary found. Tried: {}\nBuild with: cd .. && cargo build --release",
        DEFAULT_RELAY_BINS.join(", ")
    ))
}

/// Exit with code 1 if any tests failed
fn exit_on_failure(results: &[crate::types::TestResult]) {
    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        std::process::exit(1);
    }
}

/// Wait for a relay to start accepting connections (retry with backoff)
async fn wait_for_relay(addr: &str) -> anyhow::Result<()> {
    let client = client::build_client();
    let health_url = format!("http://{}/health", addr);

    for attempt in 0..30 {
        tokio::time::sleep(tokio::time::Duration::from_millis(200 + attempt * 100)).await;
        if client.get(&health_url).send().await.is_ok() {
            return Ok(());
        }
    }

    Err(anyhow::anyhow!(
        "Relay did not start within timeout. Is the binary correct? Check: {}",
        addr
    ))
}
