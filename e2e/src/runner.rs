//! Test runner - executes tests and reports results

use colored::Colorize;
use std::time::Instant;

use crate::backend;
use crate::types::{SharedBackendState, TestResult};

/// A single test case
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub run: Box<
        dyn Fn(TestContext) -> std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>> + Send + Sync,
    >,
}

/// Context passed to each test
///
/// One stub upstream serves all relay instances; each instance pins one
/// configuration the suite exercises.
#[derive(Clone)]
pub struct TestContext {
    /// Relay in pass-through mode, pointed at the stub /assistant
    pub passthrough_addr: String,
    /// Relay in direct mode with an API key, pointed at the stub /v1
    pub direct_addr: String,
    /// Relay in direct mode without an API key
    pub direct_nokey_addr: String,
    /// Relay in pass-through mode pointed at a dead port
    pub unreachable_addr: String,
    pub backend_state: SharedBackendState,
    pub http_client: reqwest::Client,
}

/// Run all provided test cases sequentially and report results
pub async fn run_tests(cases: Vec<TestCase>, ctx: TestContext, filter: Option<&str>) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut passed = 0;
    let mut failed = 0;

    println!("\n{}", "═══════════════════════════════════════════════════".bright_blue());
    println!("{}", "  assistant-relay End-to-End Tests".bright_white().bold());
    println!("{}", "═══════════════════════════════════════════════════".bright_blue());
    println!("  Pass-through: {}", ctx.passthrough_addr.bright_cyan());
    println!("  Direct:       {}", ctx.direct_addr.bright_cyan());

    // Filter tests if requested
    let cases_to_run: Vec<&TestCase> = if let Some(f) = filter {
        cases.iter().filter(|c| c.name.contains(f)).collect()
    } else {
        cases.iter().collect()
    };

    println!("  Running: {} test(s)\n", cases_to_run.len().to_string().bright_cyan());

    for case in &cases_to_run {
        // Reset stub state before each test
        backend::reset(&ctx.backend_state);

        let start = Instant::now();
        print!("  {} {} ... ", "▶".bright_blue(), case.name.bright_white());

        let ctx_clone = ctx.clone();
        let fut = (case.run)(ctx_clone);
        let result = fut.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let test_result = match result {
            Ok(()) => {
                println!("{} ({duration_ms}ms)", "PASS".bright_green().bold());
                passed += 1;
                TestResult {
                    name: case.name.to_string(),
                    passed: true,
                    error: None,
                    duration_ms,
                }
            }
            Err(e) => {
                println!("{} ({duration_ms}ms)", "FAIL".bright_red().bold());
                println!("    {} {}", "Error:".bright_red(), e);
                // Print cause chain
                let mut src = e.source();
                while let Some(cause) = src {
                    println!("    {} {}", "Caused by:".yellow(), cause);
                    src = cause.source();
                }
                failed += 1;
                TestResult {
                    name: case.name.to_string(),
                    passed: false,
                    error: Some(e.to_string()),
                    duration_ms,
                }
            }
        };

        results.push(test_result);
    }

    println!("\n{}", "───────────────────────────────────────────────────".bright_blue());
    let summary = format!("  Results: {} passed, {} failed", passed, failed);
    if failed == 0 {
        println!("{}", summary.bright_green().bold());
    } else {
        println!("{}", summary.bright_red().bold());
    }
    println!("{}\n", "═══════════════════════════════════════════════════".bright_blue());

    results
}

/// Helper to list all available tests
pub fn list_tests(cases: &[TestCase]) {
    println!("\n{}", "Available tests:".bright_white().bold());
    for case in cases {
        println!("  {} - {}", case.name.bright_cyan(), case.description);
    }
    println!();
}
