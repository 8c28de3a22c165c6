//! Common test helpers and JSON builders

use serde_json::{json, Value};

// ─── Fixture constants ───────────────────────────────────────────────────────
// These mirror the values in e2e/test_configs/*.yaml. Change both together.

/// Backend token configured for the pass-through relay instance
pub const BACKEND_TOKEN: &str = "e2e-backend-token";

/// API key configured for the direct relay instance
pub const PROVIDER_API_KEY: &str = "sk-e2e-test-key";

/// Model configured for the direct relay instance
pub const PROVIDER_MODEL: &str = "relay-test-model";

// ─── Request builders ────────────────────────────────────────────────────────

/// Build a minimal valid chat request
pub fn chat_request(prompt: &str) -> Value {
    json!({
        "messages": [{"role": "user", "content": prompt}]
    })
}

/// Build a chat request exercising every optional field
pub fn full_chat_request(prompt: &str) -> Value {
    json!({
        "messages": [
            {"role": "system", "content": "You are a mortgage assistant"},
            {"role": "user", "content": prompt}
        ],
        "tools": [{
            "type": "function",
            "name": "lookup_rates",
            "parameters": {
                "type": "object",
                "properties": {"term_years": {"type": "integer"}}
            }
        }],
        "toolChoice": "required",
        "metadata": {"tenant": "acme", "session": "s-123"}
    })
}

// ─── Response builders ────────────────────────────────────────────────────────

/// Canonical chunk set for the fake provider
///
/// Three chunks so order and incremental delivery are observable.
pub fn provider_sse_chunks() -> Vec<&'static str> {
    vec![
        "event: response.output_text.delta\ndata: {\"type\":\"response.output_text.delta\",\"delta\":\"Hel\"}\n\n",
        "event: response.output_text.delta\ndata: {\"type\":\"response.output_text.delta\",\"delta\":\"lo\"}\n\n",
        "event: response.completed\ndata: {\"type\":\"response.completed\"}\n\n",
    ]
}

/// Canonical chunk set for the stub assistant backend, chat-completions style
/// with a terminal [DONE] marker
pub fn backend_sse_chunks() -> Vec<&'static str> {
    vec![
        "data: {\"choices\":[{\"delta\":{\"content\":\"One\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Two\"}}]}\n\n",
        "data: [DONE]\n\n",
    ]
}

/// Provider error body in the shape the Responses API uses
pub fn provider_error_body(message: &str) -> String {
    json!({
        "error": {
            "message": message,
            "type": "invalid_request_error"
        }
    })
    .to_string()
}

// ─── Assertion helpers ────────────────────────────────────────────────────────

/// Assert that a string is valid JSON, return parsed value
pub fn assert_valid_json(s: &str, label: &str) -> anyhow::Result<Value> {
    serde_json::from_str(s).map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}\nContent: {}", label, e, s))
}

/// Assert two strings are equal, with context on failure
pub fn assert_eq_str(actual: &str, expected: &str, label: &str) -> anyhow::Result<()> {
    if actual != expected {
        Err(anyhow::anyhow!("{label}: expected {:?} but got {:?}", expected, actual))
    } else {
        Ok(())
    }
}

/// Assert condition is true, with message
pub fn assert_true(cond: bool, msg: &str) -> anyhow::Result<()> {
    if !cond {
        Err(anyhow::anyhow!("{}", msg))
    } else {
        Ok(())
    }
}
