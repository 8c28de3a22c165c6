//! Test registry - all test cases are registered here

pub mod helpers;

use crate::runner::TestCase;

/// Build and return all test cases
///
/// Tests are grouped by relay mode. Each test:
/// 1. Queues a stub upstream response (what the hosted backend or OpenAI would return)
/// 2. Sends a request to the REAL relay
/// 3. Validates the response, and where relevant the forwarded request
pub fn all_tests() -> Vec<TestCase> {
    macro_rules! test {
        ($name:expr, $desc:expr, $func:path) => {
            TestCase {
                name: $name,
                description: $desc,
                run: Box::new(|ctx| Box::pin($func(ctx))),
            }
        };
    }

    vec![
        // ── Pass-through mode ──────────────────────────────────────────────────
        test!(
            "passthrough/preflight",
            "OPTIONS preflight returns 204 with CORS headers and no body",
            passthrough::test_preflight
        ),
        test!(
            "passthrough/method_not_allowed",
            "GET and DELETE are rejected with a 405 error envelope",
            passthrough::test_method_not_allowed
        ),
        test!(
            "passthrough/body_fidelity",
            "Request body reaches the backend byte-for-byte",
            passthrough::test_body_fidelity
        ),
        test!(
            "passthrough/status_relay",
            "Upstream status codes are mirrored to the client",
            passthrough::test_status_relay
        ),
        test!(
            "passthrough/content_type_default",
            "Missing upstream Content-Type falls back to application/octet-stream",
            passthrough::test_content_type_default
        ),
        test!(
            "passthrough/authorization_forwarded",
            "Client Authorization header wins over the configured token",
            passthrough::test_authorization_forwarded
        ),
        test!(
            "passthrough/authorization_absent",
            "Configured token is attached when the client sends no credentials",
            passthrough::test_authorization_absent
        ),
        test!(
            "passthrough/streaming_relay",
            "SSE chunks are relayed incrementally and byte-identical",
            passthrough::test_streaming_relay
        ),
        test!(
            "passthrough/response_headers",
            "Success responses carry pinned cache and CORS headers",
            passthrough::test_response_headers
        ),
        test!(
            "passthrough/deterministic_relay",
            "Repeated identical requests produce identical relayed bodies",
            passthrough::test_deterministic_relay
        ),
        test!(
            "passthrough/unreachable_upstream",
            "Dead upstream yields 502 with an error envelope",
            passthrough::test_unreachable_upstream
        ),

        // ── Direct mode ────────────────────────────────────────────────────────
        test!(
            "direct/preflight",
            "OPTIONS preflight returns 204 with CORS headers in direct mode",
            direct::test_preflight
        ),
        test!(
            "direct/method_not_allowed",
            "Non-POST methods are rejected with a 405 error envelope",
            direct::test_method_not_allowed
        ),
        test!(
            "direct/missing_messages",
            "Body without messages is rejected with 400 before any provider call",
            direct::test_missing_messages
        ),
        test!(
            "direct/empty_messages",
            "Empty messages array is rejected with 400",
            direct::test_empty_messages
        ),
        test!(
            "direct/malformed_json",
            "Malformed JSON body degrades to the 400 missing-messages envelope",
            direct::test_malformed_json
        ),
        test!(
            "direct/missing_api_key",
            "Relay without an API key rejects chat requests with 500",
            direct::test_missing_api_key
        ),
        test!(
            "direct/streaming_completion",
            "Provider SSE chunks are relayed byte-exact with text/event-stream",
            direct::test_streaming_completion
        ),
        test!(
            "direct/payload_adaptation",
            "Provider receives the translated Responses payload and Bearer key",
            direct::test_payload_adaptation
        ),
        test!(
            "direct/tool_choice_default",
            "tool_choice defaults to auto and absent tools are omitted from the wire",
            direct::test_tool_choice_default
        ),
        test!(
            "direct/metadata_merge",
            "Client metadata merges over the injected app tag",
            direct::test_metadata_merge
        ),
        test!(
            "direct/provider_error_message",
            "Provider error.message surfaces in the relay error envelope",
            direct::test_provider_error_message
        ),
        test!(
            "direct/provider_error_fallback",
            "Unparseable provider error body falls back to Unknown server error",
            direct::test_provider_error_fallback
        ),
        test!(
            "direct/deterministic_stream",
            "Repeated identical chat requests produce identical streams",
            direct::test_deterministic_stream
        ),
    ]
}
