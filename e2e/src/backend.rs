//! Stub upstream server
//!
//! Stands in for both targets the relay can talk to: the deployed assistant
//! backend (POST /assistant) and the OpenAI Responses endpoint
//! (POST /v1/responses). Tests pre-configure responses via
//! SharedBackendState and inspect what the stub received.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use bytes::Bytes;
use futures::StreamExt;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::types::{BackendState, MockResponse, ReceivedRequest, SharedBackendState};

/// Fallback served by /assistant when no response is queued
fn default_assistant_response() -> MockResponse {
    MockResponse::json(r#"{"message":"stub assistant reply"}"#)
}

/// Fallback served by /v1/responses when no response is queued
fn default_responses_response() -> MockResponse {
    MockResponse::sse(&[
        "event: response.output_text.delta\ndata: {\"type\":\"response.output_text.delta\",\"delta\":\"ok\"}\n\n",
        "event: response.completed\ndata: {\"type\":\"response.completed\"}\n\n",
    ])
}

/// Handle /assistant - the pass-through target
async fn handle_assistant(
    State(state): State<SharedBackendState>,
    request: Request<Body>,
) -> Response {
    serve_queued(state, request, "/assistant", default_assistant_response).await
}

/// Handle /v1/responses - the fake OpenAI provider
async fn handle_responses(
    State(state): State<SharedBackendState>,
    request: Request<Body>,
) -> Response {
    serve_queued(state, request, "/v1/responses", default_responses_response).await
}

/// Handle GET /health
async fn handle_health() -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [("Content-Type", "application/json")],
        r#"{"status":"ok"}"#,
    )
}

/// Record the request exactly as received and serve the next queued response
async fn serve_queued(
    state: SharedBackendState,
    request: Request<Body>,
    path: &str,
    default: fn() -> MockResponse,
) -> Response {
    let method = request.method().to_string();
    let authorization = header_value(&request, "authorization");
    let content_type = header_value(&request, "content-type");
    let body = axum::body::to_bytes(request.into_body(), 10 * 1024 * 1024)
        .await
        .unwrap_or_default()
        .to_vec();

    let received = ReceivedRequest {
        method,
        path: path.to_string(),
        authorization,
        content_type,
        body,
    };

    let mock_response = {
        let mut state = state.lock().unwrap();
        state.received_requests.push(received);
        state.response_queue.pop_front().unwrap_or_else(default)
    };

    build_response(mock_response)
}

fn header_value(request: &Request<Body>, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Turn a MockResponse into an axum response
///
/// Chunked responses are streamed with a pause before each chunk so that
/// chunk boundaries survive through to the relay's reader.
fn build_response(mock: MockResponse) -> Response {
    let mut builder = Response::builder().status(mock.status);
    if let Some(ref ct) = mock.content_type {
        builder = builder.header("Content-Type", ct);
    }

    match mock.chunks {
        Some(chunks) => {
            let stream = futures::stream::iter(
                chunks
                    .into_iter()
                    .map(|chunk| Ok::<Bytes, std::io::Error>(Bytes::from(chunk))),
            )
            .then(|chunk| async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(25)).await;
                chunk
            });
            builder
                .body(Body::from_stream(stream))
                .unwrap()
                .into_response()
        }
        None => builder.body(Body::from(mock.body)).unwrap().into_response(),
    }
}

/// Start the stub upstream server and return the shared state handle
pub async fn start(port: u16) -> anyhow::Result<SharedBackendState> {
    let state: SharedBackendState =
        std::sync::Arc::new(std::sync::Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/assistant", any(handle_assistant))
        .route("/v1/responses", any(handle_responses))
        .route("/health", any(handle_health))
        .with_state(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind stub upstream to {}: {}", addr, e))?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub upstream server failed");
    });

    // Brief pause to let the server start accepting connections
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    Ok(state)
}

/// Helper to configure the next response
pub fn queue_response(state: &SharedBackendState, response: MockResponse) {
    state.lock().unwrap().response_queue.push_back(response);
}

/// Helper to get all requests received since last clear
pub fn drain_requests(state: &SharedBackendState) -> Vec<ReceivedRequest> {
    let mut s = state.lock().unwrap();
    s.received_requests.drain(..).collect()
}

/// Reset both the queue and the request log between tests
pub fn reset(state: &SharedBackendState) {
    let mut s = state.lock().unwrap();
    s.response_queue.clear();
    s.received_requests.clear();
}
