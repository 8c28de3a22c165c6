//! Shared types for the e2e test framework

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A response the stub upstream will serve for the next request
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    /// None means the stub sends no Content-Type header at all
    pub content_type: Option<String>,
    /// When set, the body is written as these chunks with a short pause
    /// between them so the relay observes genuinely incremental delivery
    pub chunks: Option<Vec<String>>,
}

impl MockResponse {
    /// A 200 JSON response
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: Some("application/json".to_string()),
            chunks: None,
        }
    }

    /// An error response with a JSON body
    pub fn error(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: Some("application/json".to_string()),
            chunks: None,
        }
    }

    /// An arbitrary response, optionally without a Content-Type header
    pub fn raw(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: content_type.map(|ct| ct.to_string()),
            chunks: None,
        }
    }

    /// A 200 SSE response streamed chunk by chunk
    pub fn sse(chunks: &[&str]) -> Self {
        Self {
            status: 200,
            body: chunks.concat(),
            content_type: Some("text/event-stream".to_string()),
            chunks: Some(chunks.iter().map(|c| c.to_string()).collect()),
        }
    }
}

/// Shared state for the stub upstream server
#[derive(Debug, Default)]
pub struct BackendState {
    /// Queue of responses to serve - tests push, the stub pops per request
    pub response_queue: VecDeque<MockResponse>,
    /// All requests received by the stub (for inspection)
    pub received_requests: Vec<ReceivedRequest>,
}

pub type SharedBackendState = Arc<Mutex<BackendState>>;

/// A request received by the stub upstream
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    /// Raw body bytes, untouched
    pub body: Vec<u8>,
}

impl ReceivedRequest {
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn body_json(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// A parsed SSE event
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub data: String,
    pub is_done: bool,
}

impl SseEvent {
    pub fn parse_json(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

/// A buffered (non-streaming) relay response
#[derive(Debug)]
pub struct RelayResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub body: Vec<u8>,
}

impl RelayResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn body_json(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The `error` field of a JSON envelope body, if present
    pub fn error_field(&self) -> Option<String> {
        let json = self.body_json().ok()?;
        json.get("error")?.as_str().map(|s| s.to_string())
    }
}

/// A relayed streaming response with chunk boundaries as received
#[derive(Debug)]
pub struct StreamingResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub chunks: Vec<Vec<u8>>,
    pub events: Vec<SseEvent>,
}

impl StreamingResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All chunks concatenated, exactly as the wire delivered them
    pub fn raw_body(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.raw_body()).to_string()
    }

    /// Events that carry data (everything except the [DONE] marker)
    pub fn data_events(&self) -> Vec<&SseEvent> {
        self.events.iter().filter(|e| !e.is_done).collect()
    }

    pub fn has_done_marker(&self) -> bool {
        self.events.iter().any(|e| e.is_done)
    }
}

/// Result of a single test case
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
