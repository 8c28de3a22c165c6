//! HTTP helpers that drive the relay the way the browser app would

use futures::StreamExt;

use crate::types::{RelayResponse, SseEvent, StreamingResponse};

/// Build the shared HTTP client used by all tests
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
}

fn assistant_url(relay_addr: &str) -> String {
    format!("http://{}/api/assistant", relay_addr)
}

/// POST an opaque body and collect the full response
pub async fn post_buffered(
    client: &reqwest::Client,
    relay_addr: &str,
    body: Vec<u8>,
    authorization: Option<&str>,
) -> anyhow::Result<RelayResponse> {
    let mut request = client
        .post(assistant_url(relay_addr))
        .header("Content-Type", "application/json")
        .body(body);
    if let Some(auth) = authorization {
        request = request.header("Authorization", auth);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(RelayResponse {
        status,
        headers,
        body,
    })
}

/// POST a JSON payload and collect the streamed response, preserving the
/// chunk boundaries as they came off the wire
pub async fn post_streaming(
    client: &reqwest::Client,
    relay_addr: &str,
    body: &serde_json::Value,
) -> anyhow::Result<StreamingResponse> {
    let response = client
        .post(assistant_url(relay_addr))
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();

    let mut chunks: Vec<Vec<u8>> = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?.to_vec());
    }

    let text = String::from_utf8_lossy(&chunks.concat()).to_string();
    let events = parse_sse(&text);

    Ok(StreamingResponse {
        status,
        headers,
        chunks,
        events,
    })
}

/// Issue a bodyless request with an arbitrary method
pub async fn send_method(
    client: &reqwest::Client,
    relay_addr: &str,
    method: reqwest::Method,
) -> anyhow::Result<RelayResponse> {
    let response = client
        .request(method, assistant_url(relay_addr))
        .send()
        .await?;

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(RelayResponse {
        status,
        headers,
        body,
    })
}

/// Parse an SSE body into its events
///
/// Events are separated by blank lines; each data line carries a "data: "
/// prefix. The terminal [DONE] marker becomes an event with is_done set.
pub fn parse_sse(text: &str) -> Vec<SseEvent> {
    let mut events = Vec::new();

    for block in text.split("\n\n") {
        for line in block.lines() {
            if let Some(data) = line.strip_prefix("data: ") {
                let data = data.trim();
                if data == "[DONE]" {
                    events.push(SseEvent {
                        data: data.to_string(),
                        is_done: true,
                    });
                } else if !data.is_empty() {
                    events.push(SseEvent {
                        data: data.to_string(),
                        is_done: false,
                    });
                }
            }
        }
    }

    events
}
