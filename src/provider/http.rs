//! Shared HTTP client, SSE parsing and status mapping.

use std::sync::OnceLock;

use crate::error::StatecraftError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))?;
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Splits a byte stream into lines, decoding only complete lines so a
/// multibyte character split across network chunks stays intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line without its terminator, if one is buffered.
    pub fn next_line(&mut self) -> Option<Result<String, StatecraftError>> {
        let end = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=end).collect();
        Some(
            String::from_utf8(line)
                .map(|l| l.trim_end_matches(['\r', '\n']).to_string())
                .map_err(|e| StatecraftError::Stream(format!("invalid UTF-8 in stream: {e}"))),
        )
    }
}

/// Wrap a transport error without the request URL, which may carry secrets.
pub fn network_error(err: reqwest::Error) -> StatecraftError {
    StatecraftError::Network(err.without_url())
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> StatecraftError {
    match status {
        401 | 403 => StatecraftError::Authentication(body.to_string()),
        429 => StatecraftError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => StatecraftError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
