// OpenAI-compatible chat completions client

use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("failed to send chat request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("stream error: {0}")]
    Stream(#[source] reqwest::Error),
    #[error("failed to parse streaming response: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// Text carried by this chunk, if any
    pub fn delta_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}

/// Extract the payload of one SSE line. Returns None for blank lines and
/// non-data fields (event:, id:, comments).
fn parse_sse_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.strip_prefix("data:").map(str::trim_start)
}

impl ChatClient {
    pub fn new(base_url: String, api_key: String, request_timeout: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Stream a chat completion. The returned stream yields one `ChatChunk`
    /// per SSE data line and ends on the `[DONE]` sentinel or when the server
    /// closes the connection.
    pub async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatChunk, ApiError>> + Send>>, ApiError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ApiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        // Stateful stream that buffers incomplete lines between network reads
        let stream = futures::stream::unfold(
            (response.bytes_stream(), Vec::new()),
            |(mut byte_stream, mut buffer)| async move {
                loop {
                    // Hand out the next complete line from the buffer
                    if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let mut line = buffer.split_off(pos + 1);
                        std::mem::swap(&mut buffer, &mut line);
                        // 'line' now holds the bytes up to the newline

                        let text = String::from_utf8_lossy(&line);
                        let Some(data) = parse_sse_line(&text) else {
                            continue;
                        };
                        if data == DONE_SENTINEL {
                            return None;
                        }
                        let result =
                            serde_json::from_str::<ChatChunk>(data).map_err(ApiError::Parse);
                        return Some((result, (byte_stream, buffer)));
                    }

                    match byte_stream.next().await {
                        Some(Ok(bytes)) => {
                            buffer.extend_from_slice(&bytes);
                        }
                        Some(Err(e)) => {
                            return Some((Err(ApiError::Stream(e)), (byte_stream, buffer)));
                        }
                        None => {
                            // Connection closed; a final data line may lack
                            // its trailing newline
                            let text = String::from_utf8_lossy(&buffer).into_owned();
                            buffer.clear();
                            match parse_sse_line(&text) {
                                Some(data) if data != DONE_SENTINEL => {
                                    let result = serde_json::from_str::<ChatChunk>(data)
                                        .map_err(ApiError::Parse);
                                    return Some((result, (byte_stream, buffer)));
                                }
                                _ => return None,
                            }
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}
