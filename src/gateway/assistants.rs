//! HTTP gateway for the hosted assistant.
//!
//! Talks to the assistant proxy routes:
//! - `POST {base}/threads` → `{"threadId": "..."}`
//! - `POST {base}/threads/{id}/messages` → run event stream
//! - `POST {base}/threads/{id}/actions` → run event stream (after tool outputs)

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use super::decoder::StreamDecoder;
use super::provider::{GatewayError, ThreadGateway};
use super::types::{StreamEvent, ThreadId, ToolOutput};

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000/api/assistants";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateThreadResponse {
    thread_id: String,
}

#[derive(Serialize, Debug)]
struct PostMessageRequest<'a> {
    content: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SubmitActionRequest<'a> {
    run_id: &'a str,
    tool_call_outputs: &'a [ToolOutput],
}

pub struct AssistantsGateway {
    base_url: String,
    client: reqwest::Client,
}

impl AssistantsGateway {
    /// Creates a gateway client rooted at `base_url` (no trailing slash needed).
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Sends a JSON POST and maps non-success statuses to `GatewayError::Api`.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, GatewayError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GatewayError::Config(format!(
                "gateway URL must be http(s): {}",
                self.base_url
            )));
        }
        let url = format!("{}{}", self.base_url, path);
        debug!("Gateway POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        debug!("Gateway response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gateway error: {} - {}", status, err_body);
            return Err(GatewayError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    /// Decodes the response body into events and forwards them in order.
    async fn pump(
        &self,
        mut response: reqwest::Response,
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError> {
        let mut decoder = StreamDecoder::new();
        let mut event_count = 0usize;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?
        {
            debug!("Raw chunk received: {} bytes", chunk.len());
            decoder.feed(&chunk);
            // Events of earlier lines go out before a malformed line fails the stream.
            while let Some(line) = decoder.next_line() {
                for event in line? {
                    event_count += 1;
                    if sender.send(event).await.is_err() {
                        warn!("Stream event send failed: receiver dropped");
                        return Err(GatewayError::ChannelClosed);
                    }
                }
            }
        }

        for event in decoder.finish()? {
            event_count += 1;
            if sender.send(event).await.is_err() {
                warn!("Stream event send failed: receiver dropped");
                return Err(GatewayError::ChannelClosed);
            }
        }

        info!("Stream ended: {} events", event_count);
        Ok(())
    }
}

#[async_trait]
impl ThreadGateway for AssistantsGateway {
    fn name(&self) -> &str {
        "assistants"
    }

    async fn create_thread(&self) -> Result<ThreadId, GatewayError> {
        let response = self.post_json("/threads", &serde_json::json!({})).await?;
        let body: CreateThreadResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("thread creation response: {e}")))?;
        info!("Created thread {}", body.thread_id);
        Ok(ThreadId::new(body.thread_id))
    }

    async fn post_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError> {
        info!("Posting message to thread {} ({} bytes)", thread_id, text.len());
        let response = self
            .post_json(
                &format!("/threads/{thread_id}/messages"),
                &PostMessageRequest { content: text },
            )
            .await?;
        self.pump(response, sender).await
    }

    async fn post_tool_outputs(
        &self,
        thread_id: &ThreadId,
        run_id: &str,
        outputs: &[ToolOutput],
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError> {
        info!(
            "Submitting {} tool output(s) for run {} on thread {}",
            outputs.len(),
            run_id,
            thread_id
        );
        let response = self
            .post_json(
                &format!("/threads/{thread_id}/actions"),
                &SubmitActionRequest {
                    run_id,
                    tool_call_outputs: outputs,
                },
            )
            .await?;
        self.pump(response, sender).await
    }
}
