use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::{StreamEvent, ThreadId, ToolOutput};

/// Errors that can occur while talking to the thread gateway.
#[derive(Debug)]
pub enum GatewayError {
    /// Gateway misconfigured (bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused, stream cut off).
    Network(String),
    /// Gateway returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the gateway's response or a stream line.
    Parse(String),
    /// The event channel was closed (the state machine dropped the receiver).
    ChannelClosed,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Config(msg) => write!(f, "config error: {msg}"),
            GatewayError::Network(msg) => write!(f, "network error: {msg}"),
            GatewayError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            GatewayError::Parse(msg) => write!(f, "parse error: {msg}"),
            GatewayError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for GatewayError {}

/// The hosted assistant, seen from the client: threads plus streamed runs.
///
/// Both streaming calls push decoded events into `sender` in gateway order and
/// return once the underlying stream closes. A transport failure ends the call
/// with an error; events already sent stay sent.
#[async_trait]
pub trait ThreadGateway: Send + Sync {
    /// Returns the name of the gateway implementation.
    fn name(&self) -> &str;

    async fn create_thread(&self) -> Result<ThreadId, GatewayError>;

    /// Adds a user message to the thread and streams the resulting run.
    async fn post_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError>;

    /// Submits tool outputs for a run that required action and streams its continuation.
    async fn post_tool_outputs(
        &self,
        thread_id: &ThreadId,
        run_id: &str,
        outputs: &[ToolOutput],
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError>;
}
