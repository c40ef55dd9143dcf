//! # Tool Call Handlers
//!
//! When a run stops with `requires_action`, every requested function call is
//! handed to a [`ToolCallHandler`]. Calls are resolved concurrently and the
//! outputs submitted as one batch, in request order.
//!
//! - [`EmptyOutputHandler`]: answers every call with an empty string
//! - [`CaseLookupHandler`]: answers `lookup_case` with the case name and page path

use std::fmt;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::cases::slug::slug_to_case_name;
use crate::gateway::{ToolCall, ToolOutput};

/// A tool call that could not be answered. Fails the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError(pub String);

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tool error: {}", self.0)
    }
}

impl std::error::Error for ToolError {}

#[async_trait]
pub trait ToolCallHandler: Send + Sync {
    /// Produces the output string for one call.
    async fn handle(&self, call: &ToolCall) -> Result<String, ToolError>;
}

pub struct EmptyOutputHandler;

#[async_trait]
impl ToolCallHandler for EmptyOutputHandler {
    async fn handle(&self, call: &ToolCall) -> Result<String, ToolError> {
        debug!("Answering tool call {} ({}) with empty output", call.id, call.name);
        Ok(String::new())
    }
}

pub struct CaseLookupHandler;

#[derive(Deserialize)]
struct LookupArgs {
    slug: String,
}

#[async_trait]
impl ToolCallHandler for CaseLookupHandler {
    async fn handle(&self, call: &ToolCall) -> Result<String, ToolError> {
        match call.name.as_str() {
            "lookup_case" => {
                let args: LookupArgs = serde_json::from_str(&call.arguments)
                    .map_err(|e| ToolError(format!("bad arguments for {}: {}", call.name, e)))?;
                let name = slug_to_case_name(&args.slug);
                debug!("lookup_case {} -> {}", args.slug, name);
                Ok(serde_json::json!({
                    "name": name,
                    "path": format!("/cases/{}", args.slug),
                })
                .to_string())
            }
            other => {
                warn!("Unknown tool requested: {}", other);
                Ok(serde_json::json!({ "error": format!("Unknown tool: {}", other) }).to_string())
            }
        }
    }
}

/// Resolves every call concurrently. Outputs keep the order and ids of
/// `calls`; the first failure rejects the whole batch.
pub async fn resolve_all(
    handler: &dyn ToolCallHandler,
    calls: &[ToolCall],
) -> Result<Vec<ToolOutput>, ToolError> {
    info!("Resolving {} tool call(s)", calls.len());
    try_join_all(calls.iter().map(|call| async move {
        let output = handler.handle(call).await?;
        Ok::<_, ToolError>(ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        })
    }))
    .await
}
