//! Assistant run stream decoding.
//!
//! The gateway forwards the hosted assistant's event stream as newline-delimited
//! JSON envelopes (`{"event": "...", "data": {...}}`). Server-sent-event framing
//! (`event: ...` / `data: ...` line pairs) is accepted too.
//!
//! The wire protocol only reports deltas; "created" events are synthesized the
//! first time a content part or tool call index is seen.
//!
//! ```text
//! bytes ──feed()──▶ lines ──next_line()──▶ envelopes ──▶ StreamEvent*
//! ```
//!
//! Lines are decoded one at a time so a malformed line never takes the events
//! of the lines before it down with it.

use std::collections::HashSet;

use log::{debug, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::provider::GatewayError;
use super::types::{Annotation, FileRef, StreamEvent, ToolCall, ToolKind};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Deserialize, Debug)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// `thread.message.delta`
#[derive(Deserialize, Debug)]
struct MessageDeltaEvent {
    id: String,
    #[serde(default)]
    delta: MessageDeltaBody,
}

#[derive(Deserialize, Debug, Default)]
struct MessageDeltaBody {
    #[serde(default)]
    content: Vec<ContentDelta>,
}

#[derive(Deserialize, Debug)]
struct ContentDelta {
    index: u32,
    #[serde(rename = "type")]
    part_type: String,
    #[serde(default)]
    text: Option<TextDeltaBody>,
}

#[derive(Deserialize, Debug)]
struct TextDeltaBody {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    annotations: Option<Vec<Annotation>>,
}

/// `thread.message.completed`
#[derive(Deserialize, Debug)]
struct MessageCompletedEvent {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageFile {
        image_file: FileRef,
    },
    #[serde(other)]
    Other,
}

/// `thread.run.step.delta`
#[derive(Deserialize, Debug)]
struct RunStepDeltaEvent {
    id: String,
    #[serde(default)]
    delta: RunStepDeltaBody,
}

#[derive(Deserialize, Debug, Default)]
struct RunStepDeltaBody {
    #[serde(default)]
    step_details: Option<StepDetailsDelta>,
}

#[derive(Deserialize, Debug)]
struct StepDetailsDelta {
    #[serde(default)]
    tool_calls: Vec<ToolCallDeltaBody>,
}

#[derive(Deserialize, Debug)]
struct ToolCallDeltaBody {
    index: u32,
    #[serde(rename = "type")]
    kind: ToolKind,
    #[serde(default)]
    code_interpreter: Option<CodeInterpreterDelta>,
}

#[derive(Deserialize, Debug)]
struct CodeInterpreterDelta {
    #[serde(default)]
    input: Option<String>,
}

/// `thread.run.requires_action`
#[derive(Deserialize, Debug)]
struct RequiresActionEvent {
    id: String,
    required_action: RequiredAction,
}

#[derive(Deserialize, Debug)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Deserialize, Debug)]
struct SubmitToolOutputs {
    #[serde(default)]
    tool_calls: Vec<RequiredToolCall>,
}

#[derive(Deserialize, Debug)]
struct RequiredToolCall {
    id: String,
    function: FunctionCall,
}

#[derive(Deserialize, Debug)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn parse<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, GatewayError> {
    serde_json::from_value(data).map_err(|e| GatewayError::Parse(format!("{event}: {e}")))
}

// ============================================================================
// Decoder
// ============================================================================

/// Incremental decoder for one run stream. Feed it chunks in arrival order.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    /// Pending `event:` line when the stream uses SSE framing.
    sse_event: Option<String>,
    /// (message id, content index) pairs already announced with `TextCreated`.
    text_parts: HashSet<(String, u32)>,
    /// (run step id, tool call index) pairs already announced with `ToolCallCreated`.
    tool_calls: HashSet<(String, u32)>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers a chunk. Chunk boundaries may fall anywhere, including inside a
    /// UTF-8 sequence: bytes stay buffered until their line is complete.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Decodes the next complete buffered line, or `None` when no full line
    /// is left.
    pub fn next_line(&mut self) -> Option<Result<Vec<StreamEvent>, GatewayError>> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line);
        Some(self.decode_line(&line))
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Result<Vec<StreamEvent>, GatewayError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest).into_owned();
        self.decode_line(&line)
    }

    fn decode_line(&mut self, line: &str) -> Result<Vec<StreamEvent>, GatewayError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            return Ok(Vec::new());
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.sse_event = Some(name.trim().to_string());
            return Ok(Vec::new());
        }

        let payload = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
        if payload == "[DONE]" {
            debug!("Received [DONE] marker");
            self.sse_event = None;
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(payload)
            .map_err(|e| GatewayError::Parse(format!("malformed stream line: {e}")))?;

        let (name, data) = match self.sse_event.take() {
            Some(name) => (name, value),
            None => {
                let envelope: Envelope = parse("envelope", value)?;
                (envelope.event, envelope.data)
            }
        };

        self.decode_event(&name, data)
    }

    fn decode_event(&mut self, name: &str, data: Value) -> Result<Vec<StreamEvent>, GatewayError> {
        let mut events = Vec::new();

        match name {
            "thread.message.delta" => {
                let event: MessageDeltaEvent = parse(name, data)?;
                for part in event.delta.content {
                    if part.part_type != "text" {
                        debug!("Skipping {} content delta", part.part_type);
                        continue;
                    }
                    if self.text_parts.insert((event.id.clone(), part.index)) {
                        events.push(StreamEvent::TextCreated);
                    }
                    if let Some(text) = part.text
                        && (text.value.is_some() || text.annotations.is_some())
                    {
                        events.push(StreamEvent::TextDelta {
                            value: text.value.unwrap_or_default(),
                            annotations: text.annotations.unwrap_or_default(),
                        });
                    }
                }
            }
            "thread.message.completed" => {
                let event: MessageCompletedEvent = parse(name, data)?;
                for part in event.content {
                    if let ContentPart::ImageFile { image_file } = part {
                        events.push(StreamEvent::ImageFileDone {
                            file_id: image_file.file_id,
                        });
                    }
                }
            }
            "thread.run.step.delta" => {
                let event: RunStepDeltaEvent = parse(name, data)?;
                let calls = event
                    .delta
                    .step_details
                    .map(|details| details.tool_calls)
                    .unwrap_or_default();
                for call in calls {
                    let input = call.code_interpreter.and_then(|ci| ci.input);
                    if self.tool_calls.insert((event.id.clone(), call.index)) {
                        debug!("Tool call created: {:?} (step={}, index={})", call.kind, event.id, call.index);
                        events.push(StreamEvent::ToolCallCreated { kind: call.kind });
                        if input.as_deref().is_some_and(|s| !s.is_empty()) {
                            events.push(StreamEvent::ToolCallDelta {
                                kind: call.kind,
                                input,
                            });
                        }
                    } else {
                        events.push(StreamEvent::ToolCallDelta {
                            kind: call.kind,
                            input,
                        });
                    }
                }
            }
            "thread.run.requires_action" => {
                let event: RequiresActionEvent = parse(name, data)?;
                let tool_calls: Vec<ToolCall> = event
                    .required_action
                    .submit_tool_outputs
                    .tool_calls
                    .into_iter()
                    .map(|call| ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect();
                debug!("Run {} requires {} tool output(s)", event.id, tool_calls.len());
                events.push(StreamEvent::ActionRequired {
                    run_id: event.id,
                    tool_calls,
                });
            }
            "thread.run.completed" => events.push(StreamEvent::RunCompleted),
            "thread.run.failed" | "thread.run.cancelled" | "thread.run.expired" | "error" => {
                let message = data
                    .pointer("/last_error/message")
                    .or_else(|| data.pointer("/message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| name.to_string());
                warn!("Run ended with '{}': {}", name, message);
                events.push(StreamEvent::RunFailed { message });
            }
            other => debug!("Ignoring stream event '{}'", other),
        }

        Ok(events)
    }
}
