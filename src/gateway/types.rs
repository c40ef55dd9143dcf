use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a server-side conversation context.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of tool the hosted assistant invoked during a run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Sandboxed code execution. Its input is shown in the log as a `code` message.
    CodeInterpreter,
    FileSearch,
    Function,
    #[serde(other)]
    Other,
}

/// Reference to a file produced by the assistant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_id: String,
}

/// Marker attached to streamed text: `text` should be replaced with a resolved reference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    FilePath { text: String, file_path: FileRef },
    #[serde(other)]
    Other,
}

/// A function call the assistant needs the client to execute before the run can continue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String, // JSON string
}

/// Output for one tool call, submitted back under the same run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// One decoded event from an assistant run stream, in gateway order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextCreated,
    TextDelta {
        value: String,
        annotations: Vec<Annotation>,
    },
    ImageFileDone {
        file_id: String,
    },
    ToolCallCreated {
        kind: ToolKind,
    },
    ToolCallDelta {
        kind: ToolKind,
        input: Option<String>,
    },
    ActionRequired {
        run_id: String,
        tool_calls: Vec<ToolCall>,
    },
    RunCompleted,
    /// The gateway reported the run as failed, cancelled or expired.
    RunFailed {
        message: String,
    },
}

impl StreamEvent {
    /// True for events after which the run produces nothing more on this stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::RunCompleted | StreamEvent::RunFailed { .. } | StreamEvent::ActionRequired { .. }
        )
    }
}

/// Constructs the retrieval path for a generated file.
pub fn file_path(file_id: &str) -> String {
    format!("/api/files/{file_id}")
}
