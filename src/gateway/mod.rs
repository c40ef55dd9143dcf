pub mod assistants;
pub mod decoder;
pub mod provider;
pub mod types;

pub use assistants::AssistantsGateway;
pub use decoder::StreamDecoder;
pub use provider::{GatewayError, ThreadGateway};
pub use types::{Annotation, FileRef, StreamEvent, ThreadId, ToolCall, ToolKind, ToolOutput};
