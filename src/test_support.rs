//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::session::SessionStore;
use crate::core::state::{App, Phase};
use crate::core::storage::MemoryStore;
use crate::gateway::{GatewayError, StreamEvent, ThreadGateway, ThreadId, ToolOutput};

/// A gateway that replays one scripted event batch per streaming call and
/// records what it was sent.
pub struct ScriptedGateway {
    fail_thread: bool,
    batches: Mutex<VecDeque<Vec<StreamEvent>>>,
    posted: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, Vec<ToolOutput>)>>,
}

impl ScriptedGateway {
    pub fn new(batches: Vec<Vec<StreamEvent>>) -> Self {
        Self {
            fail_thread: false,
            batches: Mutex::new(batches.into()),
            posted: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// A gateway whose thread creation always fails.
    pub fn failing_thread() -> Self {
        Self {
            fail_thread: true,
            ..Self::new(vec![])
        }
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }

    pub fn submitted_outputs(&self) -> Vec<(String, Vec<ToolOutput>)> {
        self.submitted.lock().unwrap().clone()
    }

    async fn replay(&self, sender: Sender<StreamEvent>) -> Result<(), GatewayError> {
        let batch = self.batches.lock().unwrap().pop_front().unwrap_or_default();
        for event in batch {
            sender
                .send(event)
                .await
                .map_err(|_| GatewayError::ChannelClosed)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ThreadGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_thread(&self) -> Result<ThreadId, GatewayError> {
        if self.fail_thread {
            return Err(GatewayError::Network("connection refused".into()));
        }
        Ok(ThreadId::new("thread_scripted"))
    }

    async fn post_message(
        &self,
        _thread_id: &ThreadId,
        text: &str,
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError> {
        self.posted.lock().unwrap().push(text.to_string());
        self.replay(sender).await
    }

    async fn post_tool_outputs(
        &self,
        _thread_id: &ThreadId,
        run_id: &str,
        outputs: &[ToolOutput],
        sender: Sender<StreamEvent>,
    ) -> Result<(), GatewayError> {
        self.submitted
            .lock()
            .unwrap()
            .push((run_id.to_string(), outputs.to_vec()));
        self.replay(sender).await
    }
}

/// Creates a test App over an in-memory store, before any thread exists.
pub fn test_app() -> App {
    App::new(SessionStore::new(Box::new(MemoryStore::new())))
}

/// Creates a test App with thread `thread_test` established and input enabled.
pub fn ready_app() -> App {
    let mut app = test_app();
    app.thread_id = Some(ThreadId::new("thread_test"));
    app.phase = Phase::Idle;
    app
}
