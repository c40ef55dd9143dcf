//! # Actions
//!
//! Everything that can happen in a research session becomes an `Action`.
//! User submits a question? That's `Action::Submit(text)`.
//! The gateway streams a text delta? That's `Action::Stream { epoch, event }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state and returns an `Effect` describing any I/O to perform. No side effects
//! here beyond the injected session store. The runtime executes effects and
//! feeds their results back as further actions.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! ## Epochs
//!
//! Clearing the conversation abandons the current thread and any stream still
//! running on it. Every effect that talks to the gateway carries the epoch it
//! was issued in, and every action the runtime reports back carries it again.
//! Actions from an older epoch are dropped.

use chrono::{Local, Utc};
use log::{debug, info, warn};

use crate::core::citations;
use crate::core::conversation::Role;
use crate::core::session::{SessionRecord, default_session_name};
use crate::core::state::{App, Phase};
use crate::gateway::{Annotation, StreamEvent, ThreadId, ToolCall, ToolKind, ToolOutput, types};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start the session: request the first thread.
    Init,
    Submit(String),
    ThreadCreated { epoch: u64, thread_id: ThreadId },
    ThreadFailed { epoch: u64, error: String },
    Stream { epoch: u64, event: StreamEvent },
    /// The transport failed mid-run.
    StreamFailed { epoch: u64, error: String },
    /// The stream ended. Ends the run if no terminal event arrived.
    StreamClosed { epoch: u64 },
    ToolOutputsReady {
        epoch: u64,
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
    ToolOutputsFailed { epoch: u64, error: String },
    /// Already confirmed by the user.
    ClearConversation,
    ToggleBookmark(usize),
    SaveSession(Option<String>),
    LoadSession(String),
    ExtractCitations(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    CreateThread {
        epoch: u64,
    },
    PostMessage {
        epoch: u64,
        thread_id: ThreadId,
        text: String,
    },
    ResolveToolCalls {
        epoch: u64,
        run_id: String,
        tool_calls: Vec<ToolCall>,
    },
    SubmitToolOutputs {
        epoch: u64,
        thread_id: ThreadId,
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
}

impl Action {
    fn epoch(&self) -> Option<u64> {
        match self {
            Action::ThreadCreated { epoch, .. }
            | Action::ThreadFailed { epoch, .. }
            | Action::Stream { epoch, .. }
            | Action::StreamFailed { epoch, .. }
            | Action::StreamClosed { epoch }
            | Action::ToolOutputsReady { epoch, .. }
            | Action::ToolOutputsFailed { epoch, .. } => Some(*epoch),
            _ => None,
        }
    }
}

pub fn update(app: &mut App, action: Action) -> Effect {
    if let Some(epoch) = action.epoch()
        && epoch != app.epoch
    {
        debug!("Dropping stale action from epoch {} (current {})", epoch, app.epoch);
        return Effect::None;
    }

    match action {
        Action::Init => {
            info!("Requesting thread (epoch {})", app.epoch);
            Effect::CreateThread { epoch: app.epoch }
        }

        Action::ThreadCreated { thread_id, .. } => {
            if app.phase != Phase::AwaitingThread {
                warn!("Thread {} created outside AwaitingThread; ignoring", thread_id);
                return Effect::None;
            }
            info!("Thread ready: {}", thread_id);
            app.thread_id = Some(thread_id);
            app.phase = Phase::Idle;
            app.status_message = String::from("Ready");
            Effect::None
        }

        Action::ThreadFailed { error, .. } => {
            warn!("Thread creation failed: {}", error);
            app.status_message = String::from("Could not start a research thread");
            app.error = Some(error);
            Effect::None
        }

        Action::Submit(text) => submit(app, &text),

        Action::Stream { event, .. } => on_stream_event(app, event),

        Action::StreamFailed { error, .. } => {
            if !app.phase.in_run() {
                return Effect::None;
            }
            warn!("Run stream failed: {}", error);
            finish_run(app, Some(error));
            Effect::None
        }

        Action::StreamClosed { .. } => {
            if matches!(app.phase, Phase::RunInFlight | Phase::Streaming) {
                warn!("Stream closed without a terminal event");
                finish_run(app, None);
            }
            Effect::None
        }

        Action::ToolOutputsReady {
            run_id, outputs, ..
        } => {
            if app.phase != Phase::AwaitingToolOutput {
                warn!("Tool outputs for {} arrived in {:?}; ignoring", run_id, app.phase);
                return Effect::None;
            }
            let Some(thread_id) = app.thread_id.clone() else {
                warn!("Tool outputs ready but no thread; ending run");
                finish_run(app, Some(String::from("no thread for tool outputs")));
                return Effect::None;
            };
            app.phase = Phase::RunInFlight;
            app.is_thinking = true;
            Effect::SubmitToolOutputs {
                epoch: app.epoch,
                thread_id,
                run_id,
                outputs,
            }
        }

        Action::ToolOutputsFailed { error, .. } => {
            if app.phase == Phase::AwaitingToolOutput {
                warn!("Tool call resolution failed: {}", error);
                finish_run(app, Some(error));
            }
            Effect::None
        }

        Action::ClearConversation => {
            info!(
                "Clearing conversation ({} messages), abandoning epoch {}",
                app.conversation.len(),
                app.epoch
            );
            app.conversation.clear();
            // Ordinals would point at the next conversation's messages. Saved
            // sessions keep their own snapshot.
            app.bookmarks.clear();
            app.store.save_bookmarks(&app.bookmarks);
            app.open = None;
            app.is_thinking = false;
            app.thread_id = None;
            app.error = None;
            app.epoch += 1;
            app.phase = Phase::AwaitingThread;
            app.status_message = String::from("Connecting...");
            Effect::CreateThread { epoch: app.epoch }
        }

        Action::ToggleBookmark(ordinal) => {
            if !app.bookmarks.remove(&ordinal) {
                app.bookmarks.insert(ordinal);
            }
            app.store.save_bookmarks(&app.bookmarks);
            Effect::None
        }

        Action::SaveSession(name) => {
            let name = name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| default_session_name(Local::now()));
            let record = SessionRecord::snapshot(name.clone(), &app.conversation, &app.bookmarks, Utc::now());
            app.store.save_session(record);
            info!("Saved session '{}'", name);
            app.status_message = format!("Saved session '{}'", name);
            Effect::None
        }

        Action::LoadSession(name) => {
            if app.phase.in_run() {
                warn!("Cannot load session '{}' during a run", name);
                return Effect::None;
            }
            match app.store.find_session(&name) {
                Some(record) => {
                    info!("Loaded session '{}' ({} messages)", name, record.messages.len());
                    app.conversation = record.conversation();
                    app.bookmarks = record.bookmarks();
                    app.open = None;
                    app.status_message = format!("Loaded session '{}'", name);
                }
                None => {
                    debug!("No session named '{}'", name);
                    app.status_message = format!("No session named '{}'", name);
                }
            }
            Effect::None
        }

        Action::ExtractCitations(ordinal) => {
            let Some(message) = app.conversation.get(ordinal) else {
                return Effect::None;
            };
            if message.role != Role::Assistant {
                return Effect::None;
            }
            let found = citations::extract(&message.text);
            debug!("Extracted {} citation(s) from message {}", found.len(), ordinal);
            for citation in found {
                if !app.citations.contains(&citation) {
                    app.citations.push(citation);
                }
            }
            Effect::None
        }
    }
}

fn submit(app: &mut App, text: &str) -> Effect {
    let text = text.trim();
    if text.is_empty() {
        return Effect::None;
    }
    if app.phase.in_run() {
        debug!("Submit ignored: input disabled in {:?}", app.phase);
        return Effect::None;
    }
    let Some(thread_id) = app.thread_id.clone() else {
        warn!("Submit rejected: no thread");
        return Effect::None;
    };

    app.search_history = app.store.record_query(text);
    app.conversation.push(Role::User, text);
    app.error = None;
    app.phase = Phase::RunInFlight;
    app.is_thinking = true;
    info!("Submitting query ({} chars) to thread {}", text.len(), thread_id);
    Effect::PostMessage {
        epoch: app.epoch,
        thread_id,
        text: text.to_string(),
    }
}

fn on_stream_event(app: &mut App, event: StreamEvent) -> Effect {
    if !app.phase.in_run() {
        debug!("Stream event outside a run: {:?}", event);
        return Effect::None;
    }

    match event {
        StreamEvent::TextCreated => {
            let ordinal = app.conversation.push(Role::Assistant, "");
            app.open = Some(ordinal);
            app.is_thinking = false;
            app.phase = Phase::Streaming;
        }

        StreamEvent::TextDelta { value, annotations } => {
            if app.phase != Phase::Streaming {
                return Effect::None;
            }
            let Some(ordinal) = open_with_role(app, Role::Assistant) else {
                return Effect::None;
            };
            app.conversation.append(ordinal, &value);
            for annotation in annotations {
                if let Annotation::FilePath { text, file_path } = annotation {
                    app.conversation
                        .replace_all(ordinal, &text, &types::file_path(&file_path.file_id));
                }
            }
        }

        StreamEvent::ImageFileDone { file_id } => {
            if let Some(ordinal) = app.open {
                let path = types::file_path(&file_id);
                app.conversation
                    .append(ordinal, &format!("\n![{file_id}]({path})\n"));
            }
        }

        StreamEvent::ToolCallCreated { kind } => {
            if kind == ToolKind::CodeInterpreter {
                let ordinal = app.conversation.push(Role::Code, "");
                app.open = Some(ordinal);
                app.is_thinking = false;
                app.phase = Phase::Streaming;
            }
        }

        StreamEvent::ToolCallDelta { kind, input } => {
            if kind != ToolKind::CodeInterpreter {
                return Effect::None;
            }
            if let Some(input) = input.filter(|i| !i.is_empty())
                && let Some(ordinal) = open_with_role(app, Role::Code)
            {
                app.conversation.append(ordinal, &input);
            }
        }

        StreamEvent::ActionRequired { run_id, tool_calls } => {
            info!("Run {} requires {} tool output(s)", run_id, tool_calls.len());
            app.phase = Phase::AwaitingToolOutput;
            app.open = None;
            return Effect::ResolveToolCalls {
                epoch: app.epoch,
                run_id,
                tool_calls,
            };
        }

        StreamEvent::RunCompleted => {
            info!("Run completed ({} messages)", app.conversation.len());
            finish_run(app, None);
        }

        StreamEvent::RunFailed { message } => {
            warn!("Run failed: {}", message);
            finish_run(app, Some(message));
        }
    }
    Effect::None
}

/// The open ordinal, if it names a message of `role`.
fn open_with_role(app: &App, role: Role) -> Option<usize> {
    let ordinal = app.open?;
    let message = app.conversation.get(ordinal)?;
    (message.role == role).then_some(ordinal)
}

/// Back to `Idle`: input re-enabled, partial output kept.
fn finish_run(app: &mut App, error: Option<String>) {
    app.phase = Phase::Idle;
    app.open = None;
    app.is_thinking = false;
    app.status_message = if error.is_some() {
        String::from("Run ended with an error")
    } else {
        String::from("Ready")
    };
    app.error = error;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::Message;
    use crate::gateway::FileRef;
    use crate::test_support::{ready_app, test_app};

    fn stream(app: &mut App, event: StreamEvent) -> Effect {
        let epoch = app.epoch;
        update(app, Action::Stream { epoch, event })
    }

    fn delta(value: &str) -> StreamEvent {
        StreamEvent::TextDelta {
            value: value.into(),
            annotations: vec![],
        }
    }

    fn texts(app: &App) -> Vec<(Role, &str)> {
        app.conversation
            .messages()
            .iter()
            .map(|m| (m.role, m.text.as_str()))
            .collect()
    }

    #[test]
    fn test_init_requests_thread_and_creation_enables_input() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Init), Effect::CreateThread { epoch: 0 });
        update(
            &mut app,
            Action::ThreadCreated {
                epoch: 0,
                thread_id: ThreadId::new("thread_1"),
            },
        );
        assert_eq!(app.phase, Phase::Idle);
        assert!(app.input_enabled());
    }

    #[test]
    fn test_thread_failure_keeps_awaiting_thread() {
        let mut app = test_app();
        update(
            &mut app,
            Action::ThreadFailed {
                epoch: 0,
                error: "network error: refused".into(),
            },
        );
        assert_eq!(app.phase, Phase::AwaitingThread);
        assert_eq!(update(&mut app, Action::Submit("hello".into())), Effect::None);
        assert!(app.conversation.is_empty());
    }

    #[test]
    fn test_submit_posts_message_and_records_history() {
        let mut app = ready_app();
        let effect = update(&mut app, Action::Submit("  What is the Oakes test?  ".into()));
        assert_eq!(
            effect,
            Effect::PostMessage {
                epoch: 0,
                thread_id: ThreadId::new("thread_test"),
                text: "What is the Oakes test?".into(),
            }
        );
        assert_eq!(app.phase, Phase::RunInFlight);
        assert!(app.is_thinking);
        assert_eq!(app.search_history, vec!["What is the Oakes test?"]);
        assert_eq!(app.store.history(), vec!["What is the Oakes test?"]);
        assert_eq!(texts(&app), vec![(Role::User, "What is the Oakes test?")]);
    }

    #[test]
    fn test_empty_submit_is_rejected() {
        let mut app = ready_app();
        assert_eq!(update(&mut app, Action::Submit("   ".into())), Effect::None);
        assert_eq!(app.phase, Phase::Idle);
        assert!(app.search_history.is_empty());
    }

    #[test]
    fn test_submit_while_input_disabled_is_noop() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("first".into()));
        assert_eq!(update(&mut app, Action::Submit("second".into())), Effect::None);
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.search_history, vec!["first"]);
    }

    #[test]
    fn test_oakes_scenario() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("What is the Oakes test?".into()));
        stream(&mut app, StreamEvent::TextCreated);
        assert_eq!(app.phase, Phase::Streaming);
        assert!(!app.is_thinking);
        stream(&mut app, delta("The Oakes "));
        stream(&mut app, delta("test..."));
        stream(&mut app, StreamEvent::RunCompleted);

        assert_eq!(
            texts(&app),
            vec![
                (Role::User, "What is the Oakes test?"),
                (Role::Assistant, "The Oakes test..."),
            ]
        );
        assert_eq!(app.phase, Phase::Idle);
        assert!(app.input_enabled());
        assert_eq!(app.open, None);
    }

    #[test]
    fn test_file_path_annotation_replaced_everywhere() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("chart".into()));
        stream(&mut app, StreamEvent::TextCreated);
        stream(&mut app, delta("See sandbox:/a.png and sandbox:/a.png"));
        stream(
            &mut app,
            StreamEvent::TextDelta {
                value: ".".into(),
                annotations: vec![
                    Annotation::FilePath {
                        text: "sandbox:/a.png".into(),
                        file_path: FileRef { file_id: "file-9".into() },
                    },
                    Annotation::Other,
                ],
            },
        );
        assert_eq!(
            app.conversation.get(1).unwrap().text,
            "See /api/files/file-9 and /api/files/file-9."
        );
    }

    #[test]
    fn test_delta_before_text_created_is_ignored() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(&mut app, delta("lost"));
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.phase, Phase::RunInFlight);
    }

    #[test]
    fn test_image_file_appends_markdown_image() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("plot".into()));
        stream(&mut app, StreamEvent::TextCreated);
        stream(&mut app, delta("Here:"));
        stream(
            &mut app,
            StreamEvent::ImageFileDone {
                file_id: "file-img".into(),
            },
        );
        assert_eq!(
            app.conversation.get(1).unwrap().text,
            "Here:\n![file-img](/api/files/file-img)\n"
        );
    }

    #[test]
    fn test_code_interpreter_scenario() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("count the cases".into()));
        stream(
            &mut app,
            StreamEvent::ToolCallCreated {
                kind: ToolKind::CodeInterpreter,
            },
        );
        for chunk in ["print(", "1)"] {
            stream(
                &mut app,
                StreamEvent::ToolCallDelta {
                    kind: ToolKind::CodeInterpreter,
                    input: Some(chunk.into()),
                },
            );
        }
        stream(
            &mut app,
            StreamEvent::ToolCallDelta {
                kind: ToolKind::CodeInterpreter,
                input: None,
            },
        );
        stream(&mut app, StreamEvent::TextCreated);
        stream(&mut app, delta("1"));
        stream(&mut app, StreamEvent::RunCompleted);

        assert_eq!(
            texts(&app),
            vec![
                (Role::User, "count the cases"),
                (Role::Code, "print(1)"),
                (Role::Assistant, "1"),
            ]
        );
    }

    #[test]
    fn test_text_delta_never_lands_in_code_message() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(
            &mut app,
            StreamEvent::ToolCallCreated {
                kind: ToolKind::CodeInterpreter,
            },
        );
        stream(
            &mut app,
            StreamEvent::ToolCallDelta {
                kind: ToolKind::CodeInterpreter,
                input: Some("len(cases)".into()),
            },
        );
        stream(&mut app, delta("stray"));

        assert_eq!(
            texts(&app),
            vec![(Role::User, "q"), (Role::Code, "len(cases)")]
        );
    }

    #[test]
    fn test_non_code_tool_calls_are_ignored() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(
            &mut app,
            StreamEvent::ToolCallCreated {
                kind: ToolKind::FileSearch,
            },
        );
        stream(
            &mut app,
            StreamEvent::ToolCallDelta {
                kind: ToolKind::FileSearch,
                input: Some("x".into()),
            },
        );
        assert_eq!(app.conversation.len(), 1);
        assert_eq!(app.phase, Phase::RunInFlight);
    }

    #[test]
    fn test_action_required_resolves_then_submits_outputs() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("look it up".into()));
        let calls = vec![ToolCall {
            id: "call_1".into(),
            name: "lookup_case".into(),
            arguments: r#"{"slug":"r-v-oakes-1986"}"#.into(),
        }];
        let effect = stream(
            &mut app,
            StreamEvent::ActionRequired {
                run_id: "run_1".into(),
                tool_calls: calls.clone(),
            },
        );
        assert_eq!(
            effect,
            Effect::ResolveToolCalls {
                epoch: 0,
                run_id: "run_1".into(),
                tool_calls: calls,
            }
        );
        assert_eq!(app.phase, Phase::AwaitingToolOutput);
        assert!(!app.input_enabled());

        // The message stream closing does not end a run waiting on tool outputs.
        update(&mut app, Action::StreamClosed { epoch: 0 });
        assert_eq!(app.phase, Phase::AwaitingToolOutput);

        let outputs = vec![ToolOutput {
            tool_call_id: "call_1".into(),
            output: "{}".into(),
        }];
        let effect = update(
            &mut app,
            Action::ToolOutputsReady {
                epoch: 0,
                run_id: "run_1".into(),
                outputs: outputs.clone(),
            },
        );
        assert_eq!(
            effect,
            Effect::SubmitToolOutputs {
                epoch: 0,
                thread_id: ThreadId::new("thread_test"),
                run_id: "run_1".into(),
                outputs,
            }
        );
        assert_eq!(app.phase, Phase::RunInFlight);
    }

    #[test]
    fn test_tool_output_failure_fails_run() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(
            &mut app,
            StreamEvent::ActionRequired {
                run_id: "run_1".into(),
                tool_calls: vec![],
            },
        );
        update(
            &mut app,
            Action::ToolOutputsFailed {
                epoch: 0,
                error: "tool error: bad".into(),
            },
        );
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.error.as_deref(), Some("tool error: bad"));
    }

    #[test]
    fn test_stream_failure_keeps_partial_text() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(&mut app, StreamEvent::TextCreated);
        stream(&mut app, delta("partial"));
        update(
            &mut app,
            Action::StreamFailed {
                epoch: 0,
                error: "network error: reset".into(),
            },
        );
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.conversation.get(1).unwrap().text, "partial");
        assert!(app.error.is_some());
    }

    #[test]
    fn test_run_failed_event_ends_run() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(
            &mut app,
            StreamEvent::RunFailed {
                message: "rate limited".into(),
            },
        );
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.error.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_stream_closed_without_terminal_event_ends_run() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q".into()));
        stream(&mut app, StreamEvent::TextCreated);
        update(&mut app, Action::StreamClosed { epoch: 0 });
        assert_eq!(app.phase, Phase::Idle);
    }

    #[test]
    fn test_clear_abandons_stream() {
        let mut app = ready_app();
        app.bookmarks.insert(0);
        update(&mut app, Action::Submit("q".into()));
        stream(&mut app, StreamEvent::TextCreated);

        let effect = update(&mut app, Action::ClearConversation);
        assert_eq!(effect, Effect::CreateThread { epoch: 1 });
        assert!(app.conversation.is_empty());
        assert_eq!(app.phase, Phase::AwaitingThread);
        assert!(app.thread_id.is_none());
        assert!(app.bookmarks.is_empty());
        assert!(app.store.bookmarks().is_empty());

        // Late events from the abandoned run are dropped.
        update(
            &mut app,
            Action::Stream {
                epoch: 0,
                event: delta("stale"),
            },
        );
        update(
            &mut app,
            Action::ThreadCreated {
                epoch: 0,
                thread_id: ThreadId::new("old"),
            },
        );
        assert!(app.conversation.is_empty());
        assert!(app.thread_id.is_none());

        update(
            &mut app,
            Action::ThreadCreated {
                epoch: 1,
                thread_id: ThreadId::new("thread_2"),
            },
        );
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.thread_id, Some(ThreadId::new("thread_2")));
    }

    #[test]
    fn test_bookmarks_do_not_carry_over_to_next_conversation() {
        let mut app = ready_app();
        update(&mut app, Action::Submit("q1".into()));
        stream(&mut app, StreamEvent::TextCreated);
        stream(&mut app, delta("first answer"));
        stream(&mut app, StreamEvent::RunCompleted);
        update(&mut app, Action::ToggleBookmark(1));
        assert_eq!(app.bookmarked_responses().len(), 1);

        update(&mut app, Action::ClearConversation);
        update(
            &mut app,
            Action::ThreadCreated {
                epoch: 1,
                thread_id: ThreadId::new("thread_2"),
            },
        );
        update(&mut app, Action::Submit("q2".into()));
        stream(&mut app, StreamEvent::TextCreated);
        stream(&mut app, delta("second answer"));
        stream(&mut app, StreamEvent::RunCompleted);

        assert_eq!(app.conversation.get(1).unwrap().text, "second answer");
        assert!(app.bookmarked_responses().is_empty());
    }

    #[test]
    fn test_toggle_bookmark_twice_is_noop() {
        let mut app = ready_app();
        update(&mut app, Action::ToggleBookmark(3));
        assert!(app.bookmarks.contains(&3));
        assert!(app.store.bookmarks().contains(&3));
        update(&mut app, Action::ToggleBookmark(3));
        assert!(app.bookmarks.is_empty());
        assert!(app.store.bookmarks().is_empty());
    }

    #[test]
    fn test_save_then_load_restores_state() {
        let mut app = ready_app();
        app.conversation = vec![
            Message::new(Role::User, "q"),
            Message::new(Role::Assistant, "a"),
        ]
        .into();
        app.bookmarks = [1].into_iter().collect();
        update(&mut app, Action::SaveSession(Some("Charter research".into())));
        let saved_conversation = app.conversation.clone();
        let saved_bookmarks = app.bookmarks.clone();

        update(&mut app, Action::ClearConversation);
        assert!(app.bookmarks.is_empty());
        update(
            &mut app,
            Action::ThreadCreated {
                epoch: 1,
                thread_id: ThreadId::new("thread_2"),
            },
        );
        update(&mut app, Action::LoadSession("Charter research".into()));

        assert_eq!(app.conversation, saved_conversation);
        assert_eq!(app.bookmarks, saved_bookmarks);
        assert_eq!(app.saved_session_names(), vec!["Charter research"]);
    }

    #[test]
    fn test_save_without_name_uses_timestamp() {
        let mut app = ready_app();
        update(&mut app, Action::SaveSession(None));
        let names = app.saved_session_names();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("Session "));
    }

    #[test]
    fn test_load_missing_session_is_noop() {
        let mut app = ready_app();
        app.conversation.push(Role::User, "keep me");
        update(&mut app, Action::LoadSession("nope".into()));
        assert_eq!(app.conversation.len(), 1);
    }

    #[test]
    fn test_extract_citations_appends_to_panel() {
        let mut app = ready_app();
        app.conversation.push(Role::User, "R. v. Ignored");
        app.conversation
            .push(Role::Assistant, "R. v. Oakes, [1986] 1 SCR 103. See also R. v. Oakes.");
        update(&mut app, Action::ExtractCitations(0));
        assert!(app.citations.is_empty());
        update(&mut app, Action::ExtractCitations(1));
        update(&mut app, Action::ExtractCitations(1));
        assert_eq!(app.citations, vec!["R. v. Oakes", "[1986] 1 SCR 103"]);
    }
}
