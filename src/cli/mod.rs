//! # Terminal Front End
//!
//! A line-oriented REPL over the core state machine. Input lines become
//! `Action`s, `update()` turns them into `Effect`s, and the [`Runtime`] runs
//! each effect as a tokio task that reports back on the action channel.
//!
//! ```text
//! stdin ──▶ Command ──▶ Action ──▶ update() ──▶ Effect ──▶ Runtime task
//!                          ▲                                    │
//!                          └──────────── action channel ◀───────┘
//! ```

pub mod command;
pub mod render;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, Receiver, UnboundedSender};

use crate::ToolHandler;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::export::export_file_name;
use crate::core::session::SessionStore;
use crate::core::state::{App, EXAMPLE_QUERIES};
use crate::core::storage::FileStore;
use crate::core::tools::{self, CaseLookupHandler, EmptyOutputHandler, ToolCallHandler};
use crate::gateway::{AssistantsGateway, GatewayError, StreamEvent, ThreadGateway};
use command::{Command, HELP, parse};
use render::Renderer;

/// Executes effects against the gateway and the tool handler.
pub struct Runtime {
    gateway: Arc<dyn ThreadGateway>,
    handler: Arc<dyn ToolCallHandler>,
    tx: UnboundedSender<Action>,
}

impl Runtime {
    pub fn new(
        gateway: Arc<dyn ThreadGateway>,
        handler: Arc<dyn ToolCallHandler>,
        tx: UnboundedSender<Action>,
    ) -> Self {
        Self {
            gateway,
            handler,
            tx,
        }
    }

    pub fn execute(&self, effect: Effect) {
        match effect {
            Effect::None => {}

            Effect::CreateThread { epoch } => {
                info!("Spawning thread creation via {}", self.gateway.name());
                let gateway = self.gateway.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let action = match gateway.create_thread().await {
                        Ok(thread_id) => Action::ThreadCreated { epoch, thread_id },
                        Err(e) => Action::ThreadFailed {
                            epoch,
                            error: e.to_string(),
                        },
                    };
                    if tx.send(action).is_err() {
                        warn!("Failed to send thread result: receiver dropped");
                    }
                });
            }

            Effect::PostMessage {
                epoch,
                thread_id,
                text,
            } => {
                let gateway = self.gateway.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let (event_tx, event_rx) = mpsc::channel::<StreamEvent>(100);
                    let call = gateway.post_message(&thread_id, &text, event_tx);
                    drive_stream(epoch, call, event_rx, tx).await;
                });
            }

            Effect::ResolveToolCalls {
                epoch,
                run_id,
                tool_calls,
            } => {
                let handler = self.handler.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let action = match tools::resolve_all(handler.as_ref(), &tool_calls).await {
                        Ok(outputs) => Action::ToolOutputsReady {
                            epoch,
                            run_id,
                            outputs,
                        },
                        Err(e) => Action::ToolOutputsFailed {
                            epoch,
                            error: e.to_string(),
                        },
                    };
                    if tx.send(action).is_err() {
                        warn!("Failed to send tool outputs: receiver dropped");
                    }
                });
            }

            Effect::SubmitToolOutputs {
                epoch,
                thread_id,
                run_id,
                outputs,
            } => {
                let gateway = self.gateway.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let (event_tx, event_rx) = mpsc::channel::<StreamEvent>(100);
                    let call = gateway.post_tool_outputs(&thread_id, &run_id, &outputs, event_tx);
                    drive_stream(epoch, call, event_rx, tx).await;
                });
            }
        }
    }
}

/// Runs a streaming gateway call while forwarding its events as actions. Every
/// event is forwarded before the stream's end is reported. A stream that
/// already delivered a terminal event reports nothing more.
async fn drive_stream<F>(
    epoch: u64,
    call: F,
    mut events: Receiver<StreamEvent>,
    tx: UnboundedSender<Action>,
) where
    F: Future<Output = Result<(), GatewayError>>,
{
    let forward_tx = tx.clone();
    let forward = async move {
        let mut forwarded = 0usize;
        let mut saw_terminal = false;
        while let Some(event) = events.recv().await {
            forwarded += 1;
            saw_terminal |= event.is_terminal();
            debug!("Forwarding stream event: {:?}", event);
            if forward_tx.send(Action::Stream { epoch, event }).is_err() {
                warn!("Failed to forward stream event: receiver dropped");
                break;
            }
        }
        (forwarded, saw_terminal)
    };

    let (result, (forwarded, saw_terminal)) = tokio::join!(call, forward);
    info!("Stream finished: {} events forwarded", forwarded);

    let action = match result {
        Ok(()) if saw_terminal => return,
        Ok(()) => Action::StreamClosed { epoch },
        Err(e) if saw_terminal => {
            warn!("Stream error after run ended: {}", e);
            return;
        }
        Err(e) => {
            warn!("Stream error: {}", e);
            Action::StreamFailed {
                epoch,
                error: e.to_string(),
            }
        }
    };
    if tx.send(action).is_err() {
        warn!("Failed to send stream end: receiver dropped");
    }
}

pub fn build_handler(kind: ToolHandler) -> Arc<dyn ToolCallHandler> {
    match kind {
        ToolHandler::Empty => Arc::new(EmptyOutputHandler),
        ToolHandler::CaseLookup => Arc::new(CaseLookupHandler),
    }
}

fn open_store(config: &ResolvedConfig) -> std::io::Result<SessionStore> {
    let path = match &config.storage_file {
        Some(path) => path.clone(),
        None => FileStore::default_path()?,
    };
    let store = FileStore::open(path)?;
    info!("Session storage at {}", store.path().display());
    Ok(SessionStore::new(Box::new(store)))
}

pub async fn run(config: ResolvedConfig, tool_handler: ToolHandler) -> std::io::Result<()> {
    let gateway: Arc<dyn ThreadGateway> = Arc::new(AssistantsGateway::new(config.gateway_url.clone()));
    let store = open_store(&config)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let runtime = Runtime::new(gateway, build_handler(tool_handler), tx);
    let mut app = App::new(store);
    let mut renderer = Renderer::new(std::io::stdout());

    renderer.notice("CaseQuery: Supreme Court of Canada research assistant (/help for commands)")?;
    renderer.notice("Try asking:")?;
    for (i, query) in EXAMPLE_QUERIES.iter().enumerate() {
        renderer.notice(&format!("  {}. {}", i + 1, query))?;
    }

    runtime.execute(update(&mut app, Action::Init));
    renderer.render(&app)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut confirming_clear = false;

    loop {
        tokio::select! {
            Some(action) = rx.recv() => {
                debug!("Event loop received: {:?}", action);
                let effect = update(&mut app, action);
                renderer.render(&app)?;
                runtime.execute(effect);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                if confirming_clear {
                    confirming_clear = false;
                    if matches!(line.trim(), "y" | "Y" | "yes") {
                        let effect = update(&mut app, Action::ClearConversation);
                        renderer.render(&app)?;
                        runtime.execute(effect);
                    } else {
                        renderer.notice("Kept conversation.")?;
                    }
                    continue;
                }

                let action = match parse(&line) {
                    Command::Quit => break,
                    Command::Query(text) => {
                        if !text.is_empty() && !app.input_enabled() {
                            renderer.notice("Busy: wait for the current answer (or a thread) first.")?;
                        }
                        Some(Action::Submit(text))
                    }
                    Command::Example(n) => match n.checked_sub(1).and_then(|i| EXAMPLE_QUERIES.get(i)) {
                        Some(query) => Some(Action::Submit(query.to_string())),
                        None => {
                            renderer.notice(&format!("No example {n}; pick 1-{}", EXAMPLE_QUERIES.len()))?;
                            None
                        }
                    },
                    Command::Clear => {
                        confirming_clear = true;
                        renderer.notice("Clear the conversation? [y/N]")?;
                        None
                    }
                    Command::Bookmark(n) => Some(Action::ToggleBookmark(n)),
                    Command::Save(name) => Some(Action::SaveSession(name)),
                    Command::Load(name) => Some(Action::LoadSession(name)),
                    Command::Citations(Some(n)) => Some(Action::ExtractCitations(n)),
                    Command::Citations(None) => {
                        show_list(&mut renderer, "Citations", &app.citations)?;
                        None
                    }
                    Command::Bookmarks => {
                        let entries: Vec<String> = app
                            .bookmarked_responses()
                            .into_iter()
                            .map(|(ordinal, preview)| format!("#{ordinal} {preview}"))
                            .collect();
                        show_list(&mut renderer, "Bookmarks", &entries)?;
                        None
                    }
                    Command::History => {
                        show_list(&mut renderer, "Recent searches", &app.search_history)?;
                        None
                    }
                    Command::Sessions => {
                        show_list(&mut renderer, "Saved sessions", &app.saved_session_names())?;
                        None
                    }
                    Command::Export(path) => {
                        export(&mut renderer, &app, path)?;
                        None
                    }
                    Command::Help => {
                        renderer.notice(HELP)?;
                        None
                    }
                    Command::Invalid(message) => {
                        renderer.notice(&message)?;
                        None
                    }
                };

                if let Some(action) = action {
                    let citations_before = app.citations.len();
                    let effect = update(&mut app, action);
                    renderer.render(&app)?;
                    if app.citations.len() != citations_before {
                        show_list(&mut renderer, "Citations", &app.citations)?;
                    }
                    renderer.notice(&format!("-- {} ({} questions)", app.status_message, app.query_count()))?;
                    runtime.execute(effect);
                }
                if app.input_enabled() {
                    renderer.prompt()?;
                }
            }
        }
    }

    info!("CaseQuery session ended ({} messages)", app.conversation.len());
    Ok(())
}

fn show_list<W: std::io::Write>(
    renderer: &mut Renderer<W>,
    title: &str,
    entries: &[String],
) -> std::io::Result<()> {
    if entries.is_empty() {
        return renderer.notice(&format!("{title}: none"));
    }
    renderer.notice(&format!("{title}:"))?;
    for entry in entries {
        renderer.notice(&format!("  {entry}"))?;
    }
    Ok(())
}

fn export<W: std::io::Write>(
    renderer: &mut Renderer<W>,
    app: &App,
    path: Option<PathBuf>,
) -> std::io::Result<()> {
    if app.conversation.is_empty() {
        return renderer.notice("Nothing to export.");
    }
    let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
    match std::fs::write(&path, app.export_transcript()) {
        Ok(()) => {
            info!("Exported transcript to {}", path.display());
            renderer.notice(&format!("Exported to {}", path.display()))
        }
        Err(e) => {
            warn!("Export failed: {}", e);
            renderer.notice(&format!("Export failed: {e}"))
        }
    }
}
