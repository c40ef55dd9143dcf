//! # Application State
//!
//! Core research-session state. Domain logic only; the terminal front end
//! keeps its own presentation state.
//!
//! ```text
//! App
//! ├── phase: Phase                    // where the current run is
//! ├── thread_id: Option<ThreadId>     // server-side thread, once created
//! ├── conversation: Conversation      // ordered message log
//! ├── open: Option<usize>             // ordinal receiving streamed text
//! ├── is_thinking: bool               // waiting for the first output of a run
//! ├── bookmarks: BTreeSet<usize>      // bookmarked ordinals (persisted)
//! ├── search_history: Vec<String>     // recent queries (persisted)
//! ├── citations: Vec<String>          // running citations panel
//! ├── store: SessionStore             // local persistence
//! ├── epoch: u64                      // bumped when a thread is abandoned
//! ├── status_message: String          // status line text
//! └── error: Option<String>           // last run error
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::BTreeSet;

use crate::core::conversation::{Conversation, Role};
use crate::core::export;
use crate::core::session::SessionStore;
use crate::gateway::ThreadId;

/// Starter questions offered on an empty conversation.
pub const EXAMPLE_QUERIES: [&str; 4] = [
    "What is the Oakes test and how is it applied in Charter analysis?",
    "Explain the ratio decidendi in R. v. Morgentaler regarding section 7 rights",
    "What did the SCC hold in Reference re Secession of Quebec?",
    "How did Roncarelli v. Duplessis establish the rule of law in Canada?",
];

/// Characters of a bookmarked response shown in listings.
pub const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No thread yet. Submissions are rejected.
    AwaitingThread,
    Idle,
    /// Message or tool outputs posted, nothing streamed back yet.
    RunInFlight,
    /// An open message is receiving output.
    Streaming,
    /// The run stopped for tool outputs; they are being resolved.
    AwaitingToolOutput,
}

impl Phase {
    pub fn in_run(self) -> bool {
        matches!(
            self,
            Phase::RunInFlight | Phase::Streaming | Phase::AwaitingToolOutput
        )
    }
}

pub struct App {
    pub phase: Phase,
    pub thread_id: Option<ThreadId>,
    pub conversation: Conversation,
    pub open: Option<usize>,
    pub is_thinking: bool,
    pub bookmarks: BTreeSet<usize>,
    pub search_history: Vec<String>,
    pub citations: Vec<String>,
    pub store: SessionStore,
    pub epoch: u64,
    pub status_message: String,
    pub error: Option<String>,
}

impl App {
    /// Creates the app with history and bookmarks restored from `store`.
    pub fn new(store: SessionStore) -> Self {
        Self {
            phase: Phase::AwaitingThread,
            thread_id: None,
            conversation: Conversation::new(),
            open: None,
            is_thinking: false,
            bookmarks: store.bookmarks(),
            search_history: store.history(),
            citations: Vec::new(),
            store,
            epoch: 0,
            status_message: String::from("Connecting..."),
            error: None,
        }
    }

    /// Input is accepted only between runs, with a thread in place.
    pub fn input_enabled(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn query_count(&self) -> usize {
        self.conversation.query_count()
    }

    pub fn saved_session_names(&self) -> Vec<String> {
        self.store.session_names()
    }

    /// Bookmarked assistant responses as `(ordinal, preview)`, in ordinal order.
    pub fn bookmarked_responses(&self) -> Vec<(usize, String)> {
        self.bookmarks
            .iter()
            .filter_map(|&ordinal| {
                let message = self.conversation.get(ordinal)?;
                if message.role != Role::Assistant {
                    return None;
                }
                let mut preview: String = message.text.chars().take(PREVIEW_CHARS).collect();
                if message.text.chars().count() > PREVIEW_CHARS {
                    preview.push_str("...");
                }
                Some((ordinal, preview))
            })
            .collect()
    }

    pub fn export_transcript(&self) -> String {
        export::transcript(self.conversation.messages())
    }
}
