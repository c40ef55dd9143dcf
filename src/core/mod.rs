//! # Core Application Logic
//!
//! The research session's business logic. It knows nothing about the terminal
//! or HTTP; gateway I/O is described by `Effect`s and run elsewhere.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No network. No UI.     │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                    ┌───────────▼─────────────┐
//!                    │   cli runtime (tokio)   │
//!                    │   ThreadGateway, tools  │
//!                    └─────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all session state in one place
//! - [`action`]: The `Action` enum and the `update` reducer
//! - [`conversation`]: The ordered message log
//! - [`session`], [`storage`]: History, bookmarks and saved sessions
//! - [`tools`]: Answers for tool calls the assistant requests

pub mod action;
pub mod citations;
pub mod config;
pub mod conversation;
pub mod export;
pub mod session;
pub mod state;
pub mod storage;
pub mod tools;
