//! # Case Pages
//!
//! Landmark-case pages and the site map: slug parsing, the catalog of major
//! cases, model-generated page content and the axum service that serves them.

pub mod catalog;
pub mod content;
pub mod server;
pub mod sitemap;
pub mod slug;

pub use content::{CaseContent, CaseError, CaseGenerator, OpenAiCaseGenerator};
pub use server::{CaseService, create_router};
