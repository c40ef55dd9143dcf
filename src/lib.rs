//! CaseQuery library exports for testing

use clap::ValueEnum;

pub mod cases;
pub mod cli;
pub mod core;
pub mod gateway;

#[cfg(test)]
pub mod test_support;

/// How tool calls requested by the assistant are answered.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ToolHandler {
    /// Every call gets an empty output.
    #[default]
    Empty,
    /// Answer `lookup_case` calls with the case name and page path.
    CaseLookup,
}
