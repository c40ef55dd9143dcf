//! Plain-text transcript export.
//!
//! ```text
//! Q: What is the Oakes test?
//!
//! ---
//!
//! A: The Oakes test comes from R. v. Oakes...
//!
//! ```

use chrono::NaiveDate;

use crate::core::conversation::{Message, Role};

/// Renders the log as a Q/A transcript. Only user messages are `Q:`; assistant
/// and code messages are both `A:`.
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let prefix = if m.role == Role::User { "Q" } else { "A" };
            format!("{}: {}\n\n", prefix, m.text)
        })
        .collect::<Vec<_>>()
        .join("---\n\n")
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("scc-research-{}.txt", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_format() {
        let messages = vec![
            Message::new(Role::User, "What is the Oakes test?"),
            Message::new(Role::Assistant, "A proportionality test."),
        ];
        assert_eq!(
            transcript(&messages),
            "Q: What is the Oakes test?\n\n---\n\nA: A proportionality test.\n\n"
        );
    }

    #[test]
    fn test_code_messages_export_as_answers() {
        let messages = vec![Message::new(Role::Code, "print(1)")];
        assert_eq!(transcript(&messages), "A: print(1)\n\n");
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(transcript(&[]), "");
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(export_file_name(date), "scc-research-2026-10-16.txt");
    }
}
