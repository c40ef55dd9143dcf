//! Incremental terminal output.
//!
//! The log only grows at its tail, so each render prints the new suffix of the
//! open message and any new messages. When a printed message no longer
//! prefixes its current text (annotation rewrite, cleared or loaded log) the
//! affected messages are printed again in full.

use std::io::{self, Write};

use crate::core::conversation::Role;
use crate::core::state::App;

pub struct Renderer<W: Write> {
    out: W,
    shown: Vec<String>,
    thinking_shown: bool,
    last_error: Option<String>,
    was_in_run: bool,
    /// Whether input was open at the previous render; `None` before the first.
    input_was_open: Option<bool>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: Vec::new(),
            thinking_shown: false,
            last_error: None,
            was_in_run: false,
            input_was_open: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes a line outside the message log.
    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }

    pub fn render(&mut self, app: &App) -> io::Result<()> {
        let messages = app.conversation.messages();

        let diverged = self
            .shown
            .iter()
            .enumerate()
            .find(|(i, text)| messages.get(*i).is_none_or(|m| !m.text.starts_with(text.as_str())))
            .map(|(i, _)| i);

        if let Some(from) = diverged {
            self.shown.truncate(from);
            if messages.len() > from {
                writeln!(self.out)?;
            } else if messages.is_empty() {
                writeln!(self.out, "\n-- conversation cleared --")?;
            }
        }

        for (ordinal, message) in messages.iter().enumerate() {
            match self.shown.get_mut(ordinal) {
                Some(shown) => {
                    let suffix = &message.text[shown.len()..];
                    if !suffix.is_empty() {
                        write!(self.out, "{suffix}")?;
                        shown.push_str(suffix);
                    }
                }
                None => {
                    let label = match message.role {
                        Role::User => "Q",
                        Role::Assistant => "A",
                        Role::Code => "code",
                    };
                    write!(self.out, "\n#{ordinal} {label}: {}", message.text)?;
                    self.shown.push(message.text.clone());
                }
            }
        }

        if app.is_thinking && !self.thinking_shown {
            write!(self.out, "\n  Thinking...")?;
        }
        self.thinking_shown = app.is_thinking;

        if app.error != self.last_error {
            if let Some(error) = &app.error {
                write!(self.out, "\n[error: {error}]")?;
            }
            self.last_error = app.error.clone();
        }

        let in_run = app.phase.in_run();
        if self.was_in_run && !in_run {
            writeln!(self.out)?;
        }
        self.was_in_run = in_run;

        let input_open = app.input_enabled();
        if input_open && self.input_was_open == Some(false) {
            write!(self.out, "> ")?;
        }
        self.input_was_open = Some(input_open);

        self.out.flush()
    }
}
