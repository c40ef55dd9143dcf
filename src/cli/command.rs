//! Parsing of REPL input lines. Anything not starting with `/` is a query.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Clear,
    Bookmark(usize),
    Bookmarks,
    Save(Option<String>),
    Load(String),
    Sessions,
    History,
    Export(Option<PathBuf>),
    /// Extract citations from a message, or show the panel when `None`.
    Citations(Option<usize>),
    /// 1-based index into the example queries.
    Example(usize),
    Help,
    Quit,
    /// Bad usage; carries the message to show.
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <question>         ask a question
  /example N         ask example question N (1-4)
  /bookmark N        toggle a bookmark on message #N
  /bookmarks         list bookmarked answers
  /citations [N]     extract citations from message #N, or show the panel
  /history           recent questions
  /save [name]       save this session
  /load <name>       load a saved session
  /sessions          list saved sessions
  /export [path]     write a transcript
  /clear             start over on a new thread
  /help              this help
  /quit              exit";

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Query(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let arg = (!arg.is_empty()).then_some(arg);

    match name {
        "clear" => Command::Clear,
        "bookmark" => match arg.and_then(|a| a.parse().ok()) {
            Some(n) => Command::Bookmark(n),
            None => Command::Invalid("usage: /bookmark N".into()),
        },
        "bookmarks" => Command::Bookmarks,
        "save" => Command::Save(arg.map(str::to_string)),
        "load" => match arg {
            Some(name) => Command::Load(name.to_string()),
            None => Command::Invalid("usage: /load <name>".into()),
        },
        "sessions" => Command::Sessions,
        "history" => Command::History,
        "export" => Command::Export(arg.map(PathBuf::from)),
        "citations" => match arg {
            None => Command::Citations(None),
            Some(a) => match a.parse() {
                Ok(n) => Command::Citations(Some(n)),
                Err(_) => Command::Invalid("usage: /citations [N]".into()),
            },
        },
        "example" => match arg.and_then(|a| a.parse().ok()) {
            Some(n) => Command::Example(n),
            None => Command::Invalid("usage: /example N".into()),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command: /{other} (try /help)")),
    }
}
