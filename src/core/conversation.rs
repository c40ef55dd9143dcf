use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Input the assistant sent to its sandboxed code interpreter.
    Code,
}

/// One entry in the log. Its ordinal is its index; there is no other identity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Ordered message log. Append-only, except that the open message of a
/// streaming run grows in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, ordinal: usize) -> Option<&Message> {
        self.messages.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message and returns its ordinal.
    pub fn push(&mut self, role: Role, text: impl Into<String>) -> usize {
        self.messages.push(Message::new(role, text));
        self.messages.len() - 1
    }

    /// Appends text to the message at `ordinal`. Returns false if there is none.
    pub fn append(&mut self, ordinal: usize, text: &str) -> bool {
        match self.messages.get_mut(ordinal) {
            Some(message) => {
                message.text.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Replaces every literal occurrence of `from` in the message at `ordinal`.
    pub fn replace_all(&mut self, ordinal: usize, from: &str, to: &str) {
        if from.is_empty() {
            return;
        }
        if let Some(message) = self.messages.get_mut(ordinal)
            && message.text.contains(from)
        {
            message.text = message.text.replace(from, to);
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of questions the user has asked in this log.
    pub fn query_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }
}
