//! Conversation messages and transcripts.

use serde::{Deserialize, Serialize};

use crate::intent::EditKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle of an editor-mode reply offered as a document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Chat,
    Editor,
}

impl Mode {
    pub fn as_tag(self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Editor => "editor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    /// Set on the inline notice appended when a request fails.
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub status: SuggestionStatus,
    pub edit: EditKind,
}

impl Message {
    pub fn user(id: String, content: impl Into<String>) -> Self {
        Self { id, role: Role::User, content: content.into(), suggestion: None, is_error: false }
    }

    pub fn assistant(id: String, content: impl Into<String>) -> Self {
        Self { id, role: Role::Assistant, content: content.into(), suggestion: None, is_error: false }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.suggestion, Some(Suggestion { status: SuggestionStatus::Pending, .. }))
    }
}

/// Ordered messages of one mode; append-only except for suggestion status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The last `max` non-error messages, or all of them when `max` is 0.
    pub fn recent(&self, max: usize) -> Vec<&Message> {
        let turns: Vec<&Message> = self.messages.iter().filter(|m| !m.is_error).collect();
        let skip = if max == 0 { 0 } else { turns.len().saturating_sub(max) };
        turns.into_iter().skip(skip).collect()
    }
}
