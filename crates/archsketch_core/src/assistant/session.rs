//! Chat session state: history, pending request and typewriter reveal.
//!
//! # Responsibility
//! - Gate submissions (blank input, busy session, unavailable service).
//! - Record user and assistant messages in order.
//! - Split a request into `begin` and `resolve` so a host can run the
//!   completion call off its UI thread.
//!
//! # Invariants
//! - At most one request is pending; input stays disabled while a request
//!   is pending or an answer is being revealed.
//! - A failed completion always ends in an apology message, never in a
//!   dangling pending state.

use super::classify::{classify, RequestKind};
use super::completion::{CompletionError, TextCompletion};
use super::prompt::build_prompt;
use super::typewriter::Typewriter;
use crate::model::project::Project;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const FALLBACK_APOLOGY: &str = "Sorry, I encountered an error while processing your request. Please try again or check your API configuration.";

pub type MessageId = u64;

#[derive(Debug)]
pub enum AssistantError {
    EmptyInput,
    /// A request is pending or an answer is still being revealed.
    Busy,
    Unavailable,
    /// `resolve` called with a ticket this session is not waiting on.
    StaleRequest(MessageId),
    Prompt(serde_json::Error),
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "type a question first"),
            Self::Busy => write!(f, "the assistant is still answering"),
            Self::Unavailable => {
                write!(f, "AI service is not available. Please check your API key.")
            }
            Self::StaleRequest(id) => write!(f, "no pending request #{id}"),
            Self::Prompt(err) => write!(f, "failed to build prompt: {err}"),
        }
    }
}

impl Error for AssistantError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Prompt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(value: serde_json::Error) -> Self {
        Self::Prompt(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Typewriter reveal still running for this message.
    pub revealing: bool,
}

/// A submitted prompt awaiting its completion result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    pub ticket: MessageId,
    pub kind: RequestKind,
    pub prompt: String,
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Answer appended; its reveal is running.
    Answered(MessageId),
    /// Apology appended; carries the cause for the transient notice.
    Failed {
        message_id: MessageId,
        cause: CompletionError,
    },
}

#[derive(Debug, Default)]
pub struct AssistantSession {
    messages: Vec<ChatMessage>,
    next_id: MessageId,
    pending: Option<MessageId>,
    revealing: Option<MessageId>,
}

impl AssistantSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_revealing(&self) -> bool {
        self.revealing.is_some()
    }

    pub fn is_input_enabled(&self) -> bool {
        !self.is_pending() && !self.is_revealing()
    }

    /// Validates `input`, records it and prepares the prompt.
    pub fn begin(
        &mut self,
        input: &str,
        project: Option<&Project>,
        service: &dyn TextCompletion,
    ) -> Result<PendingPrompt, AssistantError> {
        if input.trim().is_empty() {
            return Err(AssistantError::EmptyInput);
        }
        if !self.is_input_enabled() {
            return Err(AssistantError::Busy);
        }
        if !service.is_available() {
            return Err(AssistantError::Unavailable);
        }

        let kind = classify(input, project.is_some());
        let prompt = build_prompt(&kind, input, project)?;
        let ticket = self.push(Role::User, input.to_string(), false);
        self.pending = Some(ticket);
        info!(
            "event=assistant_begin module=assistant status=ok kind={}",
            kind.as_str()
        );
        Ok(PendingPrompt {
            ticket,
            kind,
            prompt,
        })
    }

    /// Records the outcome of `pending`.
    pub fn resolve(
        &mut self,
        pending: &PendingPrompt,
        result: Result<String, CompletionError>,
    ) -> Result<Resolution, AssistantError> {
        if self.pending != Some(pending.ticket) {
            return Err(AssistantError::StaleRequest(pending.ticket));
        }
        self.pending = None;

        match result {
            Ok(text) => {
                let id = self.push(Role::Assistant, text, true);
                self.revealing = Some(id);
                Ok(Resolution::Answered(id))
            }
            Err(cause) => {
                warn!(
                    "event=assistant_resolve module=assistant status=error kind={}",
                    pending.kind.as_str()
                );
                let message_id = self.push(Role::Assistant, FALLBACK_APOLOGY.to_string(), false);
                Ok(Resolution::Failed { message_id, cause })
            }
        }
    }

    /// Runs `begin`, the completion call and `resolve` in one step.
    pub fn ask(
        &mut self,
        input: &str,
        project: Option<&Project>,
        service: &dyn TextCompletion,
    ) -> Result<Resolution, AssistantError> {
        let pending = self.begin(input, project, service)?;
        let result = service.complete(&pending.prompt);
        self.resolve(&pending, result)
    }

    /// Typewriter over the message being revealed.
    pub fn typewriter(&self) -> Option<Typewriter> {
        let id = self.revealing?;
        self.message(id)
            .map(|message| Typewriter::new(message.content.clone()))
    }

    /// Marks the reveal of `id` as done and re-enables input.
    ///
    /// Returns `false` when `id` was not being revealed.
    pub fn finish_reveal(&mut self, id: MessageId) -> bool {
        if self.revealing != Some(id) {
            return false;
        }
        self.revealing = None;
        if let Some(message) = self.messages.iter_mut().find(|message| message.id == id) {
            message.revealing = false;
        }
        true
    }

    fn push(&mut self, role: Role, content: String, revealing: bool) -> MessageId {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(ChatMessage {
            id,
            role,
            content,
            revealing,
        });
        id
    }
}
