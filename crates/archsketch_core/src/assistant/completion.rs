//! Text-completion collaborator contract.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Completion failure, already mapped to a user-presentable cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// No credential configured; no call was attempted.
    Unavailable,
    EmptyResponse,
    InvalidApiKey,
    QuotaExceeded,
    ModelNotFound,
    Http { status: u16, message: String },
    Network(String),
    Decode(String),
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "AI service is not available. Please check your API key."),
            Self::EmptyResponse => write!(f, "empty response from AI service"),
            Self::InvalidApiKey => write!(
                f,
                "Invalid API key. Please check your Gemini API key configuration."
            ),
            Self::QuotaExceeded => write!(f, "API quota exceeded. Please check your usage limits."),
            Self::ModelNotFound => write!(f, "AI model not available. Please try again later."),
            Self::Http { status, message } => {
                write!(f, "AI service returned HTTP {status}: {message}")
            }
            Self::Network(message) => write!(f, "AI service unreachable: {message}"),
            Self::Decode(message) => write!(f, "unexpected AI service response: {message}"),
        }
    }
}

impl Error for CompletionError {}

/// `complete(prompt) -> text` capability.
pub trait TextCompletion {
    /// Whether a credential is configured. When `false`, `complete` fails
    /// with `CompletionError::Unavailable` without any I/O.
    fn is_available(&self) -> bool;

    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

impl<T: TextCompletion + ?Sized> TextCompletion for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt)
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for &T {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        (**self).complete(prompt)
    }
}

/// Stand-in used when no credential is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCompletion;

impl TextCompletion for UnavailableCompletion {
    fn is_available(&self) -> bool {
        false
    }

    fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable)
    }
}
