//! Design assistant: prompt classification, completion client and chat
//! session.
//!
//! # Responsibility
//! - Turn free-text questions into prompt templates filled with project data.
//! - Talk to the hosted text-completion service.
//!
//! # Invariants
//! - The assistant only reads project data; it never mutates the graph.

pub mod classify;
pub mod completion;
pub mod gemini;
pub mod prompt;
pub mod session;
pub mod typewriter;

/// Prompt seed offered as a one-click shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub id: &'static str,
    pub label: &'static str,
    /// Text placed in the input box; seeds ending in a space expect the
    /// user to finish the sentence.
    pub prompt: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 4] = [
    QuickAction {
        id: "generate",
        label: "Generate Design",
        prompt: "Help me design a system for ",
    },
    QuickAction {
        id: "optimize",
        label: "Optimize Current",
        prompt: "How can I optimize my current system design?",
    },
    QuickAction {
        id: "scale",
        label: "Scaling Strategy",
        prompt: "What scaling strategies should I consider for ",
    },
    QuickAction {
        id: "security",
        label: "Security Review",
        prompt: "Review the security aspects of my system design",
    },
];

pub fn quick_action(id: &str) -> Option<&'static QuickAction> {
    QUICK_ACTIONS.iter().find(|action| action.id == id)
}
