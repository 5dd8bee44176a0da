//! Progressive character reveal with punctuation-aware pacing.
//!
//! # Invariants
//! - Each step yields the next char and the delay to wait before showing it.
//! - `restart` resets progress; `cancel` ends the sequence immediately.

use std::time::Duration;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(30);

/// Per-character delay policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub base: Duration,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_DELAY,
        }
    }
}

impl DelayPolicy {
    /// `. ! ? :` pause 3x, `, ;` 2x, spaces go at half speed.
    pub fn delay_for(&self, ch: char) -> Duration {
        match ch {
            '.' | '!' | '?' | ':' => self.base * 3,
            ',' | ';' => self.base * 2,
            ' ' => self.base / 2,
            _ => self.base,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offset of the next char to reveal.
    cursor: usize,
    policy: DelayPolicy,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_policy(text, DelayPolicy::default())
    }

    pub fn with_policy(text: impl Into<String>, policy: DelayPolicy) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            policy,
        }
    }

    /// Text shown so far.
    pub fn revealed(&self) -> &str {
        &self.text[..self.cursor]
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// Replaces the text and starts over.
    pub fn restart(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = 0;
    }

    /// Jumps to the end; the full text counts as revealed.
    pub fn cancel(&mut self) {
        self.cursor = self.text.len();
    }

    /// Sum of all remaining delays.
    pub fn remaining_duration(&self) -> Duration {
        self.text[self.cursor..]
            .chars()
            .map(|ch| self.policy.delay_for(ch))
            .sum()
    }
}

impl Iterator for Typewriter {
    type Item = (char, Duration);

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.text[self.cursor..].chars().next()?;
        self.cursor += ch.len_utf8();
        Some((ch, self.policy.delay_for(ch)))
    }
}
