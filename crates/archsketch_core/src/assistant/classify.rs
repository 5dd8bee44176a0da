//! Keyword classification of free-text assistant input.

use once_cell::sync::Lazy;
use regex::Regex;

static EXPLAIN_SUBJECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:explain|what is)\s+(?:(?:a|an|the)\s+)?(\w+)").expect("valid explain regex")
});

/// Request shape chosen for a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    OptimizeCurrent,
    /// `component` is empty when no subject word follows the keyword.
    ExplainComponent { component: String },
    LoadTestStrategy,
    GenericDesign,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OptimizeCurrent => "optimize",
            Self::ExplainComponent { .. } => "explain",
            Self::LoadTestStrategy => "load_test",
            Self::GenericDesign => "generic",
        }
    }
}

/// First match wins: optimize (only with a current project), explain,
/// load test, then generic. Matching is case-insensitive.
pub fn classify(input: &str, has_current_project: bool) -> RequestKind {
    let lower = input.to_lowercase();
    if has_current_project && lower.contains("optimize") {
        return RequestKind::OptimizeCurrent;
    }
    if lower.contains("explain") || lower.contains("what is") {
        let component = EXPLAIN_SUBJECT_RE
            .captures(&lower)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return RequestKind::ExplainComponent { component };
    }
    if lower.contains("load test") || lower.contains("performance") {
        return RequestKind::LoadTestStrategy;
    }
    RequestKind::GenericDesign
}
