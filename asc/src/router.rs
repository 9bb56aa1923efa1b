//! Question routing
//!
//! Decides which path a free-form backlog question takes. Only the general
//! path exists today, so the shipped classifier always answers `General`.

use tracing::debug;

/// Kinds of free-form question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Answer from the backlog text with a one-shot model call
    General,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::General => "general",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strategy for classifying a user question
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, query: &str) -> QueryKind;
}

/// Routes every question to the general path
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralClassifier;

impl QueryClassifier for GeneralClassifier {
    fn classify(&self, query: &str) -> QueryKind {
        debug!(query_len = query.len(), "GeneralClassifier::classify: called");
        QueryKind::General
    }
}
