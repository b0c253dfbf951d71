//! Critique verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rejection feedback. Never empty: [`Feedback::new`] refuses blank text, so
/// a rejected verdict always carries something to hand back to the researcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Feedback(String);

impl Feedback {
    /// Returns `None` when `text` is empty or whitespace only. The text is
    /// stored exactly as given.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Feedback {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Feedback::new(value).ok_or_else(|| "feedback must not be empty".to_string())
    }
}

impl From<Feedback> for String {
    fn from(value: Feedback) -> Self {
        value.0
    }
}

/// Outcome of one critique pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum CritiqueVerdict {
    Approved { handoff: String },
    Rejected { feedback: Feedback },
}

impl CritiqueVerdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, CritiqueVerdict::Approved { .. })
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        match self {
            CritiqueVerdict::Approved { .. } => None,
            CritiqueVerdict::Rejected { feedback } => Some(feedback),
        }
    }
}
