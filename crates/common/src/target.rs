//! The person a pipeline run is about.

use serde::{Deserialize, Serialize};

/// Profile URL plus the optional hints used to tell same-named people apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub profile_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_work: Option<String>,
}

impl Target {
    pub fn new(profile_url: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into().trim().to_string(),
            name: None,
            current_work: None,
        }
    }

    /// Blank values are treated as absent.
    pub fn with_name(mut self, name: Option<impl Into<String>>) -> Self {
        self.name = non_blank(name);
        self
    }

    pub fn with_current_work(mut self, current_work: Option<impl Into<String>>) -> Self {
        self.current_work = non_blank(current_work);
        self
    }

    /// Last non-empty path segment of the profile URL, e.g. `jdoe`.
    pub fn url_tail(&self) -> Option<&str> {
        self.profile_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty() && !s.contains(':'))
    }
}

fn non_blank(value: Option<impl Into<String>>) -> Option<String> {
    value
        .map(Into::into)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
