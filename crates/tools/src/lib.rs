//! External tools the pipeline roles invoke.
//!
//! - **Profile lookup**: structured professional-profile fetch
//! - **Web search**: query string in, raw result text out
//! - **Interests store**: the user's append-only list of focus areas
//!
//! The HTTP tools never fail with `Err`. A missing credential, a timeout or
//! a bad response all come back as a [`ToolOutput`] whose text the calling
//! role can quote, so "source unavailable" ends up in the report instead of
//! aborting the run.

pub mod interests;
pub mod profile;
pub mod search;

use async_trait::async_trait;
use std::fmt;

pub use interests::InterestsStore;
pub use profile::{PROFILE_ERROR_PREFIX, PROFILE_NOT_CONFIGURED, ProfileConfig, ProfileLookupClient};
pub use search::{
    SEARCH_ERROR_PREFIX, SEARCH_NOT_CONFIGURED, SearchConfig, WebSearchClient, build_query,
};

/// What a tool call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    /// The tool returned data.
    Data(String),
    /// No credential configured. Carries the tool's fixed sentinel text.
    NotConfigured(&'static str),
    /// Transport or API failure. Carries a prefixed error description.
    Unavailable(String),
}

impl ToolOutput {
    pub fn text(&self) -> &str {
        match self {
            ToolOutput::Data(text) | ToolOutput::Unavailable(text) => text,
            ToolOutput::NotConfigured(sentinel) => sentinel,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, ToolOutput::Data(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ToolOutput::Data(_) => "data",
            ToolOutput::NotConfigured(_) => "not_configured",
            ToolOutput::Unavailable(_) => "unavailable",
        }
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Profile fetch seam, so roles can be exercised without the network.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup(&self, profile_url: &str) -> ToolOutput;
}

/// Web search seam.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> ToolOutput;
}
