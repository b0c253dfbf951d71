//! Web search via the Firecrawl search API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use starter_common::{Result, StarterError, Target};
use tracing::{debug, warn};

use crate::{ToolOutput, WebSearch};

pub const SEARCH_NOT_CONFIGURED: &str =
    "Web search is not configured (FIRECRAWL_API_KEY missing). No web results are available.";

pub const SEARCH_ERROR_PREFIX: &str = "Web search error:";

const DEFAULT_API_URL: &str = "https://api.firecrawl.dev/v1/search";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Results requested per query
    pub limit: u32,
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            limit: 5,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Vec<SearchHit>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Query used to find the target on the web: identity hints first, then the
/// profile URL so pages linking the profile rank too.
pub fn build_query(target: &Target) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(name) = &target.name {
        parts.push(format!("\"{name}\""));
    }
    if let Some(work) = &target.current_work {
        parts.push(work.clone());
    }
    if parts.is_empty() {
        if let Some(tail) = target.url_tail() {
            parts.push(tail.replace(['-', '_'], " "));
        }
    }
    parts.push(target.profile_url.clone());
    parts.join(" ")
}

fn render_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No web results found for query: {query}");
    }
    hits.iter()
        .map(|hit| {
            let title = hit.title.as_deref().unwrap_or("(untitled)");
            let description = hit.description.as_deref().unwrap_or("").trim();
            format!("### {title}\nSource: {}\n{description}", hit.url)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct WebSearchClient {
    config: SearchConfig,
    http_client: reqwest::Client,
}

impl WebSearchClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StarterError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl WebSearch for WebSearchClient {
    async fn search(&self, query: &str) -> ToolOutput {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            debug!("Web search skipped: no API key configured");
            return ToolOutput::NotConfigured(SEARCH_NOT_CONFIGURED);
        };

        let body = SearchRequest {
            query,
            limit: self.config.limit,
        };
        let response = match self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(query, "Web search timed out");
                return ToolOutput::Unavailable(format!(
                    "{SEARCH_ERROR_PREFIX} request timed out after {} ms",
                    self.config.timeout_ms
                ));
            }
            Err(e) => {
                warn!(query, error = %e, "Web search failed");
                return ToolOutput::Unavailable(format!("{SEARCH_ERROR_PREFIX} {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(query, status = %status, "Search API returned an error status");
            return ToolOutput::Unavailable(format!("{SEARCH_ERROR_PREFIX} HTTP {status}"));
        }

        let parsed: SearchResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                return ToolOutput::Unavailable(format!(
                    "{SEARCH_ERROR_PREFIX} malformed response: {e}"
                ));
            }
        };

        if parsed.success == Some(false) {
            let reason = parsed.error.unwrap_or_else(|| "unknown failure".to_string());
            return ToolOutput::Unavailable(format!("{SEARCH_ERROR_PREFIX} {reason}"));
        }

        debug!(query, hits = parsed.data.len(), "Web search completed");
        ToolOutput::Data(render_hits(query, &parsed.data))
    }
}
