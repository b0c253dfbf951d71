//! Profile lookup via the Proxycurl person-profile API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use starter_common::{Result, StarterError};
use tracing::{debug, warn};

use crate::{ProfileLookup, ToolOutput};

/// Returned verbatim when no profile API key is configured.
pub const PROFILE_NOT_CONFIGURED: &str = "LinkedIn API is not configured (PROXYCURL_API_KEY missing). \
Use web search (Firecrawl) instead: search for the person by name and profile URL \
to find their career, achievements, interests, articles, talks, and public presence. \
Extract the same kind of information you would from LinkedIn.";

/// Prefix of every failure text, so roles can tell "lookup failed" apart
/// from "nothing on the profile".
pub const PROFILE_ERROR_PREFIX: &str = "Profile API error:";

const DEFAULT_API_URL: &str = "https://nubela.co/proxycurl/api/v2/linkedin";
const MAX_EXPERIENCES: usize = 10;
const MAX_EDUCATION: usize = 5;
const MAX_SKILLS: usize = 20;
const MAX_CERTIFICATIONS: usize = 5;
const DESCRIPTION_PREVIEW: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Experience {
    title: Option<String>,
    company: Option<String>,
    starts_at: Option<ProfileDate>,
    ends_at: Option<ProfileDate>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileDate {
    year: Option<u32>,
    month: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Education {
    school: Option<String>,
    degree_name: Option<String>,
    field_of_study: Option<String>,
}

/// Certifications come as objects or as bare names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Certification {
    Named { name: Option<String> },
    Plain(String),
}

impl Certification {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name } => non_empty(name),
            Self::Plain(name) => Some(name.trim()).filter(|s| !s.is_empty()),
        }
    }
}

impl ProfileDate {
    fn render(&self) -> String {
        match (self.year, self.month) {
            (Some(y), Some(m)) => format!("{y}-{m:02}"),
            (Some(y), None) => y.to_string(),
            _ => "?".to_string(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_PREVIEW {
        text.to_string()
    } else {
        let cut: String = text.chars().take(DESCRIPTION_PREVIEW).collect();
        format!("{cut}...")
    }
}

/// One top-level field. A field of an unexpected shape is dropped alone.
fn field<T: DeserializeOwned>(raw: &Value, key: &str) -> Option<T> {
    let value = raw.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(field = key, error = %e, "Skipping malformed profile field");
            None
        }
    }
}

/// List entries parsed one at a time; malformed entries are skipped.
fn entries<T: DeserializeOwned>(raw: &Value, key: &str) -> Vec<T> {
    field::<Vec<Value>>(raw, key)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect()
}

/// A list of names, or any other value rendered as text.
fn text_list(raw: &Value, key: &str) -> Vec<String> {
    let text = |value: &Value| match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    match raw.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(text)
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => Some(text(other)).filter(|s| !s.is_empty()).into_iter().collect(),
    }
}

/// Concise text summary of a profile response. Each section is read on its
/// own. An object with none of the known fields falls back to its raw JSON.
fn format_profile(raw: &Value) -> String {
    let experiences: Vec<Experience> = entries(raw, "experiences");
    let education: Vec<Education> = entries(raw, "education");
    let skills = text_list(raw, "skills");
    let languages = text_list(raw, "languages");
    let certifications: Vec<Certification> = entries(raw, "certifications");
    let mut parts = Vec::new();

    for (key, label) in [("full_name", "Name"), ("headline", "Headline"), ("summary", "Summary")] {
        if let Some(value) = non_empty(&field(raw, key)) {
            parts.push(format!("{label}: {value}"));
        }
    }

    if !experiences.is_empty() {
        parts.push("\n## Experience".to_string());
        for exp in experiences.iter().take(MAX_EXPERIENCES) {
            let start = exp.starts_at.as_ref().map_or("?".to_string(), ProfileDate::render);
            let end = exp
                .ends_at
                .as_ref()
                .map_or("Present".to_string(), ProfileDate::render);
            parts.push(format!(
                "- {} at {} ({start} to {end})",
                non_empty(&exp.title).unwrap_or("N/A"),
                non_empty(&exp.company).unwrap_or("N/A"),
            ));
            if let Some(desc) = non_empty(&exp.description) {
                parts.push(format!("  {}", preview(desc)));
            }
        }
    }

    if !education.is_empty() {
        parts.push("\n## Education".to_string());
        for edu in education.iter().take(MAX_EDUCATION) {
            let degree = non_empty(&edu.degree_name)
                .or(non_empty(&edu.field_of_study))
                .unwrap_or("");
            parts.push(format!(
                "- {} - {degree}",
                non_empty(&edu.school).unwrap_or("N/A")
            ));
        }
    }

    if !skills.is_empty() {
        parts.push("\n## Skills".to_string());
        parts.push(
            skills
                .iter()
                .take(MAX_SKILLS)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    if !languages.is_empty() {
        parts.push("\n## Languages".to_string());
        parts.push(languages.join(", "));
    }

    if !certifications.is_empty() {
        parts.push("\n## Certifications".to_string());
        for cert in certifications.iter().take(MAX_CERTIFICATIONS) {
            parts.push(format!("- {}", cert.name().unwrap_or("N/A")));
        }
    }

    if parts.is_empty() {
        raw.to_string()
    } else {
        parts.join("\n")
    }
}

pub struct ProfileLookupClient {
    config: ProfileConfig,
    http_client: reqwest::Client,
}

impl ProfileLookupClient {
    pub fn new(config: ProfileConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StarterError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn describe_transport_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!(
                "{PROFILE_ERROR_PREFIX} request timed out after {} ms",
                self.config.timeout_ms
            )
        } else if err.is_connect() {
            format!("{PROFILE_ERROR_PREFIX} could not connect: {err}")
        } else {
            format!("{PROFILE_ERROR_PREFIX} {err}")
        }
    }
}

#[async_trait]
impl ProfileLookup for ProfileLookupClient {
    async fn lookup(&self, profile_url: &str) -> ToolOutput {
        let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) else {
            debug!("Profile lookup skipped: no API key configured");
            return ToolOutput::NotConfigured(PROFILE_NOT_CONFIGURED);
        };

        let response = match self
            .http_client
            .get(&self.config.api_url)
            .bearer_auth(api_key)
            .query(&[("url", profile_url)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                let text = self.describe_transport_error(&e);
                warn!(profile_url, error = %e, "Profile lookup failed");
                return ToolOutput::Unavailable(text);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(profile_url, status = %status, "Profile API returned an error status");
            return ToolOutput::Unavailable(format!(
                "{PROFILE_ERROR_PREFIX} HTTP {status} for {profile_url}"
            ));
        }

        match response.json::<Value>().await {
            Ok(raw) => ToolOutput::Data(format_profile(&raw)),
            Err(e) => {
                warn!(profile_url, error = %e, "Profile API returned malformed JSON");
                ToolOutput::Unavailable(format!(
                    "{PROFILE_ERROR_PREFIX} malformed response: {e}"
                ))
            }
        }
    }
}
