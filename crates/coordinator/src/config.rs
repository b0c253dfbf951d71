//! Pipeline configuration.
//!
//! Every field has a default, so running without a config file works. API
//! keys are resolved once by [`PipelineConfig::resolve_credentials`] and then
//! handed to each client by value; no client reads the environment itself.

use serde::{Deserialize, Serialize};
use starter_llm::LlmConfig;
use starter_tools::{ProfileConfig, SearchConfig};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const PROFILE_KEY_ENV: &str = "PROXYCURL_API_KEY";
pub const SEARCH_KEY_ENV: &str = "FIRECRAWL_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub llm: LlmConfig,

    /// Model for the researcher and report writer. `None` picks the
    /// provider's strong default, or `llm.model` when it has none.
    pub strong_model: Option<String>,

    pub profile: ProfileConfig,

    pub search: SearchConfig,

    pub pipeline: LoopConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Re-delegations to the researcher after a rejection.
    pub max_iterations: u32,

    pub interests_path: PathBuf,

    pub reports_dir: PathBuf,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            interests_path: PathBuf::from("my_interests.md"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            strong_model: None,
            profile: ProfileConfig::default(),
            search: SearchConfig::default(),
            pipeline: LoopConfig::default(),
        }
    }
}

/// Which credentials ended up configured after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialReport {
    pub llm: bool,
    pub profile: bool,
    pub search: bool,
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Keys stored in the file are accepted with a warning. On Unix a
    /// world-writable file is refused.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))?;

        let keys_in_file = [
            config.llm.api_key.is_some(),
            config.profile.api_key.is_some(),
            config.search.api_key.is_some(),
        ];
        if keys_in_file.iter().any(|k| *k) {
            warn!(
                "API key found in config file '{}'. Prefer environment variables \
                 (OPENAI_API_KEY, ANTHROPIC_API_KEY, {}, {}).",
                path.display(),
                PROFILE_KEY_ENV,
                SEARCH_KEY_ENV
            );
        }

        Ok(config)
    }

    /// Fill every missing key from `env`, explicit config values first.
    ///
    /// Blank values count as missing. A missing LLM key is only warned
    /// about; the tools degrade to their "not configured" answers.
    pub fn resolve_credentials<F>(&mut self, env: F) -> CredentialReport
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |current: &mut Option<String>, var: &str| {
            let explicit = current.take().filter(|k| !k.trim().is_empty());
            *current = explicit.or_else(|| env(var).filter(|k| !k.trim().is_empty()));
            current.is_some()
        };

        let llm = match self.llm.api_key_env() {
            Some(var) => resolve(&mut self.llm.api_key, var),
            None => self.llm.api_key.is_some(),
        };
        let profile = resolve(&mut self.profile.api_key, PROFILE_KEY_ENV);
        let search = resolve(&mut self.search.api_key, SEARCH_KEY_ENV);

        if !llm {
            warn!(
                provider = %self.llm.provider,
                env = self.llm.api_key_env().unwrap_or("<none>"),
                "No LLM API key configured; model calls will fail"
            );
        }
        if !profile {
            warn!("{PROFILE_KEY_ENV} not set; profile lookup will report that it is not configured");
        }
        if !search {
            warn!("{SEARCH_KEY_ENV} not set; web search will report that it is not configured");
        }

        CredentialReport {
            llm,
            profile,
            search,
        }
    }

    /// Resolve against the process environment.
    pub fn resolve_credentials_from_env(&mut self) -> CredentialReport {
        self.resolve_credentials(|var| std::env::var(var).ok())
    }

    /// LLM settings for the researcher and report writer.
    pub fn strong_llm(&self) -> LlmConfig {
        let model = self
            .strong_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| default_strong_model(&self.llm.provider));
        match model {
            Some(model) => self.llm.with_model(model),
            None => self.llm.clone(),
        }
    }
}

fn default_strong_model(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("gpt-4o"),
        _ => None,
    }
}

#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!("Config path '{}' is not a regular file.", path.display());
    }

    let permission_bits = metadata.permissions().mode() & 0o777;
    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}
