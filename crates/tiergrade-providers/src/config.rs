//! Configuration and adjudicator factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tiergrade_core::appeal::AppealConfig;
use tiergrade_core::traits::Adjudicator;
use tiergrade_core::{EngineConfig, Tier};

use crate::adjudicator::LlmAdjudicator;
use crate::anthropic::AnthropicBackend;
use crate::mock::MockAdjudicator;
use crate::openai::OpenAiBackend;

/// Configuration for a single adjudicator backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Offline adjudicator that always answers with `score`.
    Mock {
        score: Tier,
        #[serde(default)]
        feedback: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { score, feedback } => f
                .debug_struct("Mock")
                .field("score", score)
                .field("feedback", feedback)
                .finish(),
        }
    }
}

/// Top-level tiergrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiergradeConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used by `--ai` and appeals.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model passed to the provider.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Timeout for one AI judge call, in seconds.
    #[serde(default = "default_judge_timeout")]
    pub judge_timeout_secs: u64,
    /// Numeric grading defaults.
    #[serde(default)]
    pub grading: EngineConfig,
    #[serde(default)]
    pub appeals: AppealConfig,
}

fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_judge_timeout() -> u64 {
    20
}

impl Default for TiergradeConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            judge_timeout_secs: default_judge_timeout(),
            grading: EngineConfig::default(),
            appeals: AppealConfig::default(),
        }
    }
}

impl TiergradeConfig {
    /// Build the configured default adjudicator.
    pub fn default_adjudicator(&self) -> Result<Arc<dyn Adjudicator>> {
        let provider = self.providers.get(&self.default_provider).with_context(|| {
            format!(
                "provider '{}' is not configured (add [providers.{}] to tiergrade.toml)",
                self.default_provider, self.default_provider
            )
        })?;
        create_adjudicator(&self.default_provider, provider, &self.default_model)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        // Substituted text is not scanned again.
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            org_id: org_id.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Mock { .. } => config.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tiergrade.toml` in the current directory
/// 2. `~/.config/tiergrade/config.toml`
///
/// Environment variable overrides: `TIERGRADE_ANTHROPIC_KEY`, `TIERGRADE_OPENAI_KEY`.
pub fn load_config() -> Result<TiergradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TiergradeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("tiergrade.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TiergradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TiergradeConfig::default(),
    };

    apply_env_overrides(&mut config);

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn apply_env_overrides(config: &mut TiergradeConfig) {
    if let Ok(key) = std::env::var("TIERGRADE_ANTHROPIC_KEY") {
        let entry = config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("TIERGRADE_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tiergrade"))
}

/// Create an adjudicator from its provider configuration.
pub fn create_adjudicator(
    name: &str,
    config: &ProviderConfig,
    model: &str,
) -> Result<Arc<dyn Adjudicator>> {
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            anyhow::ensure!(!api_key.is_empty(), "provider '{name}' has an empty api_key");
            Ok(Arc::new(LlmAdjudicator::new(
                AnthropicBackend::new(api_key, base_url.clone()),
                model,
            )))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            anyhow::ensure!(!api_key.is_empty(), "provider '{name}' has an empty api_key");
            Ok(Arc::new(LlmAdjudicator::new(
                OpenAiBackend::new(api_key, base_url.clone(), org_id.clone()),
                model,
            )))
        }
        ProviderConfig::Mock { score, feedback } => {
            Ok(Arc::new(MockAdjudicator::with_fixed_score(*score, feedback)))
        }
    }
}
