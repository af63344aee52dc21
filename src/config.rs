use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenRouter,
}

impl Provider {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_var(&self) -> &'static str {
        match self {
            Provider::Anthropic => "CLAUDE_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// Model used when `AI_MODEL` is not set. OpenRouter wants `vendor/model` ids.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => DEFAULT_MODEL,
            Provider::OpenRouter => DEFAULT_OPENROUTER_MODEL,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provider::Anthropic => "Claude",
            Provider::OpenRouter => "OpenRouter",
        };
        write!(f, "{}", s)
    }
}

/// Everything the estimator needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub provider: Provider,
    /// Missing is allowed; requests then fail with `FailedPrecondition`.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub estimator: EstimatorConfig,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("AI_PROVIDER") {
            Some(name) => Provider::from_string(&name)
                .with_context(|| format!("Unknown AI_PROVIDER '{}'", name))?,
            None => Provider::Anthropic,
        };

        let api_key = lookup(provider.key_var()).filter(|key| !key.trim().is_empty());

        let model = lookup("AI_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let max_tokens = match lookup("AI_MAX_TOKENS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("AI_MAX_TOKENS must be an integer, got '{}'", value))?,
            None => DEFAULT_MAX_TOKENS,
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            estimator: EstimatorConfig {
                provider,
                api_key,
                model,
                max_tokens,
            },
            bind_addr,
        })
    }
}
