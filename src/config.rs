//! Bridge configuration
//!
//! Upstream base URLs, timeouts, and server settings. Values come from the
//! environment (after `.env` is loaded by the binary) with localhost defaults
//! matching the stock LM Studio and Ollama ports.

use crate::error::{BridgeError, BridgeResult};
use crate::logging::log_debug;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3456;
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(5);

/// Trait for provider-specific configuration
pub trait ProviderConfig: Send + Sync + Debug {
    /// Registry key of the provider
    fn provider_name(&self) -> &'static str;

    /// Base URL for API calls
    fn base_url(&self) -> &str;

    /// Model used when a chat request does not name one
    fn default_model(&self) -> &str;

    /// Upstream timeouts
    fn timeouts(&self) -> &ProviderTimeouts;

    /// Validate provider configuration
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`] if the base URL is empty or not
    /// http(s), or a required credential is missing.
    fn validate(&self) -> BridgeResult<()> {
        validate_base_url(self.provider_name(), self.base_url())?;
        validate_timeouts(self.provider_name(), self.timeouts())
    }
}

fn validate_timeouts(provider: &str, timeouts: &ProviderTimeouts) -> BridgeResult<()> {
    if timeouts.status.is_zero() || timeouts.chat.is_zero() {
        return Err(BridgeError::configuration(format!(
            "{provider} timeouts must be greater than zero"
        )));
    }
    Ok(())
}

fn validate_base_url(provider: &str, base_url: &str) -> BridgeResult<()> {
    if base_url.is_empty() {
        return Err(BridgeError::configuration(format!(
            "{provider} base URL is required"
        )));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(BridgeError::configuration(format!(
            "{provider} base URL must start with http:// or https://, got {base_url}"
        )));
    }
    Ok(())
}

/// Per-provider upstream timeouts
///
/// Status and model-list calls are cheap and must fail fast; chat calls get
/// a generation-sized budget. A timeout counts as any other adapter failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTimeouts {
    pub status: Duration,
    pub chat: Duration,
}

impl Default for ProviderTimeouts {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS_TIMEOUT,
            chat: DEFAULT_CHAT_TIMEOUT,
        }
    }
}

/// LM Studio-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LMStudioConfig {
    pub base_url: String,
    pub default_model: String,
    pub timeouts: ProviderTimeouts,
}

impl Default for LMStudioConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".to_string(),
            default_model: "default".to_string(),
            timeouts: ProviderTimeouts::default(),
        }
    }
}

impl ProviderConfig for LMStudioConfig {
    fn provider_name(&self) -> &'static str {
        "lmstudio"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn timeouts(&self) -> &ProviderTimeouts {
        &self.timeouts
    }
}

/// Ollama-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub default_model: String,
    pub timeouts: ProviderTimeouts,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            default_model: "llama2".to_string(),
            timeouts: ProviderTimeouts::default(),
        }
    }
}

impl ProviderConfig for OllamaConfig {
    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn timeouts(&self) -> &ProviderTimeouts {
        &self.timeouts
    }
}

/// Google Gemini-specific configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub top_k: u32,
    pub top_p: f64,
    pub timeouts: ProviderTimeouts,
}

// Hand-written so the API key never lands in logs.
impl Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("top_k", &self.top_k)
            .field("top_p", &self.top_p)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            default_model: "gemini-pro".to_string(),
            top_k: 40,
            top_p: 0.95,
            timeouts: ProviderTimeouts::default(),
        }
    }
}

impl ProviderConfig for GeminiConfig {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn timeouts(&self) -> &ProviderTimeouts {
        &self.timeouts
    }

    fn validate(&self) -> BridgeResult<()> {
        validate_base_url(self.provider_name(), &self.base_url)?;
        validate_timeouts(self.provider_name(), &self.timeouts)?;
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(BridgeError::configuration("Gemini API key is required")),
        }
    }
}

/// System-wide bridge configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub lmstudio: LMStudioConfig,
    pub ollama: OllamaConfig,
    /// Registered only when an API key is configured
    pub gemini: Option<GeminiConfig>,
    pub broadcast_interval: Duration,
    /// Provider order used by the first-available model detection
    pub detect_priority: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            lmstudio: LMStudioConfig::default(),
            ollama: OllamaConfig::default(),
            gemini: None,
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
            detect_priority: vec!["lmstudio".to_string(), "ollama".to_string()],
        }
    }
}

impl BridgeConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Configuration`] if a numeric variable does not
    /// parse or a provider configuration fails validation.
    pub fn from_env() -> BridgeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("BRIDGE_HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = parse_var("PORT", &port)?;
        }

        let mut timeouts = ProviderTimeouts::default();
        if let Some(secs) = get("BRIDGE_STATUS_TIMEOUT_SECS") {
            timeouts.status = Duration::from_secs(parse_var("BRIDGE_STATUS_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("BRIDGE_CHAT_TIMEOUT_SECS") {
            timeouts.chat = Duration::from_secs(parse_var("BRIDGE_CHAT_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("BRIDGE_BROADCAST_INTERVAL_SECS") {
            let secs: u64 = parse_var("BRIDGE_BROADCAST_INTERVAL_SECS", &secs)?;
            if secs == 0 {
                return Err(BridgeError::configuration(
                    "BRIDGE_BROADCAST_INTERVAL_SECS must be greater than zero",
                ));
            }
            config.broadcast_interval = Duration::from_secs(secs);
        }

        config.lmstudio.timeouts = timeouts;
        if let Some(url) = get("LMSTUDIO_URL") {
            config.lmstudio.base_url = normalize_base_url(&url);
        }
        if let Some(model) = get("LMSTUDIO_MODEL") {
            config.lmstudio.default_model = model;
        }

        config.ollama.timeouts = timeouts;
        if let Some(url) = get("OLLAMA_URL") {
            config.ollama.base_url = normalize_base_url(&url);
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            config.ollama.default_model = model;
        }

        if let Some(api_key) = get("GEMINI_API_KEY") {
            let mut gemini = GeminiConfig {
                api_key: Some(api_key),
                timeouts,
                ..GeminiConfig::default()
            };
            if let Some(url) = get("GEMINI_URL") {
                gemini.base_url = normalize_base_url(&url);
            }
            if let Some(model) = get("GEMINI_MODEL") {
                gemini.default_model = model;
            }
            config.gemini = Some(gemini);
        }

        if let Some(priority) = get("BRIDGE_DETECT_PRIORITY") {
            config.detect_priority = priority
                .split(',')
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect();
        }

        config.validate()?;

        log_debug!(
            host = %config.host,
            port = config.port,
            lmstudio_url = %config.lmstudio.base_url,
            ollama_url = %config.ollama.base_url,
            gemini_enabled = config.gemini.is_some(),
            broadcast_interval_secs = config.broadcast_interval.as_secs(),
            "Bridge configuration loaded"
        );

        Ok(config)
    }

    /// Validate every provider configuration
    pub fn validate(&self) -> BridgeResult<()> {
        self.lmstudio.validate()?;
        self.ollama.validate()?;
        if let Some(gemini) = &self.gemini {
            gemini.validate()?;
        }
        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> BridgeResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        BridgeError::configuration(format!("{key} has invalid value '{value}'"))
    })
}

/// Strip trailing slashes so path joins never produce `//`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
