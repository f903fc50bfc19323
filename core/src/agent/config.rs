use crate::agent::AgentError;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_TOOL_TURNS: usize = 8;

/// Model binding for the turn runner
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Base URL of an OpenAI-compatible API; `chat/completions` is appended
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Suppresses per-turn trace records
    pub tracing_disabled: bool,
    /// Upper bound on model round-trips in one turn
    pub max_tool_turns: usize,
}

impl RunConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            tracing_disabled: true,
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tool_turns(mut self, max_tool_turns: usize) -> Self {
        self.max_tool_turns = max_tool_turns.max(1);
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_disabled = !enabled;
        self
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY")
            .ok_or_else(|| AgentError::Configuration("Missing GEMINI_API_KEY".to_string()))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = get("COINCHAT_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(model) = get("COINCHAT_MODEL") {
            config = config.with_model(model);
        }
        if let Some(turns) = get("COINCHAT_MAX_TOOL_TURNS") {
            let turns: usize = turns.trim().parse().map_err(|_| {
                AgentError::Configuration(format!("COINCHAT_MAX_TOOL_TURNS is not a number: {}", turns))
            })?;
            config = config.with_max_tool_turns(turns);
        }
        if let Some(flag) = get("COINCHAT_TRACING") {
            let flag = flag.trim().to_lowercase();
            config = config.with_tracing(flag == "1" || flag == "true");
        }

        Ok(config)
    }

    /// Full chat-completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("tracing_disabled", &self.tracing_disabled)
            .field("max_tool_turns", &self.max_tool_turns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = RunConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, AgentError::Configuration("Missing GEMINI_API_KEY".to_string()));

        let err = RunConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tool_turns, DEFAULT_MAX_TOOL_TURNS);
        assert!(config.tracing_disabled);
        assert_eq!(
            config.completions_url(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
    }

    #[test]
    fn test_overrides() {
        let config = RunConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("COINCHAT_BASE_URL", "http://localhost:9000/v1"),
            ("COINCHAT_MODEL", "other-model"),
            ("COINCHAT_MAX_TOOL_TURNS", "3"),
            ("COINCHAT_TRACING", "true"),
        ]))
        .unwrap();

        assert_eq!(config.completions_url(), "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.model, "other-model");
        assert_eq!(config.max_tool_turns, 3);
        assert!(!config.tracing_disabled);
    }

    #[test]
    fn test_bad_turn_limit() {
        let err = RunConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("COINCHAT_MAX_TOOL_TURNS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));

        let config = RunConfig::new("k").with_max_tool_turns(0);
        assert_eq!(config.max_tool_turns, 1);
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", RunConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
