use std::env;

use crate::error::AppError;

/// Upper bound applied to `MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub generation: GenerationConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Model endpoint connection settings
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
    /// Azure deployment name, or the model id for OpenAI-style endpoints.
    pub deployment: String,
    pub api_version: String,
}

/// Wire flavour of the chat completions endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Azure,
    OpenAi,
}

/// Generation settings sent with every model call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// Per-agent conversation settings
#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    /// Maximum user/assistant turns per agent. `None` means unbounded.
    pub max_turns: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    /// Configuration for `endpoint` with every other setting at its default
    pub fn with_endpoint(endpoint: EndpointConfig) -> Self {
        Self {
            endpoint,
            generation: GenerationConfig::default(),
            agent: AgentConfig::default(),
            logging: LoggingConfig::default(),
            request: RequestConfig::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = first_var(&["AZURE_OPENAI_ENDPOINT", "OPENAI_ENDPOINT"]);
        let api_key = first_var(&["AZURE_OPENAI_KEY", "OPENAI_API_KEY"]);

        let (base_url, api_key) = match (base_url, api_key) {
            (Some(url), Some(key)) => (url, key),
            _ => {
                return Err(AppError::Config {
                    message: "AZURE_OPENAI_ENDPOINT (or OPENAI_ENDPOINT) and AZURE_OPENAI_KEY \
                              (or OPENAI_API_KEY) are required"
                        .to_string(),
                })
            }
        };

        let provider = match env::var("MODEL_PROVIDER")
            .unwrap_or_else(|_| "azure".to_string())
            .to_lowercase()
            .as_str()
        {
            "openai" => Provider::OpenAi,
            _ => Provider::Azure,
        };

        let endpoint = EndpointConfig {
            provider,
            base_url,
            api_key,
            deployment: first_var(&["AZURE_OPENAI_DEPLOYMENT", "AZURE_OPENAI_MODEL"])
                .unwrap_or_else(|| "gpt-4o".to_string()),
            api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-06-01".to_string()),
        };

        let defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            temperature: parsed_var("MODEL_TEMPERATURE")
                .map(|t: f64| t.clamp(0.0, 2.0))
                .unwrap_or(defaults.temperature),
            max_output_tokens: parsed_var("MODEL_MAX_OUTPUT_TOKENS")
                .unwrap_or(defaults.max_output_tokens),
        };

        let agent = AgentConfig {
            max_turns: parsed_var("AGENT_MAX_TURNS").filter(|n: &usize| *n > 0),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request_defaults = RequestConfig::default();
        let request = RequestConfig {
            timeout_ms: parsed_var("REQUEST_TIMEOUT_MS").unwrap_or(request_defaults.timeout_ms),
            max_retries: parsed_var("MAX_RETRIES")
                .map(|n: u32| n.min(MAX_RETRIES_LIMIT))
                .unwrap_or(request_defaults.max_retries),
            retry_delay_ms: parsed_var("RETRY_DELAY_MS")
                .unwrap_or(request_defaults.retry_delay_ms),
        };

        Ok(Config {
            endpoint,
            generation,
            agent,
            logging,
            request,
        })
    }
}

/// First non-empty value among the given environment variables.
fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_output_tokens: 4096,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_defaults_lean_deterministic() {
        let generation = GenerationConfig::default();
        assert_eq!(generation.temperature, 0.3);
        assert_eq!(generation.max_output_tokens, 4096);
    }

    #[test]
    fn test_request_defaults() {
        let request = RequestConfig::default();
        assert_eq!(request.timeout_ms, 60000);
        assert_eq!(request.max_retries, 3);
        assert_eq!(request.retry_delay_ms, 1000);
    }

    #[test]
    fn test_agent_config_default_is_unbounded() {
        assert_eq!(AgentConfig::default().max_turns, None);
    }

    #[test]
    fn test_with_endpoint_uses_defaults() {
        let config = Config::with_endpoint(EndpointConfig {
            provider: Provider::OpenAi,
            base_url: "http://localhost:8080".to_string(),
            api_key: "sk-test".to_string(),
            deployment: "gpt-4o-mini".to_string(),
            api_version: "2024-06-01".to_string(),
        });
        assert_eq!(config.endpoint.provider, Provider::OpenAi);
        assert_eq!(config.generation, GenerationConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.request.max_retries, 3);
    }
}
