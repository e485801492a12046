//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use autofix_agents::config::{Config, LogFormat, Provider, MAX_RETRIES_LIMIT};
use autofix_agents::AppError;
use serial_test::serial;
use std::env;

const MANAGED_VARS: &[&str] = &[
    "AZURE_OPENAI_ENDPOINT",
    "OPENAI_ENDPOINT",
    "AZURE_OPENAI_KEY",
    "OPENAI_API_KEY",
    "AZURE_OPENAI_DEPLOYMENT",
    "AZURE_OPENAI_MODEL",
    "AZURE_OPENAI_API_VERSION",
    "MODEL_PROVIDER",
    "MODEL_TEMPERATURE",
    "MODEL_MAX_OUTPUT_TOKENS",
    "AGENT_MAX_TURNS",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "REQUEST_TIMEOUT_MS",
    "MAX_RETRIES",
    "RETRY_DELAY_MS",
];

fn clear_env() {
    for name in MANAGED_VARS {
        env::remove_var(name);
    }
}

/// Reset every managed variable, then set the required Azure pair.
fn with_azure_credentials() {
    clear_env();
    env::set_var("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com");
    env::set_var("AZURE_OPENAI_KEY", "azure-key");
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    with_azure_credentials();

    let config = Config::from_env().unwrap();
    assert_eq!(config.endpoint.provider, Provider::Azure);
    assert_eq!(config.endpoint.base_url, "https://example.openai.azure.com");
    assert_eq!(config.endpoint.api_key, "azure-key");
    assert_eq!(config.endpoint.deployment, "gpt-4o");
    assert_eq!(config.endpoint.api_version, "2024-06-01");
    assert_eq!(config.generation.temperature, 0.3);
    assert_eq!(config.generation.max_output_tokens, 4096);
    assert_eq!(config.agent.max_turns, None);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.request.timeout_ms, 60000);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_missing_credentials() {
    clear_env();
    env::set_var("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
    assert!(err.to_string().contains("AZURE_OPENAI_KEY"));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_blank_key_counts_as_missing() {
    with_azure_credentials();
    env::set_var("AZURE_OPENAI_KEY", "   ");

    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_openai_fallback_names() {
    clear_env();
    env::set_var("OPENAI_ENDPOINT", "https://api.openai.com");
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("MODEL_PROVIDER", "OpenAI");
    env::set_var("AZURE_OPENAI_MODEL", "gpt-4o-mini");

    let config = Config::from_env().unwrap();
    assert_eq!(config.endpoint.provider, Provider::OpenAi);
    assert_eq!(config.endpoint.base_url, "https://api.openai.com");
    assert_eq!(config.endpoint.api_key, "sk-test");
    assert_eq!(config.endpoint.deployment, "gpt-4o-mini");

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_custom_generation() {
    with_azure_credentials();
    env::set_var("MODEL_TEMPERATURE", "0.0");
    env::set_var("MODEL_MAX_OUTPUT_TOKENS", "1024");

    let config = Config::from_env().unwrap();
    assert_eq!(config.generation.temperature, 0.0);
    assert_eq!(config.generation.max_output_tokens, 1024);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_temperature_clamped() {
    with_azure_credentials();
    env::set_var("MODEL_TEMPERATURE", "5");

    let config = Config::from_env().unwrap();
    assert_eq!(config.generation.temperature, 2.0);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_invalid_number_uses_default() {
    with_azure_credentials();
    env::set_var("MODEL_MAX_OUTPUT_TOKENS", "lots");

    let config = Config::from_env().unwrap();
    assert_eq!(config.generation.max_output_tokens, 4096);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_agent_max_turns() {
    with_azure_credentials();
    env::set_var("AGENT_MAX_TURNS", "4");
    assert_eq!(Config::from_env().unwrap().agent.max_turns, Some(4));

    env::set_var("AGENT_MAX_TURNS", "0");
    assert_eq!(Config::from_env().unwrap().agent.max_turns, None);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    with_azure_credentials();
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_custom_request() {
    with_azure_credentials();
    env::set_var("REQUEST_TIMEOUT_MS", "30000");
    env::set_var("MAX_RETRIES", "5");
    env::set_var("RETRY_DELAY_MS", "2000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.request.max_retries, 5);
    assert_eq!(config.request.retry_delay_ms, 2000);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_max_retries_capped() {
    with_azure_credentials();
    env::set_var("MAX_RETRIES", "60");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.max_retries, MAX_RETRIES_LIMIT);

    clear_env();
}
