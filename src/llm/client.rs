use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, GenerationSettings, Message};
use super::ModelEndpoint;
use crate::config::{EndpointConfig, Provider, RequestConfig};
use crate::error::{EndpointError, EndpointResult};

/// Client for OpenAI-compatible chat completions endpoints (Azure or OpenAI)
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    url: String,
    provider: Provider,
    deployment: String,
    api_key: String,
    request_config: RequestConfig,
}

impl ChatClient {
    /// Create a new chat client
    pub fn new(config: &EndpointConfig, request_config: RequestConfig) -> EndpointResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(EndpointError::Http)?;

        let base_url = config.base_url.trim_end_matches('/');
        let url = match config.provider {
            Provider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base_url, config.deployment, config.api_version
            ),
            Provider::OpenAi => format!("{}/v1/chat/completions", base_url),
        };

        Ok(Self {
            client,
            url,
            provider: config.provider,
            deployment: config.deployment.clone(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Run a chat completion, retrying transient failures with backoff
    pub async fn chat(
        &self,
        messages: &[Message],
        settings: &GenerationSettings,
    ) -> EndpointResult<String> {
        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = backoff_delay(self.request_config.retry_delay_ms, retries);
                warn!(
                    deployment = %self.deployment,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying chat completion"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute_request(messages, settings).await {
                Ok(text) => {
                    info!(
                        deployment = %self.deployment,
                        latency_ms = start.elapsed().as_millis(),
                        "Chat completion succeeded"
                    );
                    return Ok(text);
                }
                Err(e) if !e.is_transient() => {
                    error!(
                        deployment = %self.deployment,
                        error = %e,
                        "Chat completion failed with non-retryable error"
                    );
                    return Err(e);
                }
                Err(e) => {
                    error!(
                        deployment = %self.deployment,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        retry = retries,
                        "Chat completion failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(EndpointError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        messages: &[Message],
        settings: &GenerationSettings,
    ) -> EndpointResult<String> {
        debug!(
            deployment = %self.deployment,
            messages = messages.len(),
            "Calling chat completions endpoint"
        );

        let body = ChatCompletionRequest {
            model: match self.provider {
                Provider::OpenAi => Some(self.deployment.as_str()),
                Provider::Azure => None,
            },
            messages,
            temperature: settings.temperature,
            max_tokens: settings.max_output_tokens,
        };

        let request = self.client.post(&self.url).json(&body);
        let request = match self.provider {
            Provider::Azure => request.header("api-key", &self.api_key),
            Provider::OpenAi => request.bearer_auth(&self.api_key),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EndpointError::Timeout {
                    timeout_ms: self.request_config.timeout_ms,
                }
            } else {
                EndpointError::Http(e)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(EndpointError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let completion: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| EndpointError::InvalidResponse {
                    message: format!("Failed to parse chat completion: {}", e),
                })?;

        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = ?usage.prompt_tokens,
                completion_tokens = ?usage.completion_tokens,
                "Token usage"
            );
        }

        completion
            .first_text()
            .ok_or_else(|| EndpointError::InvalidResponse {
                message: "Chat completion contained no choices".to_string(),
            })
    }

    /// Get the resolved request URL (for testing)
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Exponential backoff before retry number `retry` (1-based), saturating on overflow.
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let factor = 2_u64
        .checked_pow(retry.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

#[async_trait]
impl ModelEndpoint for ChatClient {
    async fn complete(
        &self,
        messages: &[Message],
        settings: &GenerationSettings,
    ) -> EndpointResult<String> {
        self.chat(messages, settings).await
    }
}
