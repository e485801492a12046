use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Endpoint failure: {0}")]
    Endpoint(#[from] EndpointError),

    /// No structured record could be extracted from the model reply.
    #[error("Malformed response: no structured record found in model output")]
    MalformedResponse { raw_text: String },

    /// A record was parsed but failed schema validation.
    #[error("Contract violation in {record}: {}", .fields.join("; "))]
    ContractViolation { record: String, fields: Vec<String> },

    #[error("Agent {agent} reached its history limit of {max_turns} turns")]
    HistoryLimit { agent: String, max_turns: usize },

    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Raw model text attached to the error, when there is one.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            AppError::MalformedResponse { raw_text } => Some(raw_text),
            _ => None,
        }
    }

    /// Whether repeating the whole agent call could plausibly succeed.
    ///
    /// Malformed responses count as retryable because a fresh model call
    /// naturally produces different output.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Endpoint(e) => e.kind() == FailureKind::Transient,
            AppError::MalformedResponse { .. } => true,
            _ => false,
        }
    }
}

/// Retry classification for endpoint failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rate limits, timeouts, server-side hiccups.
    Transient,
    /// Authentication, invalid requests, undecodable replies.
    Fatal,
}

/// Model endpoint errors
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Model endpoint unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl EndpointError {
    /// Classify this failure as transient or fatal.
    pub fn kind(&self) -> FailureKind {
        match self {
            EndpointError::Unavailable { .. } | EndpointError::Timeout { .. } => {
                FailureKind::Transient
            }
            EndpointError::Api { status, .. } => match status {
                408 | 429 => FailureKind::Transient,
                s if *s >= 500 => FailureKind::Transient,
                _ => FailureKind::Fatal,
            },
            EndpointError::InvalidResponse { .. } => FailureKind::Fatal,
            EndpointError::Http(e) => {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    FailureKind::Transient
                } else {
                    FailureKind::Fatal
                }
            }
        }
    }

    /// Shorthand for `kind() == FailureKind::Transient`.
    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        let message = match err.raw_text() {
            Some(raw) => format!("{}\n--- raw model output ---\n{}", err, raw),
            None => err.to_string(),
        };
        McpError::ExecutionFailed { message }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for model endpoint operations
pub type EndpointResult<T> = Result<T, EndpointError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;
