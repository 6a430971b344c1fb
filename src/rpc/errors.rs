use solana_client::client_error::ClientError;
use thiserror::Error;

/// RPC transport error types, classified from the client's error text
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Request timed out (endpoint: {endpoint})")]
    Timeout { endpoint: String },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded (endpoint: {endpoint})")]
    RateLimitExceeded { endpoint: String },

    #[error("Blockhash not found (endpoint: {endpoint})")]
    BlockhashNotFound { endpoint: String },

    #[error("Transaction not found: {signature} (endpoint: {endpoint})")]
    TransactionNotFound { signature: String, endpoint: String },

    /// Endpoint URL could not be used
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Response could not be interpreted
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },
}

impl RpcError {
    /// Get the endpoint associated with this error
    pub fn endpoint(&self) -> &str {
        match self {
            RpcError::Transport { endpoint, .. }
            | RpcError::Timeout { endpoint }
            | RpcError::RpcResponse { endpoint, .. }
            | RpcError::RateLimitExceeded { endpoint }
            | RpcError::BlockhashNotFound { endpoint }
            | RpcError::TransactionNotFound { endpoint, .. }
            | RpcError::InvalidEndpoint { endpoint, .. }
            | RpcError::MalformedResponse { endpoint, .. } => endpoint,
        }
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        Self::classify(&err.to_string(), endpoint)
    }

    /// Classify based on error message
    pub fn classify(message: &str, endpoint: &str) -> Self {
        let err_str = message.to_lowercase();
        let endpoint = endpoint.to_string();

        if err_str.contains("blockhash not found") {
            RpcError::BlockhashNotFound { endpoint }
        } else if err_str.contains("rate limit")
            || err_str.contains("too many requests")
            || err_str.contains("429")
        {
            RpcError::RateLimitExceeded { endpoint }
        } else if err_str.contains("timeout") || err_str.contains("timed out") {
            RpcError::Timeout { endpoint }
        } else if err_str.contains("error sending request")
            || err_str.contains("connection refused")
            || err_str.contains("connection reset")
        {
            RpcError::Transport {
                endpoint,
                message: message.to_string(),
            }
        } else {
            // Extract error code if available
            let code = err_str
                .split("code:")
                .nth(1)
                .and_then(|s| s.split_whitespace().next())
                .map(|s| s.trim_end_matches(|c: char| !c.is_ascii_digit()))
                .and_then(|s| s.parse::<i64>().ok());

            RpcError::RpcResponse {
                endpoint,
                message: message.to_string(),
                code,
            }
        }
    }
}
