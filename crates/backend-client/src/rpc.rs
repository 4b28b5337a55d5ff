//! Backend RPC client
//!
//! This module implements the function-call protocol spoken by the backend
//! data service: every query or mutation is a `POST` to `/api/query` or
//! `/api/mutation` carrying the function path and its arguments, answered by a
//! `{"status": "success" | "error", ...}` envelope.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Error Types
// =============================================================================

/// RPC error with HTTP status and message
///
/// This represents both transport failures (status `0`) and errors reported
/// by the backend, either as a non-2xx response or as an error envelope.
///
/// # Examples
/// ```
/// use backend_client::rpc::RpcError;
///
/// let error = RpcError::new(503, "ServiceUnavailable", "Deployment is paused");
/// assert_eq!(error.status(), 503);
/// assert!(error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    /// HTTP status code (`0` when no response was received)
    status: u16,
    /// Error code (e.g., "NetworkError", "FunctionError")
    code: String,
    /// Human-readable error message
    message: String,
}

impl RpcError {
    /// Create a new RPC error
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the error code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a network-related error that may succeed on retry
    ///
    /// Status `0` means the request never produced a response.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.status,
            0 | 408 | 425 | 429 | 500 | 502 | 503 | 504 | 522 | 524
        )
    }

    /// Check if the request timed out
    pub fn is_timeout(&self) -> bool {
        self.code == "Timeout"
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error {}: {} - {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

// =============================================================================
// Request Types
// =============================================================================

/// Kind of backend function being invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Read-only query
    Query,
    /// State-changing mutation
    Mutation,
}

impl FunctionKind {
    /// The API endpoint segment for this kind
    pub fn endpoint(&self) -> &'static str {
        match self {
            FunctionKind::Query => "query",
            FunctionKind::Mutation => "mutation",
        }
    }
}

/// A call to a backend function
#[derive(Debug, Clone)]
pub struct RpcRequest {
    /// Function kind
    pub kind: FunctionKind,
    /// Function path (e.g., "posts:getFeedPosts")
    pub path: String,
    /// Function arguments (always a JSON object)
    pub args: serde_json::Value,
    /// Extra request headers
    pub headers: HashMap<String, String>,
}

impl RpcRequest {
    /// Create a query request
    pub fn query(path: impl Into<String>) -> Self {
        Self {
            kind: FunctionKind::Query,
            path: path.into(),
            args: serde_json::Value::Object(Default::default()),
            headers: HashMap::new(),
        }
    }

    /// Create a mutation request
    pub fn mutation(path: impl Into<String>) -> Self {
        Self {
            kind: FunctionKind::Mutation,
            path: path.into(),
            args: serde_json::Value::Object(Default::default()),
            headers: HashMap::new(),
        }
    }

    /// Set the arguments from any serializable value
    pub fn args<T: Serialize>(mut self, args: &T) -> Result<Self, serde_json::Error> {
        self.args = serde_json::to_value(args)?;
        Ok(self)
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Wire body sent for every function call
#[derive(Debug, Serialize)]
struct CallBody<'a> {
    path: &'a str,
    args: &'a serde_json::Value,
    format: &'static str,
}

// =============================================================================
// Response Types
// =============================================================================

/// Result envelope returned with a 2xx status
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Success {
        #[serde(default)]
        value: serde_json::Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorResponse {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the RPC client
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Deployment URL of the backend (e.g., "https://happy-otter-123.convex.cloud")
    pub deployment_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            deployment_url: "http://127.0.0.1:3210".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Campus-Feed/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl RpcClientConfig {
    /// Create a new config with a deployment URL
    pub fn new(deployment_url: impl Into<String>) -> Self {
        Self {
            deployment_url: deployment_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Client
// =============================================================================

/// RPC client for the backend data service
///
/// Clones share the same connection pool and bearer token.
///
/// # Examples
/// ```no_run
/// use backend_client::rpc::{RpcClient, RpcClientConfig, RpcRequest};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = RpcClient::new(RpcClientConfig::new("https://happy-otter-123.convex.cloud"))?;
///
///     let posts: serde_json::Value = client.call(RpcRequest::query("posts:getFeedPosts")).await?;
///     println!("{posts}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    config: RpcClientConfig,
    auth_token: Arc<parking_lot::RwLock<Option<String>>>,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(config: RpcClientConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RpcError::new(0, "ClientBuild", e.to_string()))?;

        Ok(Self {
            client,
            config,
            auth_token: Arc::new(parking_lot::RwLock::new(None)),
        })
    }

    /// Attach a bearer token to every subsequent request
    pub fn set_auth_token(&self, token: impl Into<String>) {
        *self.auth_token.write() = Some(token.into());
    }

    /// Stop sending a bearer token
    pub fn clear_auth_token(&self) {
        *self.auth_token.write() = None;
    }

    /// Whether a bearer token is currently attached
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.read().is_some()
    }

    /// Call a backend function and decode its return value
    pub async fn call<T>(&self, request: RpcRequest) -> Result<T, RpcError>
    where
        T: DeserializeOwned,
    {
        let url = format!(
            "{}/api/{}",
            self.config.deployment_url.trim_end_matches('/'),
            request.kind.endpoint()
        );

        let body = CallBody {
            path: &request.path,
            args: &request.args,
            format: "json",
        };

        let mut req = self.client.post(&url).json(&body);

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }
        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        // Clone out of the lock so it is not held across the await
        let token = self.auth_token.read().clone();
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        tracing::debug!(path = %request.path, kind = request.kind.endpoint(), "calling backend function");

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RpcError::new(0, "Timeout", format!("Request timed out: {}", e))
            } else {
                RpcError::new(0, "NetworkError", format!("Request failed: {}", e))
            }
        })?;

        self.parse_response(response).await
    }

    /// Decode an HTTP response into a function result
    async fn parse_response<T>(&self, response: reqwest::Response) -> Result<T, RpcError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let code = status.as_u16();

        let body = response.text().await.map_err(|e| {
            RpcError::new(code, "ParseError", format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<RpcErrorResponse>(&body) {
                Ok(error) => RpcError::new(code, error.code, error.message),
                Err(_) => RpcError::new(code, "Unknown", format!("HTTP {}: {}", code, body)),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            RpcError::new(code, "ParseError", format!("Malformed envelope: {}", e))
        })?;

        match envelope {
            Envelope::Success { value } => serde_json::from_value(value).map_err(|e| {
                RpcError::new(code, "ParseError", format!("Unexpected return value: {}", e))
            }),
            Envelope::Error { error_message } => {
                Err(RpcError::new(code, "FunctionError", error_message))
            }
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &RpcClientConfig {
        &self.config
    }

    /// Get the deployment URL
    pub fn deployment_url(&self) -> &str {
        &self.config.deployment_url
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failures_are_network_errors() {
        let error = RpcError::new(0, "NetworkError", "connection refused");
        assert!(error.is_network_error());
        assert!(!error.is_timeout());

        let timeout = RpcError::new(0, "Timeout", "deadline elapsed");
        assert!(timeout.is_network_error());
        assert!(timeout.is_timeout());
    }

    #[test]
    fn test_function_errors_are_not_network_errors() {
        let error = RpcError::new(200, "FunctionError", "Unauthenticated");
        assert!(!error.is_network_error());
        assert_eq!(error.message(), "Unauthenticated");
    }

    #[test]
    fn test_request_builders() {
        let query = RpcRequest::query("posts:getFeedPosts");
        assert_eq!(query.kind, FunctionKind::Query);
        assert_eq!(query.args, serde_json::json!({}));

        #[derive(Serialize)]
        struct Args {
            title: String,
        }

        let mutation = RpcRequest::mutation("posts:createPost")
            .args(&Args { title: "Hackathon".to_string() })
            .unwrap()
            .header("X-Trace", "1");

        assert_eq!(mutation.kind.endpoint(), "mutation");
        assert_eq!(mutation.args["title"], "Hackathon");
        assert_eq!(mutation.headers.get("X-Trace"), Some(&"1".to_string()));
    }

    #[test]
    fn test_envelope_decoding() {
        let ok: Envelope = serde_json::from_str(r#"{"status":"success","value":"abc"}"#).unwrap();
        assert!(matches!(ok, Envelope::Success { value } if value == "abc"));

        let null: Envelope = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(matches!(null, Envelope::Success { value } if value.is_null()));

        let err: Envelope =
            serde_json::from_str(r#"{"status":"error","errorMessage":"boom"}"#).unwrap();
        assert!(matches!(err, Envelope::Error { error_message } if error_message == "boom"));
    }

    #[test]
    fn test_client_config_builder() {
        let config = RpcClientConfig::new("https://happy-otter-123.convex.cloud")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("CampusFeedTest/1.0")
            .with_header("X-Client", "mobile");

        let client = RpcClient::new(config).unwrap();
        assert_eq!(client.deployment_url(), "https://happy-otter-123.convex.cloud");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(client.config().default_headers.get("X-Client"), Some(&"mobile".to_string()));
    }

    #[test]
    fn test_auth_token_is_shared_between_clones() {
        let client = RpcClient::new(RpcClientConfig::default()).unwrap();
        let clone = client.clone();

        client.set_auth_token("jwt");
        assert!(clone.has_auth_token());

        clone.clear_auth_token();
        assert!(!client.has_auth_token());
    }
}
