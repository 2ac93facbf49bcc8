//! Operation Context
//!
//! Carries the acting identity and tracing metadata for one request. Every
//! operation receives it explicitly; nothing reads a "current user" from
//! ambient state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an operation, used for authorization and tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// API key ID used for this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<Uuid>,

    /// Already-authenticated end user from X-Request-User-Id.
    /// `None` is the anonymous viewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_user_id: Option<i64>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new anonymous context
    pub fn new() -> Self {
        Self {
            api_key_id: None,
            request_user_id: None,
            correlation_id: None,
        }
    }

    /// Create context with API key
    pub fn with_api_key(mut self, api_key_id: Uuid) -> Self {
        self.api_key_id = Some(api_key_id);
        self
    }

    /// Create context with request user ID
    pub fn with_request_user(mut self, user_id: i64) -> Self {
        self.request_user_id = Some(user_id);
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// The viewing identity, `None` for anonymous callers
    pub fn viewer(&self) -> Option<i64> {
        self.request_user_id
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
