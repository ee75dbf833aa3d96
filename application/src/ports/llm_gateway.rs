//! LLM Gateway port
//!
//! Defines the interface for invoking the external LLM service.

use agora_domain::Model;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// A single prompt sent to the LLM service
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Model to use; `None` lets the adapter pick its default
    pub model: Option<Model>,
    pub system_prompt: String,
    pub prompt: String,
    /// Upper bound the adapter may use for its own transport timeout.
    /// Callers enforce it independently.
    pub timeout: Duration,
}

impl InvocationRequest {
    pub fn new(
        model: Option<Model>,
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            timeout,
        }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer reaches the LLM service.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one prompt and return the full text response
    async fn invoke(&self, request: InvocationRequest) -> Result<String, GatewayError>;
}
