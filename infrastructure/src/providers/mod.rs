//! LLM provider adapters
//!
//! - [`HttpLlmGateway`] - any OpenAI-compatible `/chat/completions` endpoint
//!   (requires the `http-gateway` feature, on by default)

#[cfg(feature = "http-gateway")]
mod openai_compat;

#[cfg(feature = "http-gateway")]
pub use openai_compat::HttpLlmGateway;
