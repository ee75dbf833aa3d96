//! Gateway for OpenAI-compatible chat completion endpoints.
//!
//! Every invocation is a single stateless `POST {endpoint}/chat/completions`
//! with a system and a user message; the first choice's message content is
//! returned as-is.

use agora_application::{GatewayError, InvocationRequest, LlmGateway};
use agora_domain::Model;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct HttpLlmGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    default_model: Model,
}

impl HttpLlmGateway {
    pub fn new(endpoint: impl Into<String>, default_model: Model) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            default_model,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

fn build_body<'a>(model: &'a Model, request: &'a InvocationRequest) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !request.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });
    ChatRequest {
        model: model.as_str(),
        messages,
    }
}

fn extract_content(response: ChatResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GatewayError::RequestFailed("Response contained no choices".to_string()))
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn invoke(&self, request: InvocationRequest) -> Result<String, GatewayError> {
        let model = request.model.as_ref().unwrap_or(&self.default_model);
        debug!("POST {} (model {})", self.completions_url(), model);

        let mut http = self
            .client
            .post(self.completions_url())
            .timeout(request.timeout)
            .json(&build_body(model, &request));
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::ConnectionError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::ModelNotAvailable(model.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "{} returned {}: {}",
                self.endpoint,
                status,
                body.trim()
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            GatewayError::RequestFailed(format!("Failed to parse completion: {}", e))
        })?;
        extract_content(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_body_has_system_and_user_messages() {
        let model = Model::new("gpt-4.1");
        let request = InvocationRequest::new(None, "be brief", "hello", Duration::from_secs(5));
        let body = serde_json::to_value(build_body(&model, &request)).unwrap();

        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_empty_system_prompt_is_omitted() {
        let model = Model::default();
        let request = InvocationRequest::new(None, "", "hello", Duration::from_secs(5));
        let body = serde_json::to_value(build_body(&model, &request)).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"POSITION: yes"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(response).unwrap(), "POSITION: yes");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_content(empty),
            Err(GatewayError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_completions_url_joins_cleanly() {
        let gateway = HttpLlmGateway::new("http://localhost:8080/v1/", Model::default());
        assert_eq!(
            gateway.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
