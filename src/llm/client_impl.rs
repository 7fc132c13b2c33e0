use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::client::{CompletionRequest, LlmClient};
use crate::util::SecretString;

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Turn a non-2xx response into an error carrying status and body.
async fn check_status(response: reqwest::Response, provider: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    bail!("{} API error {}: {}", provider, status, error_text);
}

// ============================================================================
// OpenAI Responses API
// ============================================================================

pub struct OpenAIClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesOutputItem>,
}

#[derive(Debug, Deserialize)]
struct ResponsesOutputItem {
    #[serde(default)]
    content: Vec<ResponsesContent>,
}

#[derive(Debug, Deserialize)]
struct ResponsesContent {
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// `output_text` when present, else the first text part in `output`.
    fn text(self) -> Option<String> {
        if let Some(text) = self.output_text.filter(|t| !t.is_empty()) {
            return Some(text);
        }
        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .find_map(|c| c.text)
    }
}

impl OpenAIClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url,
            max_tokens,
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ResponsesRequest {
            model: self.model.clone(),
            input: request.prompt.clone(),
            instructions: request.system.clone(),
            temperature: request.temperature,
            max_output_tokens: self.max_tokens,
        };

        debug!("Calling OpenAI Responses API with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("authorization", format!("Bearer {}", self.api_key.expose()))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let api_response: ResponsesResponse = check_status(response, "OpenAI")
            .await?
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        api_response.text().context("No text in OpenAI response")
    }

    fn describe(&self) -> String {
        format!("openai/{}", self.model)
    }
}

// ============================================================================
// OpenAI-compatible chat completions (Ollama, gateways)
// ============================================================================

pub struct ChatCompletionsClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatCompletionsClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url,
            max_tokens,
            client: http_client(timeout_secs)?,
        })
    }

    fn messages(request: &CompletionRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });
        messages
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: Self::messages(request),
            temperature: request.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "Calling chat completions at {} with model: {}",
            self.base_url, self.model
        );

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("content-type", "application/json")
            .json(&body);

        // Local servers run without a key
        let key = self.api_key.expose();
        if !key.is_empty() && !key.eq_ignore_ascii_case("none") {
            req = req.header("authorization", format!("Bearer {}", key));
        }

        let response = req
            .send()
            .await
            .context("Failed to send request to chat completions API")?;

        let api_response: ChatResponse = check_status(response, "Chat completions")
            .await?
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .context("No choices in chat completions response")
    }

    fn describe(&self) -> String {
        format!("openai-compatible/{}", self.model)
    }
}

// ============================================================================
// Anthropic Messages API
// ============================================================================

pub struct AnthropicClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url,
            max_tokens,
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: request.system.clone(),
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        };

        debug!("Calling Anthropic API with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let api_response: AnthropicResponse = check_status(response, "Anthropic")
            .await?
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        api_response
            .content
            .into_iter()
            .find_map(|c| c.text)
            .context("No content in Anthropic response")
    }

    fn describe(&self) -> String {
        format!("anthropic/{}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_responses_text_prefers_output_text() {
        let resp: ResponsesResponse = serde_json::from_value(json!({
            "output_text": "direct",
            "output": [{"content": [{"type": "output_text", "text": "nested"}]}]
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("direct"));
    }

    #[test]
    fn test_responses_text_skips_items_without_content() {
        let resp: ResponsesResponse = serde_json::from_value(json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [{"type": "output_text", "text": "answer"}]}
            ]
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("answer"));
    }

    #[test]
    fn test_responses_text_empty() {
        let resp: ResponsesResponse = serde_json::from_value(json!({"output": []})).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn test_chat_messages_include_system_first() {
        let req = CompletionRequest::new("user text").with_system("sys");
        let messages = ChatCompletionsClient::messages(&req);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "user text");

        let messages = ChatCompletionsClient::messages(&CompletionRequest::new("only"));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_anthropic_request_omits_missing_system() {
        let body = AnthropicRequest {
            model: "claude".to_string(),
            max_tokens: 100,
            system: None,
            temperature: None,
            messages: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_openai_client_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/responses")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "input": "Say hi",
                "max_output_tokens": 256
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output":[{"content":[{"type":"output_text","text":"hi"}]}]}"#)
            .create_async()
            .await;

        let client = OpenAIClient::new(
            "sk-test".to_string(),
            "gpt-4o-mini".to_string(),
            server.url(),
            256,
            10,
        )
        .unwrap();
        let out = client.complete(&CompletionRequest::new("Say hi")).await.unwrap();
        assert_eq!(out, "hi");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openai_client_surfaces_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/responses")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client =
            OpenAIClient::new("k".to_string(), "m".to_string(), server.url(), 16, 10).unwrap();
        let err = client
            .complete(&CompletionRequest::new("x"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("429"), "{}", err);
        assert!(err.contains("rate limited"), "{}", err);
    }

    #[tokio::test]
    async fn test_chat_client_without_key_sends_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "ask"}
                ],
                "temperature": 0.3
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  done \n"}}]}"#)
            .create_async()
            .await;

        let client = ChatCompletionsClient::new(
            String::new(),
            "llama3".to_string(),
            server.url(),
            512,
            10,
        )
        .unwrap();
        let req = CompletionRequest::new("ask")
            .with_system("sys")
            .with_temperature(0.3);
        assert_eq!(client.complete(&req).await.unwrap(), "done");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anthropic_client_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "ak")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(json!({"system": "sys"})))
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"hello"}]}"#)
            .create_async()
            .await;

        let client =
            AnthropicClient::new("ak".to_string(), "claude".to_string(), server.url(), 64, 10)
                .unwrap();
        let out = client
            .complete(&CompletionRequest::new("q").with_system("sys"))
            .await
            .unwrap();
        assert_eq!(out, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anthropic_empty_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(r#"{"content":[]}"#)
            .create_async()
            .await;

        let client =
            AnthropicClient::new("ak".to_string(), "claude".to_string(), server.url(), 64, 10)
                .unwrap();
        let err = client.complete(&CompletionRequest::new("q")).await.unwrap_err();
        assert!(err.to_string().contains("No content"));
    }
}
