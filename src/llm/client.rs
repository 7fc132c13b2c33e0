use anyhow::Result;
use async_trait::async_trait;

/// One completion call: an optional system instruction plus the user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Provider/model pair for log lines.
    fn describe(&self) -> String;
}

/// Offline client for `--dry-run`: reports what would have been sent.
pub struct MockLlmClient;

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let words = request.prompt.split_whitespace().count();
        let mut out = format!("[dry run] {} words would be sent", words);
        if let Some(system) = &request.system {
            out.push_str(&format!(
                " with a {}-word system prompt",
                system.split_whitespace().count()
            ));
        }
        out.push('.');
        Ok(out)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
