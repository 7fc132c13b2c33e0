use anyhow::{bail, Result};

use super::client::{LlmClient, MockLlmClient};
use super::client_impl::{AnthropicClient, ChatCompletionsClient, OpenAIClient};
use crate::config::Config;

pub const PROVIDERS: &[&str] = &["openai", "openai-compatible", "anthropic"];

/// Create an LLM client based on configuration
pub fn create_client(config: &Config, dry_run: bool) -> Result<Box<dyn LlmClient>> {
    if dry_run {
        return Ok(Box::new(MockLlmClient::new()));
    }

    let llm = &config.llm;
    let api_key = config.get_api_key()?;
    let model = llm.model.clone();
    let base_url = llm.resolved_base_url();
    let max_tokens = llm.get_max_tokens();
    let timeout = llm.timeout_secs;

    match llm.provider.as_str() {
        "openai" => Ok(Box::new(OpenAIClient::new(
            api_key, model, base_url, max_tokens, timeout,
        )?)),

        "openai-compatible" => Ok(Box::new(ChatCompletionsClient::new(
            api_key, model, base_url, max_tokens, timeout,
        )?)),

        "anthropic" => Ok(Box::new(AnthropicClient::new(
            api_key, model, base_url, max_tokens, timeout,
        )?)),

        unknown => bail!(
            "Unknown LLM provider: {} (expected one of: {})",
            unknown,
            PROVIDERS.join(", ")
        ),
    }
}
