//! `test` and `enhance`: the two commands that call a language model.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;

use super::{InputArgs, PromptSource, Session};
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::factory;
use crate::payload;
use crate::llm::prompts::{self, EnhanceRequest, ENHANCE_SYSTEM_PROMPT, ENHANCE_TEMPERATURE};
use crate::store::PromptStore;
use crate::util::read_file;

/// Run the prompt against the configured model and return its output.
pub async fn test_prompt(client: &dyn LlmClient, prompt: &str, user_input: &str) -> Result<String> {
    if prompt.trim().is_empty() {
        bail!("Invalid prompt: nothing to send");
    }
    let request = CompletionRequest::new(prompts::test_input(prompt, user_input));
    info!("Testing prompt with {}", client.describe());
    client.complete(&request).await
}

/// Rewrite a request into a super prompt, counting against the daily quota.
pub async fn enhance(
    client: &dyn LlmClient,
    store: Option<&mut PromptStore>,
    user_id: &str,
    daily_quota: u32,
    request: &EnhanceRequest,
) -> Result<String> {
    if let Some(store) = store {
        let today = Utc::now().date_naive();
        let usage = store.check_and_increment_usage(user_id, today, daily_quota)?;
        if !usage.allowed {
            bail!(
                "Daily generation limit reached ({}/day). Try again tomorrow.",
                usage.daily_quota
            );
        }
        info!(
            "Usage for {}: {}/{}",
            user_id,
            usage.used_today,
            if usage.daily_quota == 0 {
                "unlimited".to_string()
            } else {
                usage.daily_quota.to_string()
            }
        );
    }

    let completion = CompletionRequest::new(prompts::enhance_prompt(request))
        .with_system(ENHANCE_SYSTEM_PROMPT)
        .with_temperature(ENHANCE_TEMPERATURE);
    info!("Enhancing request with {}", client.describe());
    let output = client.complete(&completion).await?;
    Ok(output.trim().to_string())
}

pub async fn run_test(
    session: &mut Session,
    source: &PromptSource,
    inputs: &InputArgs,
    user_input: Option<String>,
    model_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    if let Some(model) = model_override {
        info!("CLI override: model = {}", model);
        session.config.llm.model = model;
    }

    let prompt = source.text(session, inputs)?;
    let client = factory::create_client(&session.config, dry_run)?;
    let output = test_prompt(client.as_ref(), &prompt, user_input.as_deref().unwrap_or("")).await?;
    println!("{}", output);
    Ok(())
}

pub async fn run_enhance(
    session: &mut Session,
    request: EnhanceRequest,
    payload_path: Option<String>,
    model_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    if let Some(model) = model_override {
        info!("CLI override: model = {}", model);
        session.config.llm.model = model;
    }

    let request = load_request(payload_path.as_deref(), request)?;

    let client = factory::create_client(&session.config, dry_run)?;
    let output = if dry_run {
        enhance(client.as_ref(), None, session.user(), 0, &request).await?
    } else {
        let mut store = session.open_store()?;
        enhance(
            client.as_ref(),
            Some(&mut store),
            session.user(),
            session.config.usage.daily_quota,
            &request,
        )
        .await?
    };
    println!("{}", output);
    Ok(())
}

/// The enhance request from an optional payload file with flags on top.
/// An empty request is refused before any quota is spent.
fn load_request(payload_path: Option<&str>, flags: EnhanceRequest) -> Result<EnhanceRequest> {
    let request = match payload_path {
        Some(path) => {
            let raw: serde_json::Value = serde_json::from_str(&read_file(path)?)
                .with_context(|| format!("invalid JSON in {}", path))?;
            let mut from_file = payload::enhance_request(&raw)?;
            overlay(&mut from_file, &flags);
            from_file
        }
        None => flags,
    };
    if request.is_blank() {
        bail!("Nothing to enhance: set --custom-need or another request field");
    }
    Ok(request)
}

/// Flags given on the command line win over payload fields.
fn overlay(base: &mut EnhanceRequest, flags: &EnhanceRequest) {
    let fields = [
        (&mut base.custom_need, &flags.custom_need),
        (&mut base.persona, &flags.persona),
        (&mut base.role, &flags.role),
        (&mut base.audience, &flags.audience),
        (&mut base.output_format, &flags.output_format),
        (&mut base.length, &flags.length),
        (&mut base.style, &flags.style),
        (&mut base.tone, &flags.tone),
        (&mut base.constraints, &flags.constraints),
    ];
    for (dst, src) in fields {
        if !src.trim().is_empty() {
            *dst = src.clone();
        }
    }
}
