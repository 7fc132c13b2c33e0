//! save, share, show-shared, list and feedback.

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};

use super::{InputArgs, PromptSource, Session};
use crate::payload;
use crate::util::{preview, read_file};
use uuid::Uuid;

pub fn run_save(session: &Session, source: &PromptSource, inputs: &InputArgs) -> Result<()> {
    let text = source.text(session, inputs)?;
    let mut store = session.open_store()?;
    let saved = store.save_prompt(session.user(), &text)?;
    println!("Saved prompt {}", saved.id);
    Ok(())
}

pub fn run_share(session: &Session, source: &PromptSource, inputs: &InputArgs) -> Result<()> {
    let text = source.text(session, inputs)?;
    let mut store = session.open_store()?;
    let shared = store.share_prompt(session.user(), &text)?;
    match shared.url(session.config.store.share_base_url.as_deref()) {
        Some(url) => println!("Shared prompt {}: {}", shared.id, url),
        None => println!("Shared prompt {}", shared.id),
    }
    Ok(())
}

/// Resolve an id printed by `share`.
pub fn run_show_shared(session: &Session, id: &str, json: bool) -> Result<()> {
    let id = Uuid::parse_str(id.trim()).with_context(|| format!("invalid share id: {}", id))?;
    let store = session.open_store()?;
    let shared = store
        .get_shared(&id)
        .ok_or_else(|| anyhow!("No shared prompt with id {}", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(shared)?);
    } else {
        println!("{}", shared.prompt_text);
    }
    Ok(())
}

pub fn run_list(session: &Session, limit: usize, json: bool) -> Result<()> {
    let store = session.open_store()?;
    let prompts = store.list_saved(session.user(), limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "prompts": prompts }))?);
        return Ok(());
    }
    if prompts.is_empty() {
        println!("No saved prompts for {}", session.user());
        return Ok(());
    }
    for p in prompts {
        println!(
            "{}  {}  {}",
            p.id,
            p.created_at.format("%Y-%m-%d %H:%M"),
            preview(&p.prompt_text, 60)
        );
    }
    Ok(())
}

/// Feedback either as a JSON payload file or as flags. Both go through the
/// same decoder so validation is identical.
pub fn run_feedback(
    session: &Session,
    payload_path: Option<String>,
    text: Option<String>,
    rating: Option<String>,
    prompt_id: Option<String>,
) -> Result<()> {
    let raw = match payload_path {
        Some(path) => serde_json::from_str(&read_file(&path)?)
            .with_context(|| format!("invalid JSON in {}", path))?,
        None => flags_payload(text, rating, prompt_id),
    };
    let input = payload::feedback(&raw)?;

    let mut store = session.open_store()?;
    let feedback = store.record_feedback(session.user(), input)?;
    println!("Thanks! Feedback {} recorded ({}/5)", feedback.id, feedback.rating);
    Ok(())
}

fn flags_payload(text: Option<String>, rating: Option<String>, prompt_id: Option<String>) -> Value {
    let mut raw = serde_json::Map::new();
    if let Some(text) = text {
        raw.insert("feedback".to_string(), Value::String(text));
    }
    if let Some(rating) = rating {
        raw.insert("rating".to_string(), Value::String(rating));
    }
    if let Some(id) = prompt_id {
        raw.insert("promptId".to_string(), Value::String(id));
    }
    Value::Object(raw)
}
