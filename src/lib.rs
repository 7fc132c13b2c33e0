//! promptalpha - assemble structured LLM prompts from catalog choices
//!
//! Turns a role, objective, tone, format, audience, depth and a few toggles
//! into one deterministic prompt (or its labeled segments). Prompts can be
//! saved, shared, rated and tested against OpenAI, Anthropic or any
//! OpenAI-compatible endpoint, with a per-user daily quota on enhance calls.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod llm;
pub mod payload;
pub mod prompt;
pub mod store;
pub mod util;
