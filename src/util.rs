//! Shared utilities

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// A string wrapper that masks its contents in Debug/Display output.
/// Prevents accidental logging of API keys.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Intentionally access the raw secret value (for headers)
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Read a file that must exist and be a regular file.
pub fn read_file(path: &str) -> Result<String> {
    let file = Path::new(path);
    if !file.exists() {
        anyhow::bail!("File not found: {}", path);
    }
    if !file.is_file() {
        anyhow::bail!("Path is not a file: {}", path);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read {}", path))
}

/// Shorten `s` to at most `max` characters for one-line listings.
pub fn preview(s: &str, max: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
