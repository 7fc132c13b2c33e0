use anyhow::Result;
use std::env;

use crate::config::{Config, LlmConfig};
use crate::llm::factory::PROVIDERS;
use crate::prompt;
use crate::store::PromptStore;

struct CheckResult {
    passed: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl CheckResult {
    fn new() -> Self {
        Self {
            passed: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn pass(&mut self, msg: impl Into<String>) {
        self.passed.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

pub fn run(config_path: Option<String>) -> Result<()> {
    let results = check(config_path);
    print_results(&results);
    if !results.errors.is_empty() {
        anyhow::bail!("{} config error(s) found", results.errors.len());
    }
    Ok(())
}

fn check(config_path: Option<String>) -> CheckResult {
    let mut results = CheckResult::new();

    // A load failure is reported in the results rather than returned.
    let config = match Config::load_with_path(config_path.clone()) {
        Ok(config) => {
            let source = config_path.as_deref().unwrap_or("default search path");
            results.pass(format!("Config loaded from {}", source));
            config
        }
        Err(e) => {
            results.error(format!("Failed to load config: {:#}", e));
            return results;
        }
    };

    check_llm(&config.llm, &mut results);
    check_api_key(&config.llm, &mut results);

    let store_path = config.store.resolved_path();
    match PromptStore::open(&store_path) {
        Ok(_) if store_path.exists() => {
            results.pass(format!("Store readable at {}", store_path.display()))
        }
        Ok(_) => results.pass(format!(
            "Store will be created at {}",
            store_path.display()
        )),
        Err(e) => results.error(e.to_string()),
    }
    if config.store.share_base_url.is_none() {
        results.warn("store.share_base_url not set; shared prompts get an id but no link");
    }

    if config.usage.daily_quota == 0 {
        results.warn("usage.daily_quota = 0: enhance calls are unlimited");
    } else {
        results.pass(format!("Daily enhance quota: {}", config.usage.daily_quota));
    }

    let segments = prompt::segments(&config.defaults);
    results.pass(format!(
        "Prompt defaults produce {} clause(s) for user '{}'",
        segments.len(),
        config.user
    ));

    results
}

fn check_llm(llm: &LlmConfig, results: &mut CheckResult) {
    if PROVIDERS.contains(&llm.provider.as_str()) {
        results.pass(format!(
            "LLM provider: {} (model: {})",
            llm.provider, llm.model
        ));
    } else {
        results.error(format!(
            "Unknown LLM provider '{}' (expected one of: {})",
            llm.provider,
            PROVIDERS.join(", ")
        ));
    }

    if llm.model.trim().is_empty() {
        results.error("llm.model is empty");
    }

    if llm.provider == "openai-compatible" && llm.base_url.is_none() {
        results.warn(format!(
            "openai-compatible provider without base_url; will use {}",
            llm.resolved_base_url()
        ));
    }
}

fn check_api_key(llm: &LlmConfig, results: &mut CheckResult) {
    let is_oai_compat = llm.provider == "openai-compatible";
    match &llm.api_key_env {
        Some(env_var) if env_var.eq_ignore_ascii_case("none") => {
            results.pass("No API key needed");
        }
        Some(env_var) => match env::var(env_var) {
            Ok(v) if !v.trim().is_empty() => {
                results.pass(format!("{} is set", env_var));
            }
            Ok(_) | Err(_) if is_oai_compat => {
                results.warn(format!(
                    "{} is not set (OK for local models, needed for gateways)",
                    env_var
                ));
            }
            Ok(_) => results.error(format!("{} is set but empty", env_var)),
            Err(_) => results.error(format!("{} is not set", env_var)),
        },
        None => results.warn("llm.api_key_env not set; requests are sent without a key"),
    }
}

fn print_results(results: &CheckResult) {
    println!();
    for msg in &results.passed {
        println!("  \u{2713} {}", msg);
    }
    for msg in &results.warnings {
        println!("  ! {}", msg);
    }
    for msg in &results.errors {
        println!("  \u{2717} {}", msg);
    }
    println!();
    println!(
        "{} passed, {} warnings, {} errors",
        results.passed.len(),
        results.warnings.len(),
        results.errors.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("promptalpha.toml");
        let store = dir.path().join("store.json");
        fs::write(
            &path,
            format!("{}\n[store]\npath = {:?}\n", body, store.to_string_lossy()),
        )
        .unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_missing_config_is_an_error_result() {
        let results = check(Some("/nonexistent/promptalpha.toml".to_string()));
        assert_eq!(results.errors.len(), 1);
        assert!(results.errors[0].contains("Failed to load config"));
    }

    #[test]
    fn test_local_provider_without_key_passes() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[llm]
provider = "openai-compatible"
model = "llama3"
api_key_env = "none"
base_url = "http://localhost:11434/v1"
"#,
        );
        let results = check(Some(path));
        assert!(results.errors.is_empty(), "{:?}", results.errors);
        assert!(results.passed.iter().any(|m| m.contains("No API key needed")));
    }

    #[test]
    fn test_unknown_provider_and_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[llm]
provider = "carrier-pigeon"
model = "coo"
api_key_env = "PROMPTALPHA_CHECK_UNSET_KEY"
"#,
        );
        let results = check(Some(path.clone()));
        assert!(results.errors.iter().any(|m| m.contains("Unknown LLM provider")));
        assert!(results
            .errors
            .iter()
            .any(|m| m.contains("PROMPTALPHA_CHECK_UNSET_KEY is not set")));
        assert!(run(Some(path)).is_err());
    }

    #[test]
    fn test_corrupt_store_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[llm]
provider = "openai-compatible"
model = "llama3"
api_key_env = "none"
"#,
        );
        fs::write(dir.path().join("store.json"), "[broken").unwrap();
        let results = check(Some(path));
        assert!(results.errors.iter().any(|m| m.contains("not valid JSON")));
        assert!(results.warnings.iter().any(|m| m.contains("base_url")));
    }
}
