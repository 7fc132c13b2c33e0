pub mod assemble;
pub mod catalog;
pub mod complete;
pub mod config_check;
pub mod preset;
pub mod prompts;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::Config;
use crate::payload;
use crate::prompt::{self, Depth, PromptInputs};
use crate::store::PromptStore;
use crate::util::read_file;

/// Config plus the global CLI overrides, shared by every subcommand.
pub struct Session {
    pub config: Config,
}

impl Session {
    pub fn load(
        config_path: Option<String>,
        user: Option<String>,
        store_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = Config::load_with_path(config_path)?;
        if let Some(user) = user {
            info!("CLI override: user = {}", user);
            config.user = user;
        }
        if let Some(path) = store_path {
            info!("CLI override: store = {}", path.display());
            config.store.path = Some(path);
        }
        Ok(Self { config })
    }

    pub fn user(&self) -> &str {
        &self.config.user
    }

    pub fn open_store(&self) -> Result<PromptStore> {
        let path = self.config.store.resolved_path();
        debug!("Opening store at {}", path.display());
        Ok(PromptStore::open(path)?)
    }
}

/// Prompt fields accepted on the command line.
///
/// Layering, lowest first: config `[defaults]`, `--preset`, `--input`, flags.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// TOML file (or .json form payload) with prompt inputs
    #[arg(long = "input", value_name = "FILE")]
    pub input_file: Option<String>,

    /// Start from a stored preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Role the model should act as (e.g. "a technical expert")
    #[arg(long)]
    pub role: Option<String>,

    /// What the model should do (e.g. "write content")
    #[arg(long, visible_alias = "task")]
    pub objective: Option<String>,

    #[arg(long)]
    pub tone: Option<String>,

    #[arg(long)]
    pub format: Option<String>,

    #[arg(long)]
    pub audience: Option<String>,

    /// Model the prompt is written for (e.g. "Claude")
    #[arg(long)]
    pub target_model: Option<String>,

    /// Free-text elaboration of the need
    #[arg(long)]
    pub custom_need: Option<String>,

    /// brief, standard or deep-dive
    #[arg(long)]
    pub depth: Option<Depth>,

    /// Ask for SEO-friendly output
    #[arg(long)]
    pub seo: bool,

    /// Ask for citations and references
    #[arg(long)]
    pub citations: bool,

    /// Ask for structured output
    #[arg(long)]
    pub structure: bool,

    /// Structure to request (implies --structure)
    #[arg(long)]
    pub structure_style: Option<String>,

    /// Word ceiling; zero or negative means no limit
    #[arg(long, allow_hyphen_values = true)]
    pub max_words: Option<i64>,
}

impl InputArgs {
    /// Inputs set directly by flags.
    fn flag_inputs(&self) -> PromptInputs {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        PromptInputs {
            role: text(&self.role),
            objective: text(&self.objective),
            tone: text(&self.tone),
            format: text(&self.format),
            audience: text(&self.audience),
            target_model: text(&self.target_model),
            custom_need: text(&self.custom_need),
            depth: self.depth,
            seo_requested: self.seo,
            citations_requested: self.citations,
            structure_requested: self.structure || self.structure_style.is_some(),
            structure_style: text(&self.structure_style),
            max_words: self.max_words.unwrap_or(0),
        }
    }

    pub fn has_preset(&self) -> bool {
        self.preset.is_some()
    }

    /// Resolve the final inputs. `store` is only consulted for `--preset`.
    pub fn resolve(&self, session: &Session, store: Option<&PromptStore>) -> Result<PromptInputs> {
        let mut inputs = session.config.defaults.clone();

        if let Some(name) = &self.preset {
            let store = store.context("a store is required to load presets")?;
            let preset = store.load_preset(session.user(), name)?;
            debug!("Applying preset '{}'", preset.name);
            inputs.merge(&preset.inputs);
        }

        if let Some(path) = &self.input_file {
            inputs.merge(&load_inputs_file(path)?);
        }

        inputs.merge(&self.flag_inputs());
        Ok(inputs)
    }

    /// Resolve inputs, opening the store only when a preset is named.
    pub fn resolve_with_session(&self, session: &Session) -> Result<PromptInputs> {
        if self.has_preset() {
            let store = session.open_store()?;
            self.resolve(session, Some(&store))
        } else {
            self.resolve(session, None)
        }
    }
}

/// Read prompt inputs from TOML, or from a JSON form payload for `.json` files.
pub fn load_inputs_file(path: &str) -> Result<PromptInputs> {
    let content = read_file(path)?;
    if path.to_lowercase().ends_with(".json") {
        let raw: serde_json::Value =
            serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path))?;
        Ok(payload::prompt_inputs(&raw)?)
    } else {
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path))
    }
}

/// Where the prompt text of save/share/test comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct PromptSource {
    /// Prompt text given inline
    #[arg(long, conflicts_with_all = ["prompt_file", "payload"])]
    pub prompt: Option<String>,

    /// Read the prompt text from a file
    #[arg(long, value_name = "FILE", conflicts_with = "payload")]
    pub prompt_file: Option<String>,

    /// JSON request body (promptText / generatedPrompt / prompt / text / content)
    #[arg(long, value_name = "FILE")]
    pub payload: Option<String>,
}

impl PromptSource {
    /// Explicit text, if any source flag was given.
    fn explicit_text(&self) -> Result<Option<String>> {
        if let Some(text) = &self.prompt {
            return Ok(Some(text.clone()));
        }
        if let Some(path) = &self.prompt_file {
            return Ok(Some(read_file(path)?));
        }
        if let Some(path) = &self.payload {
            let raw: serde_json::Value = serde_json::from_str(&read_file(path)?)
                .with_context(|| format!("invalid JSON in {}", path))?;
            return Ok(Some(payload::prompt_text(&raw)?));
        }
        Ok(None)
    }

    /// The prompt text: an explicit source, or the prompt assembled from `inputs`.
    pub fn text(&self, session: &Session, inputs: &InputArgs) -> Result<String> {
        match self.explicit_text()? {
            Some(text) => Ok(text),
            None => {
                let resolved = inputs.resolve_with_session(session)?;
                Ok(prompt::assemble_text(&resolved))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            config: Config::default(),
        }
    }

    #[test]
    fn test_flag_inputs_structure_style_implies_structure() {
        let args = InputArgs {
            structure_style: Some("a comparison table".to_string()),
            ..Default::default()
        };
        let inputs = args.flag_inputs();
        assert!(inputs.structure_requested);
        assert_eq!(inputs.structure_style, "a comparison table");
    }

    #[test]
    fn test_resolve_layers_defaults_file_and_flags() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("inputs.toml");
        fs::write(&file, "role = \"a general assistant\"\ntone = \"neutral\"\n").unwrap();

        let mut session = session();
        session.config.defaults.tone = "professional".to_string();
        session.config.defaults.audience = "the general public".to_string();

        let args = InputArgs {
            input_file: Some(file.to_string_lossy().to_string()),
            tone: Some("creative".to_string()),
            ..Default::default()
        };
        let inputs = args.resolve(&session, None).unwrap();
        assert_eq!(inputs.role, "a general assistant");
        assert_eq!(inputs.tone, "creative");
        assert_eq!(inputs.audience, "the general public");
    }

    #[test]
    fn test_resolve_preset_requires_store() {
        let args = InputArgs {
            preset: Some("weekly".to_string()),
            ..Default::default()
        };
        assert!(args.resolve(&session(), None).is_err());
    }

    #[test]
    fn test_resolve_with_preset() {
        let dir = TempDir::new().unwrap();
        let mut store = PromptStore::open(dir.path().join("store.json")).unwrap();
        let preset_inputs = PromptInputs {
            objective: "plan or organize".to_string(),
            ..Default::default()
        };
        store.save_preset("anonymous", "weekly", preset_inputs).unwrap();

        let args = InputArgs {
            preset: Some("weekly".to_string()),
            role: Some("an educator or trainer".to_string()),
            ..Default::default()
        };
        let inputs = args.resolve(&session(), Some(&store)).unwrap();
        assert_eq!(inputs.objective, "plan or organize");
        assert_eq!(inputs.role, "an educator or trainer");
    }

    #[test]
    fn test_load_inputs_file_json_payload() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("form.json");
        fs::write(
            &file,
            r#"{"body": {"task": "teach or train", "advanced": {"seoFriendly": true}}}"#,
        )
        .unwrap();
        let inputs = load_inputs_file(file.to_str().unwrap()).unwrap();
        assert_eq!(inputs.objective, "teach or train");
        assert!(inputs.seo_requested);
    }

    #[test]
    fn test_prompt_source_payload_and_fallback() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("save.json");
        fs::write(&file, r#"{"generatedPrompt": "stored text"}"#).unwrap();

        let source = PromptSource {
            payload: Some(file.to_string_lossy().to_string()),
            ..Default::default()
        };
        assert_eq!(
            source.text(&session(), &InputArgs::default()).unwrap(),
            "stored text"
        );

        let args = InputArgs {
            role: Some("a technical expert".to_string()),
            ..Default::default()
        };
        let text = PromptSource::default().text(&session(), &args).unwrap();
        assert!(text.starts_with("You are acting as a technical expert."));
    }
}
