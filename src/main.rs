use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use promptalpha::cli::{self, InputArgs, PromptSource, Session};
use promptalpha::llm::prompts::EnhanceRequest;
use promptalpha::store;

#[derive(Parser)]
#[command(name = "promptalpha", version)]
#[command(
    about = "Assemble structured LLM prompts from catalog choices, then save, share and test them",
    long_about = None
)]
struct Cli {
    /// Path to config file (defaults to ./promptalpha.toml or ~/.config/promptalpha/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Act as this user for the store and usage quota
    #[arg(long, global = true)]
    user: Option<String>,

    /// Override the JSON store location
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// More logging (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a prompt from role, objective, tone and the other fields
    Assemble {
        #[command(flatten)]
        inputs: InputArgs,

        /// Print the ordered segments instead of the flat prompt
        #[arg(long)]
        segments: bool,

        /// Prefix each sentence with its category label
        #[arg(long, conflicts_with = "segments")]
        labeled: bool,

        #[arg(long)]
        json: bool,
    },

    /// List the choices offered for each field, or explain one choice
    Catalog {
        /// role, objective, tone, format, audience, model, depth or structure-style
        field: Option<String>,

        /// Show the help for this value of FIELD
        #[arg(requires = "field")]
        value: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Send a prompt plus sample input to the configured model
    Test {
        #[command(flatten)]
        source: PromptSource,

        #[command(flatten)]
        inputs: InputArgs,

        /// Sample user input appended after the prompt
        #[arg(long)]
        user_input: Option<String>,

        /// Override LLM model
        #[arg(long)]
        model: Option<String>,

        /// Use mock LLM client
        #[arg(long)]
        dry_run: bool,
    },

    /// Turn a free-form request into a structured super prompt
    Enhance {
        /// JSON request body (customNeed, persona, role, audience, ...)
        #[arg(long, value_name = "FILE")]
        payload: Option<String>,

        #[arg(long)]
        custom_need: Option<String>,

        /// Who you are (e.g. "Founder")
        #[arg(long)]
        persona: Option<String>,

        /// Role the model should take (e.g. "Copywriter")
        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        audience: Option<String>,

        #[arg(long)]
        output_format: Option<String>,

        #[arg(long)]
        length: Option<String>,

        #[arg(long)]
        style: Option<String>,

        #[arg(long)]
        tone: Option<String>,

        #[arg(long)]
        constraints: Option<String>,

        /// Override LLM model
        #[arg(long)]
        model: Option<String>,

        /// Use mock LLM client (does not count against the quota)
        #[arg(long)]
        dry_run: bool,
    },

    /// Save a prompt to your history
    Save {
        #[command(flatten)]
        source: PromptSource,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Publish a prompt under a shareable id
    Share {
        #[command(flatten)]
        source: PromptSource,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Print a shared prompt by id
    ShowShared {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show saved prompts, newest first
    List {
        #[arg(long, default_value_t = store::DEFAULT_LIST_LIMIT)]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Rate a prompt (1-5) and leave a comment
    Feedback {
        /// JSON request body (comments / feedback, rating / stars, promptId)
        #[arg(long, value_name = "FILE", conflicts_with_all = ["text", "rating"])]
        payload: Option<String>,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        rating: Option<String>,

        #[arg(long)]
        prompt_id: Option<String>,
    },

    /// Manage named input presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },

    /// Validate config, API key and store
    ConfigCheck,

    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// Save the given inputs under a name
    Save {
        name: String,

        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Show a preset and the prompt it assembles
    Show { name: String },
    List,
    Delete { name: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let load = || Session::load(cli.config.clone(), cli.user.clone(), cli.store.clone());

    match cli.command {
        Commands::Assemble {
            ref inputs,
            segments,
            labeled,
            json,
        } => {
            cli::assemble::run(&load()?, inputs, segments, labeled, json)?;
        }
        Commands::Catalog {
            ref field,
            ref value,
            json,
        } => {
            cli::catalog::run(field.clone(), value.clone(), json)?;
        }
        Commands::Test {
            ref source,
            ref inputs,
            ref user_input,
            ref model,
            dry_run,
        } => {
            let mut session = load()?;
            cli::complete::run_test(
                &mut session,
                source,
                inputs,
                user_input.clone(),
                model.clone(),
                dry_run,
            )
            .await?;
        }
        Commands::Enhance {
            ref payload,
            ref custom_need,
            ref persona,
            ref role,
            ref audience,
            ref output_format,
            ref length,
            ref style,
            ref tone,
            ref constraints,
            ref model,
            dry_run,
        } => {
            let text = |v: &Option<String>| v.clone().unwrap_or_default();
            let request = EnhanceRequest {
                custom_need: text(custom_need),
                persona: text(persona),
                role: text(role),
                audience: text(audience),
                output_format: text(output_format),
                length: text(length),
                style: text(style),
                tone: text(tone),
                constraints: text(constraints),
            };
            let mut session = load()?;
            cli::complete::run_enhance(
                &mut session,
                request,
                payload.clone(),
                model.clone(),
                dry_run,
            )
            .await?;
        }
        Commands::Save {
            ref source,
            ref inputs,
        } => {
            cli::prompts::run_save(&load()?, source, inputs)?;
        }
        Commands::Share {
            ref source,
            ref inputs,
        } => {
            cli::prompts::run_share(&load()?, source, inputs)?;
        }
        Commands::ShowShared { ref id, json } => {
            cli::prompts::run_show_shared(&load()?, id, json)?;
        }
        Commands::List { limit, json } => {
            cli::prompts::run_list(&load()?, limit, json)?;
        }
        Commands::Feedback {
            ref payload,
            ref text,
            ref rating,
            ref prompt_id,
        } => {
            cli::prompts::run_feedback(
                &load()?,
                payload.clone(),
                text.clone(),
                rating.clone(),
                prompt_id.clone(),
            )?;
        }
        Commands::Preset { ref action } => {
            let session = load()?;
            match action {
                PresetAction::Save { name, inputs } => {
                    cli::preset::run_save(&session, name, inputs)?
                }
                PresetAction::Show { name } => cli::preset::run_show(&session, name)?,
                PresetAction::List => cli::preset::run_list(&session)?,
                PresetAction::Delete { name } => cli::preset::run_delete(&session, name)?,
            }
        }
        Commands::ConfigCheck => {
            cli::config_check::run(cli.config.clone())?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "promptalpha", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assemble_defaults() {
        let cli = Cli::try_parse_from(["promptalpha", "assemble"]).unwrap();
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Assemble {
                inputs,
                segments,
                labeled,
                json,
            } => {
                assert!(inputs.role.is_none());
                assert!(inputs.max_words.is_none());
                assert!(!segments && !labeled && !json);
            }
            _ => panic!("expected assemble"),
        }
    }

    #[test]
    fn test_parse_assemble_with_fields() {
        let cli = Cli::try_parse_from([
            "promptalpha",
            "-vv",
            "assemble",
            "--role",
            "a technical expert",
            "--task",
            "summarize",
            "--depth",
            "deep-dive",
            "--seo",
            "--max-words",
            "-5",
            "--segments",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Assemble {
                inputs, segments, ..
            } => {
                assert_eq!(inputs.role.as_deref(), Some("a technical expert"));
                assert_eq!(inputs.objective.as_deref(), Some("summarize"));
                assert_eq!(inputs.depth, Some(promptalpha::prompt::Depth::DeepDive));
                assert!(inputs.seo);
                assert_eq!(inputs.max_words, Some(-5));
                assert!(segments);
            }
            _ => panic!("expected assemble"),
        }
    }

    #[test]
    fn test_parse_labeled_conflicts_with_segments() {
        let result = Cli::try_parse_from(["promptalpha", "assemble", "--segments", "--labeled"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "promptalpha",
            "list",
            "--user",
            "ana",
            "--store",
            "/tmp/s.json",
            "--limit",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("ana"));
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::List { limit, json } => {
                assert_eq!(limit, 5);
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_test_command() {
        let cli = Cli::try_parse_from([
            "promptalpha",
            "test",
            "--prompt",
            "Summarize this.",
            "--user-input",
            "a long report",
            "--model",
            "gpt-4o",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Test {
                source,
                user_input,
                model,
                dry_run,
                ..
            } => {
                assert_eq!(source.prompt.as_deref(), Some("Summarize this."));
                assert_eq!(user_input.as_deref(), Some("a long report"));
                assert_eq!(model.as_deref(), Some("gpt-4o"));
                assert!(dry_run);
            }
            _ => panic!("expected test"),
        }
    }

    #[test]
    fn test_parse_prompt_sources_conflict() {
        let result = Cli::try_parse_from([
            "promptalpha",
            "save",
            "--prompt",
            "x",
            "--payload",
            "body.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_preset_save() {
        let cli = Cli::try_parse_from([
            "promptalpha",
            "preset",
            "save",
            "weekly",
            "--tone",
            "neutral",
        ])
        .unwrap();
        match cli.command {
            Commands::Preset {
                action: PresetAction::Save { name, inputs },
            } => {
                assert_eq!(name, "weekly");
                assert_eq!(inputs.tone.as_deref(), Some("neutral"));
            }
            _ => panic!("expected preset save"),
        }
    }

    #[test]
    fn test_parse_feedback_payload_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "promptalpha",
            "feedback",
            "--payload",
            "fb.json",
            "--rating",
            "4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_catalog_value_and_show_shared() {
        let cli = Cli::try_parse_from(["promptalpha", "catalog", "tone", "analytical"]).unwrap();
        match cli.command {
            Commands::Catalog { field, value, .. } => {
                assert_eq!(field.as_deref(), Some("tone"));
                assert_eq!(value.as_deref(), Some("analytical"));
            }
            _ => panic!("expected catalog"),
        }

        let cli = Cli::try_parse_from(["promptalpha", "show-shared", "abc", "--json"]).unwrap();
        match cli.command {
            Commands::ShowShared { id, json } => {
                assert_eq!(id, "abc");
                assert!(json);
            }
            _ => panic!("expected show-shared"),
        }
    }

    #[test]
    fn test_parse_missing_subcommand() {
        let result = Cli::try_parse_from(["promptalpha"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unknown_subcommand() {
        let result = Cli::try_parse_from(["promptalpha", "generate"]);
        assert!(result.is_err());
    }
}
