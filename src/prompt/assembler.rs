use serde::Serialize;

use super::inputs::PromptInputs;

/// Always the last clause of an assembled prompt.
pub const CLOSING_INSTRUCTION: &str =
    "Provide a clear, actionable output; state assumptions explicitly.";

/// Used when structure is requested without naming a style.
pub const DEFAULT_STRUCTURE_STYLE: &str =
    "clear sections, headings, and bullet points where helpful";

pub const SEO_INSTRUCTION: &str =
    "Incorporate SEO best practices: use descriptive headings, relevant keywords, and scannable formatting.";

pub const CITATIONS_INSTRUCTION: &str =
    "Cite sources where applicable and include references or links when possible.";

const SEPARATOR: &str = "\n\n";

/// One rendered instruction clause with its category label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSegment {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssembleMode {
    #[default]
    Text,
    Segments,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    Text(String),
    Segments(Vec<PromptSegment>),
}

impl Assembled {
    /// Collapse either shape into the flat prompt string.
    pub fn into_text(self) -> String {
        match self {
            Assembled::Text(text) => text,
            Assembled::Segments(segments) => flatten(&segments, false),
        }
    }
}

/// Instruction categories in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Role,
    Task,
    Tone,
    Format,
    Audience,
    Depth,
    CustomNeed,
    Seo,
    Citations,
    Structure,
    WordLimit,
    TargetModel,
    Closing,
}

impl Category {
    /// Output order is part of the contract: callers and tests compare literal text.
    pub const ORDER: [Category; 13] = [
        Category::Role,
        Category::Task,
        Category::Tone,
        Category::Format,
        Category::Audience,
        Category::Depth,
        Category::CustomNeed,
        Category::Seo,
        Category::Citations,
        Category::Structure,
        Category::WordLimit,
        Category::TargetModel,
        Category::Closing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Role => "Role",
            Category::Task => "Task",
            Category::Tone => "Tone",
            Category::Format => "Format",
            Category::Audience => "Audience",
            Category::Depth => "Depth",
            Category::CustomNeed => "Custom need",
            Category::Seo => "SEO",
            Category::Citations => "Citations",
            Category::Structure => "Structure",
            Category::WordLimit => "Word limit",
            Category::TargetModel => "Target model",
            Category::Closing => "Closing",
        }
    }

    /// The clause this category contributes, or `None` when its field is empty.
    fn clause(&self, inputs: &PromptInputs) -> Option<String> {
        match self {
            Category::Role => inline(&inputs.role).map(|v| format!("You are acting as {}.", v)),
            Category::Task => {
                inline(&inputs.objective).map(|v| format!("Your task is to {}.", v))
            }
            Category::Tone => {
                inline(&inputs.tone).map(|v| format!("Write in {} {} tone.", article(&v), v))
            }
            Category::Format => {
                inline(&inputs.format).map(|v| format!("Format the output as {}.", v))
            }
            Category::Audience => {
                inline(&inputs.audience).map(|v| format!("The intended audience is {}.", v))
            }
            Category::Depth => inputs.depth.map(|d| d.instruction().to_string()),
            Category::CustomNeed => collapse(&inputs.custom_need)
                .map(|v| format!("The user specifically needs: {}", v)),
            Category::Seo => inputs.seo_requested.then(|| SEO_INSTRUCTION.to_string()),
            Category::Citations => inputs
                .citations_requested
                .then(|| CITATIONS_INSTRUCTION.to_string()),
            Category::Structure => inputs.structure_requested.then(|| {
                let style = inline(&inputs.structure_style)
                    .unwrap_or_else(|| DEFAULT_STRUCTURE_STYLE.to_string());
                format!("Structure the output using {}.", style)
            }),
            Category::WordLimit => (inputs.max_words > 0)
                .then(|| format!("Limit the response to {} words or fewer.", inputs.max_words)),
            Category::TargetModel => {
                inline(&inputs.target_model).map(|v| format!("Optimize the response for {}.", v))
            }
            Category::Closing => Some(CLOSING_INSTRUCTION.to_string()),
        }
    }
}

/// Collapse every whitespace run to a single space. Blank → `None`.
fn collapse(value: &str) -> Option<String> {
    let joined = value.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Prefixes whose first sound disagrees with their first letter. Checked in
/// this order, so "unin" ("uninspired") is seen before "uni" ("unique").
const VOWEL_SOUND_PREFIXES: &[&str] =
    &["hour", "honest", "honor", "honour", "heir", "unin", "unim"];
const CONSONANT_SOUND_PREFIXES: &[&str] = &["uni", "use", "usu", "uti", "ure", "uro", "eu", "one"];

/// "an" before a vowel sound, "a" otherwise. Decided from spelling: the first
/// letter, except for the prefixes listed above.
fn article(word: &str) -> &'static str {
    let lower = word.to_lowercase();
    if VOWEL_SOUND_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return "an";
    }
    if CONSONANT_SOUND_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return "a";
    }
    match lower.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Like `collapse`, but for values spliced mid-sentence: a single trailing
/// period is dropped so the clause does not end in "..".
fn inline(value: &str) -> Option<String> {
    let collapsed = collapse(value)?;
    let trimmed = collapsed
        .strip_suffix('.')
        .map(str::trim_end)
        .unwrap_or(&collapsed);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Ordered, labeled clauses for `inputs`. Empty categories are skipped;
/// the closing instruction is always last.
pub fn segments(inputs: &PromptInputs) -> Vec<PromptSegment> {
    Category::ORDER
        .iter()
        .filter_map(|category| {
            category.clause(inputs).map(|text| PromptSegment {
                label: category.label().to_string(),
                text,
            })
        })
        .collect()
}

/// Join segments with a blank line. With `labeled`, each paragraph is
/// prefixed with its category label (`Tone: Write in a ...`).
pub fn flatten(segments: &[PromptSegment], labeled: bool) -> String {
    segments
        .iter()
        .map(|s| {
            if labeled {
                format!("{}: {}", s.label, s.text)
            } else {
                s.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// The flat prompt string for `inputs`.
pub fn assemble_text(inputs: &PromptInputs) -> String {
    flatten(&segments(inputs), false)
}

/// Assemble `inputs` as either the flat string or the labeled segment list.
///
/// Pure and infallible: missing fields only remove their clause.
pub fn assemble(inputs: &PromptInputs, mode: AssembleMode) -> Assembled {
    match mode {
        AssembleMode::Text => Assembled::Text(assemble_text(inputs)),
        AssembleMode::Segments => Assembled::Segments(segments(inputs)),
    }
}
