use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Coarse control over requested output length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    Brief,
    Standard,
    DeepDive,
}

impl Depth {
    pub fn as_str(&self) -> &str {
        match self {
            Depth::Brief => "brief",
            Depth::Standard => "standard",
            Depth::DeepDive => "deep-dive",
        }
    }

    /// The label shown in the depth picker.
    pub fn label(&self) -> &str {
        match self {
            Depth::Brief => "Brief",
            Depth::Standard => "Standard",
            Depth::DeepDive => "Deep Dive",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Depth::Brief => "Keep it concise: 2–3 paragraphs at most.",
            Depth::Standard => "Provide balanced detail: approximately 5–7 paragraphs.",
            Depth::DeepDive => {
                "Expand thoroughly with multiple sections, supporting examples, and detailed explanations; do not truncate for brevity."
            }
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Depth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let folded: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match folded.as_str() {
            "brief" | "short" => Ok(Depth::Brief),
            "standard" | "balanced" => Ok(Depth::Standard),
            "deepdive" | "deep" => Ok(Depth::DeepDive),
            _ => anyhow::bail!("Unknown depth: {} (expected brief, standard or deep-dive)", s),
        }
    }
}

impl Serialize for Depth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Depth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The record a user edits before assembling a prompt.
///
/// Every field is optional. Field names accept the camelCase and legacy
/// spellings the web form has sent over time (`task`, `llm`, `seoFriendly`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptInputs {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub role: String,

    #[serde(
        alias = "task",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub objective: String,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub tone: String,

    #[serde(
        alias = "outputFormat",
        alias = "output_format",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub format: String,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub audience: String,

    #[serde(
        alias = "targetModel",
        alias = "llm",
        alias = "model",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub target_model: String,

    #[serde(
        alias = "customNeed",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub custom_need: String,

    #[serde(deserialize_with = "lenient_depth", skip_serializing_if = "Option::is_none")]
    pub depth: Option<Depth>,

    #[serde(
        alias = "seo",
        alias = "seoRequested",
        alias = "seoFriendly",
        deserialize_with = "lenient_bool",
        skip_serializing_if = "is_false"
    )]
    pub seo_requested: bool,

    #[serde(
        alias = "citations",
        alias = "citationsRequested",
        alias = "includeReferences",
        deserialize_with = "lenient_bool",
        skip_serializing_if = "is_false"
    )]
    pub citations_requested: bool,

    #[serde(
        alias = "structure",
        alias = "structureRequested",
        alias = "structuredOutput",
        deserialize_with = "lenient_bool",
        skip_serializing_if = "is_false"
    )]
    pub structure_requested: bool,

    #[serde(
        alias = "structureStyle",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub structure_style: String,

    #[serde(
        alias = "maxWords",
        deserialize_with = "lenient_int",
        skip_serializing_if = "is_zero"
    )]
    pub max_words: i64,
}

impl PromptInputs {
    /// Overlay the fields `other` actually sets on top of `self`.
    ///
    /// Used to layer config defaults, a preset, an input file and CLI flags.
    /// A toggle can only be switched on by a later layer, never off.
    pub fn merge(&mut self, other: &PromptInputs) {
        fn take(dst: &mut String, src: &str) {
            if !src.trim().is_empty() {
                *dst = src.to_string();
            }
        }

        take(&mut self.role, &other.role);
        take(&mut self.objective, &other.objective);
        take(&mut self.tone, &other.tone);
        take(&mut self.format, &other.format);
        take(&mut self.audience, &other.audience);
        take(&mut self.target_model, &other.target_model);
        take(&mut self.custom_need, &other.custom_need);
        take(&mut self.structure_style, &other.structure_style);
        if other.depth.is_some() {
            self.depth = other.depth;
        }
        self.seo_requested |= other.seo_requested;
        self.citations_requested |= other.citations_requested;
        self.structure_requested |= other.structure_requested;
        if other.max_words != 0 {
            self.max_words = other.max_words;
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Loosely typed scalar as it arrives from form payloads.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => String::new(),
        Some(Loose::Str(s)) => s,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(f)) => f.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => false,
        Some(Loose::Bool(b)) => b,
        Some(Loose::Int(n)) => n != 0,
        Some(Loose::Float(f)) => f != 0.0,
        Some(Loose::Str(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
    })
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None | Some(Loose::Bool(_)) => 0,
        Some(Loose::Int(n)) => n,
        Some(Loose::Float(f)) if f.is_finite() => f.trunc() as i64,
        Some(Loose::Float(_)) => 0,
        Some(Loose::Str(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .unwrap_or(0)
        }
    })
}

fn lenient_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Depth>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
