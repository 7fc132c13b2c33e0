//! Static option catalogs shown next to each form field.
//!
//! Values are phrased so they slot straight into an instruction sentence
//! ("You are acting as an academic expert."). Each choice carries a short
//! hint used for tooltips and for `promptalpha catalog`.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// One selectable value plus a one-line explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub help: &'static str,
}

const fn choice(value: &'static str, help: &'static str) -> Choice {
    Choice { value, help }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Role,
    Objective,
    Tone,
    Format,
    Audience,
    Model,
    Depth,
    StructureStyle,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Role,
        Field::Objective,
        Field::Tone,
        Field::Format,
        Field::Audience,
        Field::Model,
        Field::Depth,
        Field::StructureStyle,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Field::Role => "role",
            Field::Objective => "objective",
            Field::Tone => "tone",
            Field::Format => "format",
            Field::Audience => "audience",
            Field::Model => "model",
            Field::Depth => "depth",
            Field::StructureStyle => "structure-style",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "role" | "roles" => Ok(Field::Role),
            "objective" | "task" | "tasks" => Ok(Field::Objective),
            "tone" | "tones" => Ok(Field::Tone),
            "format" | "formats" => Ok(Field::Format),
            "audience" | "audiences" => Ok(Field::Audience),
            "model" | "models" | "llm" | "llms" => Ok(Field::Model),
            "depth" => Ok(Field::Depth),
            "structure" | "structure-style" | "structure_style" => Ok(Field::StructureStyle),
            _ => bail!("Unknown catalog field: {}", s),
        }
    }
}

pub const ROLES: &[Choice] = &[
    choice("an academic expert", "Use for essays, research, formal analysis."),
    choice("a business professional", "Use for strategy, emails, pitches, plans."),
    choice("a creative specialist", "Use for storytelling, scripts, branding."),
    choice("a technical expert", "Use for code, architecture, specs."),
    choice("a marketing and sales professional", "Use for ads, copy, funnels."),
    choice("an educator or trainer", "Use for lessons, modules, exercises."),
    choice("a service professional", "Use for legal, medical, finance style."),
    choice("a general assistant", "Use for everyday tasks and summaries."),
];

pub const OBJECTIVES: &[Choice] = &[
    choice("generate ideas", "Brainstorm, explore directions and angles."),
    choice("write content", "Produce complete drafts: blogs, posts, emails."),
    choice("summarize or explain", "Condense or clarify material."),
    choice("analyze or evaluate", "Compare, critique, find pros/cons."),
    choice("plan or organize", "Create outlines, strategies, timelines."),
    choice("solve problems", "Technical, logical, business problem-solving."),
    choice("communicate professionally", "Pitches, proposals, cold emails."),
    choice("teach or train", "Lessons, exercises, quizzes."),
];

pub const TONES: &[Choice] = &[
    choice("professional", "Formal, precise, business-ready."),
    choice("conversational", "Approachable, human, easy to read."),
    choice("persuasive", "Compelling, sales-oriented, conversion-focused."),
    choice("creative", "Playful, vivid, imaginative."),
    choice("analytical", "Data-aware, objective, structured."),
    choice("inspirational", "Motivational, uplifting, vision-led."),
    choice("technical", "Exact, jargon-appropriate, rigorous."),
    choice("neutral", "Plain, straightforward, minimal style."),
];

pub const FORMATS: &[Choice] = &[
    choice("an article or essay", "Long-form, structured, headings."),
    choice("a blog post or story", "Narrative, SEO-friendly, scannable."),
    choice("a social media post or thread", "Short, platform-ready, hooks."),
    choice("an email or letter", "Subject, body, CTA, signature."),
    choice("a report or analysis", "Findings, evidence, recommendations."),
    choice("a script or dialogue", "Scenes, beats, roles, stage directions."),
    choice("an outline or plan", "Bullets, steps, milestones."),
    choice("presentation slide notes", "Concise bullets, sections, takeaways."),
];

pub const AUDIENCES: &[Choice] = &[
    choice("the general public", "Broad, accessible, minimal jargon."),
    choice("students or learners", "Educational tone, examples, clarity."),
    choice("professionals or executives", "Concise, strategic, outcome-first."),
    choice("customers or clients", "Benefits, credibility, next steps."),
    choice("investors or stakeholders", "Market, traction, economics."),
    choice("technical experts or peers", "Depth, precision, references."),
    choice("internal teams or employees", "Context, alignment, actions."),
    choice("a creative or entertainment audience", "Hooks, pacing, personality."),
];

pub const MODELS: &[Choice] = &[
    choice("Copilot", "Balanced, productivity-focused."),
    choice("ChatGPT", "Conversational, creative."),
    choice("Claude", "Long-form reasoning, context."),
    choice("Gemini", "Multimodal, experimental."),
    choice("LLaMA", "Open-source, customizable."),
    choice("Any", "Works across most models."),
];

pub const DEPTHS: &[Choice] = &[
    choice("Brief", "A short answer: two or three paragraphs."),
    choice("Standard", "Balanced detail for most requests."),
    choice("Deep Dive", "Long, sectioned output with examples."),
];

pub const STRUCTURE_STYLES: &[Choice] = &[
    choice(
        "clear sections, headings, and bullet points where helpful",
        "General-purpose layout for most outputs.",
    ),
    choice("numbered step-by-step instructions", "Procedures, tutorials, how-tos."),
    choice("a comparison table", "Options side by side."),
    choice("question-and-answer pairs", "FAQs and study material."),
    choice("an executive summary followed by details", "Reports for busy readers."),
];

pub fn catalog(field: Field) -> &'static [Choice] {
    match field {
        Field::Role => ROLES,
        Field::Objective => OBJECTIVES,
        Field::Tone => TONES,
        Field::Format => FORMATS,
        Field::Audience => AUDIENCES,
        Field::Model => MODELS,
        Field::Depth => DEPTHS,
        Field::StructureStyle => STRUCTURE_STYLES,
    }
}

/// Help text for a catalog value, matched case-insensitively.
/// Free-text values that are not in the catalog have no help.
pub fn help_for(field: Field, value: &str) -> Option<&'static str> {
    let value = value.trim();
    catalog(field)
        .iter()
        .find(|c| c.value.eq_ignore_ascii_case(value))
        .map(|c| c.help)
}
