//! Fixed prompt text sent to the completion service.

use serde::{Deserialize, Serialize};

pub const ENHANCE_SYSTEM_PROMPT: &str =
    "You are a senior prompt engineer. You transform vague requests into clear, structured super prompts that are reusable and comprehensive.";

pub const ENHANCE_TEMPERATURE: f32 = 0.3;

/// A free-form request to be rewritten into a reusable super prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub custom_need: String,
    /// Who the user is ("Founder", "Recruiter", ...)
    pub persona: String,
    /// Role the model should take ("Copywriter", "Analyst", ...)
    pub role: String,
    pub audience: String,
    pub output_format: String,
    pub length: String,
    pub style: String,
    pub tone: String,
    pub constraints: String,
}

impl EnhanceRequest {
    /// True when no field carries any text.
    pub fn is_blank(&self) -> bool {
        [
            &self.custom_need,
            &self.persona,
            &self.role,
            &self.audience,
            &self.output_format,
            &self.length,
            &self.style,
            &self.tone,
            &self.constraints,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }
}

/// The user message for an enhance call. Empty fields are left blank so the
/// model sees the full template.
pub fn enhance_prompt(req: &EnhanceRequest) -> String {
    format!(
        r#"You are a prompt engineering assistant. Convert the user's request into a structured, reusable super prompt.
Follow this format:
- Objective
- Requirements (What, Why/Need, Market, Potential, Problem it Solves, Revenue, End Users, Additional Info)
Be explicit, concise, and professional. Avoid filler. Ensure completeness.

User request:
Custom Need: {}
Persona: {}
AI Role: {}
Audience: {}
Output Format: {}
Length: {}
Style: {}
Tone: {}
Constraints: {}"#,
        req.custom_need.trim(),
        req.persona.trim(),
        req.role.trim(),
        req.audience.trim(),
        req.output_format.trim(),
        req.length.trim(),
        req.style.trim(),
        req.tone.trim(),
        req.constraints.trim(),
    )
}

/// Input for a test run: the assembled prompt followed by sample user input.
pub fn test_input(prompt: &str, user_input: &str) -> String {
    format!("{}\n\nUser input:\n{}", prompt, user_input)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_prompt_lists_every_field() {
        let req = EnhanceRequest {
            custom_need: "cold outreach".to_string(),
            persona: "Founder".to_string(),
            role: "Copywriter".to_string(),
            audience: "Prospective Customers".to_string(),
            output_format: "Email".to_string(),
            length: "Short (100–200 words)".to_string(),
            style: "Persuasive".to_string(),
            tone: "Confident".to_string(),
            constraints: "no jargon".to_string(),
        };
        let prompt = enhance_prompt(&req);
        assert!(prompt.contains("Custom Need: cold outreach"));
        assert!(prompt.contains("Persona: Founder"));
        assert!(prompt.contains("AI Role: Copywriter"));
        assert!(prompt.contains("Output Format: Email"));
        assert!(prompt.contains("Length: Short (100–200 words)"));
        assert!(prompt.ends_with("Constraints: no jargon"));
        assert!(prompt.contains("- Objective"));
    }

    #[test]
    fn test_enhance_request_from_camel_case() {
        let req: EnhanceRequest =
            serde_json::from_str(r#"{"customNeed":"x","outputFormat":"FAQ","unknown":1}"#)
                .unwrap();
        assert_eq!(req.custom_need, "x");
        assert_eq!(req.output_format, "FAQ");
        assert!(req.persona.is_empty());
    }

    #[test]
    fn test_test_input_layout() {
        assert_eq!(
            test_input("Do the thing.", "some data"),
            "Do the thing.\n\nUser input:\nsome data"
        );
        assert_eq!(test_input("Do the thing.", ""), "Do the thing.\n\nUser input:");
    }

    #[test]
    fn test_is_blank_ignores_whitespace() {
        let mut req = EnhanceRequest {
            tone: "  ".to_string(),
            ..Default::default()
        };
        assert!(req.is_blank());
        req.constraints = "under 200 words".to_string();
        assert!(!req.is_blank());
    }
}
