//! Prompt text sent to each generation service.

/// Research text used when the Researcher has no credential.
pub const RESEARCH_UNAVAILABLE: &str = "(Perplexity key not configured)";

/// Prefix placed before the raw requirement in the Specifier's user message.
pub const SPECIFIER_INSTRUCTION: &str =
    "Organize the following requirements into a specification document.";

/// System message for the Designer.
pub const DESIGNER_SYSTEM: &str =
    "You are a design engineer. From the specification, produce an ER diagram and API definitions.";

/// System message for the Researcher.
pub const RESEARCHER_SYSTEM: &str = "You are a technical research assistant.";

pub fn specifier_user_message(prompt: &str) -> String {
    format!("{SPECIFIER_INSTRUCTION}\n\n{prompt}")
}

pub fn researcher_user_message(title: &str, spec: &str) -> String {
    format!(
        "Feature: {title}\nSpecification:\n{spec}\nBriefly summarize the relevant technologies and APIs."
    )
}
