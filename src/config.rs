// Runtime configuration, loaded from environment variables (optionally via a
// .env file loaded in main). Defaults are chosen so `helio chat` works against
// a local mock without any configuration beyond an API key.

use std::env;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

lazy_static! {
    /// Which completion provider wire schema to speak: "gemini" or "openai".
    pub static ref PROVIDER_KIND: String =
        env::var("HELIO_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
    /// Completion endpoint URL. Empty means "use the provider's default".
    pub static ref API_URL: String = env::var("HELIO_API_URL").unwrap_or_default();
    pub static ref API_KEY: String = env::var("HELIO_API_KEY").unwrap_or_default();
    pub static ref MODEL: String =
        env::var("HELIO_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
    /// Maximum number of catalog items attached to a single message.
    pub static ref RECOMMEND_CAP: usize = env::var("HELIO_RECOMMEND_CAP")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3);
}

pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn default_url(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => DEFAULT_GEMINI_URL,
            ProviderKind::OpenAi => DEFAULT_OPENAI_URL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(anyhow::anyhow!(
                "unknown provider kind '{}' (expected 'gemini' or 'openai')",
                other
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Everything that used to vary across the re-skinned UI variants, collapsed
/// into one struct: persona identity, greeting, system prompt, and the bits of
/// branding a renderer needs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PersonaConfig {
    pub name: String,
    pub tagline: String,
    pub greeting: String,
    pub system_prompt: String,
    pub avatar: String,
    pub accent_color: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        PersonaConfig {
            name: "Dr. Helio".to_string(),
            tagline: "Your sunshine healthcare companion".to_string(),
            greeting: "Hello! I'm Dr. Helio, your personal healthcare companion. \
                       How can I assist you today?"
                .to_string(),
            system_prompt: dr_helio_system_prompt(),
            avatar: "/static/dr-helio.svg".to_string(),
            accent_color: "#f59e0b".to_string(),
        }
    }
}

/// Reply shown in place of a provider response when the call fails for any
/// reason. Fixed text, no retry.
pub const APOLOGY_REPLY: &str = "I'm having trouble connecting to my knowledge base \
                                 right now. Please try again in a moment.";

// The persona instruction plus the strict reply template: causes, medication
// caution, home remedies, diet, disclaimer, closing question. Emphasis uses
// paired ** so the formatter can classify it; the model is never asked to
// produce raw HTML.
fn dr_helio_system_prompt() -> String {
    concat!(
        "You are Dr. Helio, a sunshine healthcare companion AI. ",
        "You provide helpful health information, wellness tips, and emotional support. ",
        "Always be compassionate, informative, and prioritize user well-being. ",
        "Remember to clarify that you're not a replacement for professional medical advice. ",
        "Format your responses exactly like this example:\n\n",
        "I'm here to help. [Problem], especially [specific symptom], can be quite uncomfortable.\n\n",
        "**Causes of [Problem]:**\n\n",
        "1. [Cause one with brief explanation]\n\n",
        "2. [Cause two with brief explanation]\n\n",
        "3. [Cause three with brief explanation]\n\n",
        "**Recommended Medications: (Before use please consult the doctor)**\n\n",
        "1. **[Medicine name]**: How it works and typical usage\n\n",
        "2. **[Medicine name]**: How it works and typical usage\n\n",
        "**Home Remedies:**\n\n",
        "1. **[Remedy name]**: Detailed explanation of how to prepare and use\n\n",
        "2. **[Remedy name]**: Detailed explanation of how to prepare and use\n\n",
        "**Recommended Diet:**\n\n",
        "1. **Foods to Include:**\n\n",
        "   * [Food item] - Benefits for this condition\n\n",
        "   * [Food item] - Benefits for this condition\n\n",
        "2. **Foods to Avoid:**\n\n",
        "   * [Food item] - Why it should be avoided\n\n",
        "   * [Food item] - Why it should be avoided\n\n",
        "**Important Reminder:**\n\n",
        "It's essential to consult with a healthcare professional for a proper diagnosis ",
        "and treatment plan. The information provided is for educational purposes only.\n\n",
        "[Closing question to engage the user]",
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Gemini ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_default_urls() {
        assert!(ProviderKind::Gemini.default_url().contains("generativelanguage"));
        assert!(ProviderKind::OpenAi.default_url().contains("api.openai.com"));
    }

    #[test]
    fn test_default_persona() {
        let persona = PersonaConfig::default();
        assert_eq!(persona.name, "Dr. Helio");
        assert!(persona.greeting.contains("healthcare companion"));
        assert!(persona.system_prompt.contains("**Home Remedies:**"));
        assert!(persona.system_prompt.contains("Closing question"));
        // The prompt template must not ask the model for raw markup.
        assert!(!persona.system_prompt.contains("<strong>"));
    }
}
