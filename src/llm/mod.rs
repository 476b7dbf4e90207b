pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    Gemini,
    Ollama,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}
impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(LlmType::Gemini),
            "ollama" => Ok(LlmType::Ollama),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmType::Gemini => f.write_str("gemini"),
            LlmType::Ollama => f.write_str("ollama"),
        }
    }
}

/// Per-generator model settings. Each generator builds its own client
/// because the joke and dish prompts want different sampling.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::Gemini,
            api_key: None,
            completion_model: None,
            base_url: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Whether a client can be built at all. Ollama runs locally and needs no key.
    pub fn has_credential(&self) -> bool {
        match self.llm_type {
            LlmType::Gemini => self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()),
            LlmType::Ollama => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_llm_type() {
        assert_eq!("Gemini".parse::<LlmType>(), Ok(LlmType::Gemini));
        assert_eq!("ollama".parse::<LlmType>(), Ok(LlmType::Ollama));
        assert!("groq".parse::<LlmType>().is_err());
    }

    #[test]
    fn gemini_needs_a_key() {
        let mut config = LlmConfig::default();
        assert!(!config.has_credential());
        config.api_key = Some("  ".into());
        assert!(!config.has_credential());
        config.api_key = Some("secret".into());
        assert!(config.has_credential());

        let local = LlmConfig { llm_type: LlmType::Ollama, ..LlmConfig::default() };
        assert!(local.has_credential());
    }
}
