//! Reply language enforcement.
//!
//! The question's language is guessed from its script. When the model answers
//! in a different script, one corrective call asks it to rewrite the reply.

use once_cell::sync::Lazy;
use regex::Regex;
use taai_core::chat::{ChatOptions, ChatRequest};
use taai_core::types::Message;
use taai_llm::LLMProvider;
use tracing::{debug, info, warn};

/// Letters that only appear in Turkish text
pub const TURKISH_DIACRITICS: &str = "çğıöşüÇĞİÖŞÜ";

/// Common Turkish question words
pub const TURKISH_KEYWORDS: [&str; 3] = ["nasıl", "nedir", "hakkında"];

static LATIN_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[a-zA-Z\s?.,!\-'"]+$"#).expect("latin-only pattern compiles"));

/// A test on the script of a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptDetector {
    /// The trimmed text is made only of ASCII letters, whitespace and basic punctuation
    LatinOnly,
    /// The text contains at least one of these characters
    DiacriticPresence(String),
    /// The text contains one of these words, ignoring case
    KeywordPresence(Vec<String>),
    /// Any of the inner detectors matches
    AnyOf(Vec<ScriptDetector>),
}

impl ScriptDetector {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ScriptDetector::LatinOnly => LATIN_ONLY.is_match(text.trim()),
            ScriptDetector::DiacriticPresence(chars) => text.chars().any(|c| chars.contains(c)),
            ScriptDetector::KeywordPresence(words) => {
                let lowered = text.to_lowercase();
                words.iter().any(|w| lowered.contains(&w.to_lowercase()))
            }
            ScriptDetector::AnyOf(detectors) => detectors.iter().any(|d| d.matches(text)),
        }
    }

    pub fn turkish_diacritics() -> Self {
        ScriptDetector::DiacriticPresence(TURKISH_DIACRITICS.to_string())
    }

    pub fn turkish_keywords() -> Self {
        ScriptDetector::KeywordPresence(TURKISH_KEYWORDS.iter().map(|w| w.to_string()).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Turkish,
}

impl Language {
    /// Instruction for the corrective call
    pub fn corrective_prompt(&self, message: &str, reply: &str) -> String {
        match self {
            Language::English => format!(
                "You are TAAI Agent. The user asked in English: \"{}\". You MUST respond ONLY in English. Rewrite this response in English: {}",
                message, reply
            ),
            Language::Turkish => format!(
                "Sen TAAI Agent'sın. Kullanıcı Türkçe sordu: \"{}\". Sadece Türkçe cevap ver. Bu cevabı Türkçe'ye çevir: {}",
                message, reply
            ),
        }
    }
}

/// How to recognise a language in the question and in the reply
#[derive(Debug, Clone)]
pub struct LanguageRule {
    pub language: Language,
    pub question: ScriptDetector,
    pub reply: ScriptDetector,
}

impl LanguageRule {
    pub fn english() -> Self {
        Self {
            language: Language::English,
            question: ScriptDetector::LatinOnly,
            reply: ScriptDetector::LatinOnly,
        }
    }

    pub fn turkish() -> Self {
        Self {
            language: Language::Turkish,
            question: ScriptDetector::AnyOf(vec![
                ScriptDetector::turkish_diacritics(),
                ScriptDetector::turkish_keywords(),
            ]),
            reply: ScriptDetector::turkish_diacritics(),
        }
    }
}

/// Whether a question reads as Turkish
pub fn is_turkish(message: &str) -> bool {
    LanguageRule::turkish().question.matches(message)
}

pub struct LanguageGuard {
    rules: Vec<LanguageRule>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl LanguageGuard {
    /// English is checked before Turkish
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            rules: vec![LanguageRule::english(), LanguageRule::turkish()],
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    pub fn with_rules(mut self, rules: Vec<LanguageRule>) -> Self {
        self.rules = rules;
        self
    }

    /// First language whose question detector matches
    pub fn detect(&self, message: &str) -> Option<&LanguageRule> {
        self.rules.iter().find(|rule| rule.question.matches(message))
    }

    /// The language to rewrite `reply` into, if it does not match the question
    pub fn needs_correction(&self, message: &str, reply: &str) -> Option<Language> {
        let rule = self.detect(message)?;
        if rule.reply.matches(reply) {
            None
        } else {
            Some(rule.language)
        }
    }

    /// Returns the reply in the question's language, making at most one
    /// corrective call. Falls back to `reply` when that call fails or is empty.
    pub async fn enforce(&self, llm: &dyn LLMProvider, message: &str, reply: String) -> String {
        let Some(language) = self.needs_correction(message, &reply) else {
            return reply;
        };

        info!(?language, "Reply language mismatch, requesting rewrite");

        let request = ChatRequest::new(self.model.clone())
            .with_message(Message::system(language.corrective_prompt(message, &reply)))
            .with_options(
                ChatOptions::new()
                    .with_temperature(self.temperature)
                    .with_max_tokens(self.max_tokens),
            );

        match llm.chat(request).await {
            Ok(response) => match response.non_empty_text() {
                Some(text) => text.to_string(),
                None => {
                    debug!("Corrective call returned nothing, keeping original reply");
                    reply
                }
            },
            Err(e) => {
                warn!("Corrective call failed, keeping original reply: {}", e);
                reply
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;

    fn guard() -> LanguageGuard {
        LanguageGuard::new("gpt-3.5-turbo", 0.3, 600)
    }

    #[test]
    fn test_latin_only() {
        let d = ScriptDetector::LatinOnly;
        assert!(d.matches("What is RSI?"));
        assert!(d.matches("  It's \"fine\", really!  "));
        assert!(!d.matches("RSI above 70"));
        assert!(!d.matches("Çok iyi"));
        assert!(!d.matches("   "));
    }

    #[test]
    fn test_latin_only_pattern_compiles() {
        assert!(LATIN_ONLY.is_match("Plain English"));
        assert!(!LATIN_ONLY.is_match("İyi"));
    }

    #[test]
    fn test_turkish_detection() {
        assert!(is_turkish("RSI nedir"));
        assert!(is_turkish("MACD NASIL kullanılır"));
        assert!(is_turkish("RSI 14 NEDİR"));
        assert!(is_turkish("14 Nedir"));
        assert!(is_turkish("İyi günler ş"));
        assert!(!is_turkish("What is RSI?"));
    }

    #[test]
    fn test_english_checked_first() {
        // "nedir" spelled in ASCII also passes the English test
        let guard = guard();
        assert_eq!(guard.detect("RSI nedir").map(|r| r.language), Some(Language::English));
        assert_eq!(guard.detect("RSI nedir?").map(|r| r.language), Some(Language::English));
        assert_eq!(guard.detect("RSI göstergesi").map(|r| r.language), Some(Language::Turkish));
    }

    #[test]
    fn test_needs_correction() {
        let guard = guard();
        assert_eq!(guard.needs_correction("What is RSI?", "RSI is an oscillator."), None);
        assert_eq!(
            guard.needs_correction("What is RSI?", "RSI bir osilatördür."),
            Some(Language::English)
        );
        assert_eq!(
            guard.needs_correction("RSI göstergesi nasıl", "RSI is an oscillator."),
            Some(Language::Turkish)
        );
        assert_eq!(guard.needs_correction("RSI göstergesi", "RSI bir göstergedir."), None);
        // neither language detected
        assert_eq!(guard.needs_correction("¿Qué es RSI 2?", "RSI bir göstergedir."), None);
    }

    #[tokio::test]
    async fn test_english_correction_is_adopted() {
        let provider = ScriptedProvider::new(vec![Ok("RSI is a momentum oscillator.".to_string())]);
        let result = guard()
            .enforce(&provider, "What is RSI?", "RSI bir momentum osilatörüdür.".to_string())
            .await;

        assert_eq!(result, "RSI is a momentum oscillator.");
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].messages[0].text().starts_with("You are TAAI Agent. The user asked in English: \"What is RSI?\""));
        assert_eq!(requests[0].options.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_turkish_correction_is_issued() {
        let provider = ScriptedProvider::new(vec![Ok("RSI bir göstergedir.".to_string())]);
        let result = guard()
            .enforce(&provider, "İyi bir gösterge nedir", "RSI is an indicator.".to_string())
            .await;

        assert_eq!(result, "RSI bir göstergedir.");
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].messages[0].text().starts_with("Sen TAAI Agent'sın."));
    }

    #[tokio::test]
    async fn test_failed_or_empty_correction_keeps_original() {
        let provider = ScriptedProvider::new(vec![Err("down".to_string()), Ok(String::new())]);
        let guard = guard();

        let first = guard.enforce(&provider, "What is RSI?", "RSI 70".to_string()).await;
        assert_eq!(first, "RSI 70");

        let second = guard.enforce(&provider, "What is RSI?", "RSI 70".to_string()).await;
        assert_eq!(second, "RSI 70");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_matching_reply_makes_no_call() {
        let provider = ScriptedProvider::new(vec![]);
        let result = guard()
            .enforce(&provider, "What is RSI?", "RSI is an oscillator.".to_string())
            .await;

        assert_eq!(result, "RSI is an oscillator.");
        assert!(provider.requests().is_empty());
    }
}
