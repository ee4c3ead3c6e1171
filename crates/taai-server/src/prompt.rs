//! Upstream prompt assembly and the crypto token disclaimer.

use taai_config::PromptConfig;
use taai_core::types::{HistoryTurn, Message};

use crate::language::is_turkish;

/// Persona and response rules sent ahead of every conversation
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are TAAI Agent (Technical Analysis AI Agent), an expert financial advisor specializing in technical analysis.

RESPONSE RULES:
1. Provide information only on technical analysis topics
2. Do not give investment advice, only provide educational information
3. CRITICAL: You MUST respond in the EXACT same language as the user's question
4. If user asks in English, respond ONLY in English
5. If user asks in Turkish, respond ONLY in Turkish
6. If user asks in any other language, respond in that language
7. Provide detailed explanations on technical indicators, chart patterns, trend analysis, etc.
8. Include risk management warnings
9. Explain complex topics in simple and understandable terms
10. Provide examples and practical information
11. Always add the disclaimer \"This is not investment advice\"
12. Keep responses concise but informative (max 2-3 paragraphs)
13. Use bullet points for key concepts when appropriate";

/// Number of trailing history turns forwarded upstream
pub const HISTORY_WINDOW: usize = 5;

/// Tickers and names that mark a question as being about a specific token
pub const CRYPTO_KEYWORDS: [&str; 40] = [
    "BTC", "ETH", "SOL", "DOGE", "ADA", "DOT", "LINK", "UNI", "MATIC", "AVAX",
    "XRP", "LTC", "BCH", "ETC", "XLM", "VET", "TRX", "FIL", "ATOM", "NEAR",
    "bitcoin", "ethereum", "solana", "dogecoin", "cardano", "polkadot", "chainlink", "uniswap",
    "matic", "avalanche", "ripple", "litecoin", "bitcoin cash", "ethereum classic", "stellar",
    "vechain", "tron", "filecoin", "cosmos", "near",
];

pub const ENGLISH_DISCLAIMER: &str = "Hello, I'm TAAI Agent! I'm currently in development and cannot yet perform specific token analysis. For now, I'll share information with you that you can use to perform general technical analysis of your desired token. You can use these to analyze on real-time charts.\n\n";

pub const TURKISH_DISCLAIMER: &str = "Merhaba ben TAAI Agent! Şuan gelişim aşamasındayım ve henüz spesifik token analizleri yapamıyorum. Bunun için şimdilik sizlere istediğiniz tokenin genel teknik analizinizi yapabileceğiniz bilgileri paylaşacağım. Bunları kullanarak gerçek zamanlı grafik üzerinde analiz yapabilirsiniz.\n\n";

/// Case-insensitive substring match against [`CRYPTO_KEYWORDS`].
///
/// Short tickers match inside ordinary words ("dot" in "dotted"), which is
/// accepted behaviour.
pub fn is_crypto_question(message: &str) -> bool {
    let lowered = message.to_lowercase();
    CRYPTO_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}

/// Disclaimer paragraph in the question's language
pub fn crypto_disclaimer(message: &str) -> &'static str {
    if is_turkish(message) {
        TURKISH_DISCLAIMER
    } else {
        ENGLISH_DISCLAIMER
    }
}

#[derive(Debug, Clone)]
pub struct PromptComposer {
    rules: String,
}

impl PromptComposer {
    pub fn new(rules: impl Into<String>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn from_config(config: &PromptConfig) -> Self {
        match config.system_prompt.as_deref() {
            Some(prompt) if !prompt.trim().is_empty() => Self::new(prompt),
            _ => Self::default(),
        }
    }

    /// Rules followed by the instruction to answer in the question's language
    pub fn system_prompt(&self, message: &str) -> String {
        format!(
            "{}\n\nLANGUAGE ENFORCEMENT: The user asked: \"{}\". Detect the language and respond in EXACTLY the same language.",
            self.rules, message
        )
    }

    /// System message, the last [`HISTORY_WINDOW`] turns, then the question
    pub fn compose(&self, message: &str, history: &[HistoryTurn]) -> Vec<Message> {
        let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Message::system(self.system_prompt(message)));
        messages.extend(recent.iter().map(Message::from));
        messages.push(Message::user(message));
        messages
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taai_core::types::Role;

    #[test]
    fn test_compose_without_history() {
        let messages = PromptComposer::default().compose("What is RSI?", &[]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].text().contains("\"What is RSI?\""));
        assert!(messages[0].text().starts_with("You are TAAI Agent (Technical Analysis AI Agent)"));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].text(), "What is RSI?");
    }

    #[test]
    fn test_compose_keeps_last_five_turns() {
        let history: Vec<HistoryTurn> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    HistoryTurn::user(format!("q{}", i))
                } else {
                    HistoryTurn::assistant(format!("a{}", i))
                }
            })
            .collect();

        let messages = PromptComposer::default().compose("next", &history);

        assert_eq!(messages.len(), 7);
        assert_eq!(messages[1].text(), "a3");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[5].text(), "a7");
        assert_eq!(messages[6].text(), "next");
    }

    #[test]
    fn test_configured_prompt_overrides_rules() {
        let config = PromptConfig {
            system_prompt: Some("Be brief.".to_string()),
        };
        let composer = PromptComposer::from_config(&config);
        assert!(composer.system_prompt("hi").starts_with("Be brief.\n\nLANGUAGE ENFORCEMENT"));

        let blank = PromptConfig {
            system_prompt: Some("  ".to_string()),
        };
        assert!(PromptComposer::from_config(&blank)
            .system_prompt("hi")
            .starts_with("You are TAAI Agent"));
    }

    #[test]
    fn test_crypto_detection() {
        assert!(is_crypto_question("What about btc today?"));
        assert!(is_crypto_question("Is Ethereum trending?"));
        assert!(!is_crypto_question("What is RSI?"));
        // substring matches are kept as they are
        assert!(is_crypto_question("How do dotted trendlines work?"));
    }

    #[test]
    fn test_disclaimer_language() {
        assert_eq!(crypto_disclaimer("BTC analysis please"), ENGLISH_DISCLAIMER);
        assert_eq!(crypto_disclaimer("BTC nasıl gidiyor"), TURKISH_DISCLAIMER);
        assert!(ENGLISH_DISCLAIMER.ends_with("\n\n"));
    }
}
