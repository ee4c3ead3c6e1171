//! Stand-in agent provider.
//!
//! Answers every prompt with a fixed explanatory reply after a short planning
//! delay. It speaks the same request/response shape as the chat route so a
//! real agent can replace it without client changes.

use std::time::Duration;

use taai_core::types::HistoryTurn;
use tracing::info;

pub const DEFAULT_PLANNING_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct MockAgent {
    name: String,
    delay: Duration,
}

impl MockAgent {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn assist(&self, message: &str, history: &[HistoryTurn]) -> String {
        info!(
            agent = %self.name,
            history_len = history.len(),
            "Agent processing message"
        );

        // planning phase
        tokio::time::sleep(self.delay).await;

        Self::render_reply(message)
    }

    fn render_reply(prompt: &str) -> String {
        format!(
            r#"**TAAI Agent (agent mode)**

Thank you for your question about: "{prompt}"

Agent mode adds multi-step reasoning on top of the regular chat. It is still a preview.

**What This Means:**
• **Enhanced Reasoning**: Multi-step analysis and planning
• **Tool Integration**: Future capability for real-time data access
• **Memory Management**: Persistent context across sessions
• **Event Streaming**: Progress updates during analysis

**Technical Analysis Response:**
Based on your question, here's what you should know about technical analysis:

**Key Concepts:**
• Technical indicators help identify market trends and momentum
• Chart patterns provide insights into potential price movements
• Risk management is crucial for successful trading
• Multiple timeframes should be considered for comprehensive analysis

**Current Capabilities:**
✅ Basic technical analysis explanations
✅ Risk management guidance
✅ Educational content delivery

**Coming Soon:**
🔄 Real-time market data integration
🔄 Advanced chart pattern recognition
🔄 Multi-step analysis workflows

**Important Note:** This is not investment advice. Always do your own research and consider consulting with financial professionals."#
        )
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new("TAAI Agent", DEFAULT_PLANNING_DELAY)
    }
}
