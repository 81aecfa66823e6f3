//! Agent module - intent handling.
//!
//! Every intent follows the same path:
//! 1. Pick the intent's fixed instruction and default prompt
//! 2. Optionally ground the instruction with reference documents
//! 3. Build the system + user conversation
//! 4. Call the shared generation client and time the call

mod handler;
mod intents;
mod prompt;
mod sentiment;

pub use handler::{AgentService, IntentReply};
pub use intents::{Intent, IntentProfile, GENERAL_INFORMATION_AGENT, INTENTS};
pub use prompt::build_conversation;
pub use sentiment::{parse_sentiment, SentimentAnalysis, SentimentLabel};
