//! Bot logic invoked by an adapter once per incoming activity.
//!
//! Two behaviors are provided:
//! - [`echo::EchoBot`]: echoes text back, ends the conversation on `quit`
//! - [`qna::QnaBot`]: forwards text to a hosted Q&A endpoint and prints
//!   the JSON answer

use async_trait::async_trait;

use crate::adapters::{AdapterError, TurnContext, TurnOutcome};

pub mod echo;
pub mod qna;

pub use echo::EchoBot;
pub use qna::QnaBot;

/// Command that ends the conversation, compared case-insensitively.
pub const QUIT_COMMAND: &str = "quit";

/// Reply sent before the conversation ends.
pub const FAREWELL: &str = "Bye!";

/// Logic run for every turn.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Handle one incoming activity.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when sending a reply fails.
    async fn on_turn(&self, context: &TurnContext<'_>) -> Result<TurnOutcome, AdapterError>;
}

/// Text of an incoming message, if the turn carries a non-empty one.
pub(crate) fn message_text<'c>(context: &'c TurnContext<'_>) -> Option<&'c str> {
    let activity = context.activity();
    if activity.kind != crate::schema::ActivityType::Message {
        return None;
    }
    activity.text.as_deref().filter(|text| !text.is_empty())
}

/// Whether `text` asks the bot to end the conversation.
pub fn is_quit(text: &str) -> bool {
    text.eq_ignore_ascii_case(QUIT_COMMAND)
}
