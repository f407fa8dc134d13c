//! Echo bot: repeats what the user said.

use async_trait::async_trait;

use crate::adapters::{AdapterError, TurnContext, TurnOutcome};

use super::{is_quit, message_text, Bot, FAREWELL};

/// Replies with `I heard you say <text>`; says goodbye and terminates on `quit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBot;

/// Echo reply for `text`.
pub fn echo_reply(text: &str) -> String {
    format!("I heard you say {text}")
}

#[async_trait]
impl Bot for EchoBot {
    async fn on_turn(&self, context: &TurnContext<'_>) -> Result<TurnOutcome, AdapterError> {
        let Some(text) = message_text(context) else {
            return Ok(TurnOutcome::Continue);
        };

        if is_quit(text) {
            context.send_activity(FAREWELL).await?;
            return Ok(TurnOutcome::Terminate);
        }

        context.send_activity(&echo_reply(text)).await?;
        Ok(TurnOutcome::Continue)
    }
}
