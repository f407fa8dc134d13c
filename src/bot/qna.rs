//! Q&A bot: forwards each message to the hosted knowledge base.
//!
//! The JSON answer is printed straight to the console rather than sent
//! back through the adapter. Failures are logged and printed, and the
//! conversation carries on.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::adapters::{AdapterError, TurnContext, TurnOutcome};
use crate::qna::{to_pretty_json, QnaClient, QnaError, QnaResponse};

use super::{is_quit, message_text, Bot, FAREWELL};

/// Calls the Q&A endpoint once per message turn.
pub struct QnaBot<W = Stdout> {
    client: QnaClient,
    output: Mutex<W>,
}

impl<W> std::fmt::Debug for QnaBot<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QnaBot")
            .field("endpoint", &self.client.endpoint().as_str())
            .finish_non_exhaustive()
    }
}

impl QnaBot<Stdout> {
    /// Bot printing answers to stdout.
    pub fn new(client: QnaClient) -> Self {
        Self::with_output(client, tokio::io::stdout())
    }
}

impl<W> QnaBot<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Bot printing answers to `output`.
    pub fn with_output(client: QnaClient, output: W) -> Self {
        Self {
            client,
            output: Mutex::new(output),
        }
    }

    /// Consume the bot and return its writer.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    async fn ask(&self, question: &str) -> Result<String, QnaError> {
        let answer = self.client.generate_answer(question).await?;
        log_top_answer(&answer);
        to_pretty_json(&answer)
    }

    async fn print(&self, text: &str) -> Result<(), AdapterError> {
        let mut output = self.output.lock().await;
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

fn log_top_answer(answer: &Value) {
    match serde_json::from_value::<QnaResponse>(answer.clone()) {
        Ok(response) => match response.top_answer() {
            Some(top) => debug!(score = top.score, id = ?top.id, "qna top answer"),
            None => debug!("qna returned no answers"),
        },
        Err(e) => debug!(error = %e, "qna response has no typed answers"),
    }
}

#[async_trait]
impl<W> Bot for QnaBot<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn on_turn(&self, context: &TurnContext<'_>) -> Result<TurnOutcome, AdapterError> {
        let Some(text) = message_text(context) else {
            return Ok(TurnOutcome::Continue);
        };

        if is_quit(text) {
            context.send_activity(FAREWELL).await?;
            return Ok(TurnOutcome::Terminate);
        }

        match self.ask(text).await {
            Ok(rendered) => self.print(&rendered).await?,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "qna call failed");
                self.print(&format!("Unexpected error: {e}")).await?;
            }
        }

        Ok(TurnOutcome::Continue)
    }
}
