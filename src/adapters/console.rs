//! Console adapter: stdin in, stdout out.
//!
//! Every input line becomes one message activity on a fixed conversation.
//! Outgoing activities are printed one per line; `delay` activities pause
//! the batch before the next one is printed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::bot::Bot;
use crate::schema::{Activity, ActivityType, ConversationReference, ResourceResponse};

use super::middleware::{Middleware, MiddlewareSet};
use super::{AdapterError, BotAdapter, TurnContext, TurnOutcome};

/// Lets a user talk to a bot from a terminal.
///
/// Generic over the output writer so tests can capture what is printed.
pub struct ConsoleAdapter<W = Stdout> {
    reference: ConversationReference,
    next_id: AtomicU64,
    output: Mutex<W>,
    middleware: MiddlewareSet,
    skip_blank_lines: bool,
}

impl<W> std::fmt::Debug for ConsoleAdapter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleAdapter")
            .field("reference", &self.reference)
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("middleware", &self.middleware.len())
            .field("skip_blank_lines", &self.skip_blank_lines)
            .finish_non_exhaustive()
    }
}

impl ConsoleAdapter<Stdout> {
    /// Adapter printing to the process's stdout.
    pub fn new(reference: ConversationReference) -> Self {
        Self::with_output(reference, tokio::io::stdout())
    }
}

impl<W> ConsoleAdapter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Adapter printing to `output`.
    pub fn with_output(reference: ConversationReference, output: W) -> Self {
        Self {
            reference,
            next_id: AtomicU64::new(0),
            output: Mutex::new(output),
            middleware: MiddlewareSet::new(),
            skip_blank_lines: true,
        }
    }

    /// Register a middleware to run around every turn.
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware = self.middleware.with(middleware);
        self
    }

    /// Whether blank input lines are dropped instead of dispatched.
    #[must_use]
    pub fn skip_blank_lines(mut self, skip: bool) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    /// The fixed conversation every incoming activity is stamped with.
    pub fn reference(&self) -> &ConversationReference {
        &self.reference
    }

    /// Consume the adapter and return its writer.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    /// Listen to stdin and run `logic` once per line.
    ///
    /// Returns when a turn asks to terminate or stdin is closed. Stdin is
    /// read on a dedicated thread so a pending read never holds up runtime
    /// shutdown.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdapterError`] raised by reading input or by a turn.
    pub async fn process_activity(&self, logic: &dyn Bot) -> Result<(), AdapterError> {
        let mut lines = spawn_stdin_reader()?;
        while let Some(line) = lines.recv().await {
            if self.handle_line(line?, logic).await? == TurnOutcome::Terminate {
                return Ok(());
            }
        }

        debug!("console input closed");
        Ok(())
    }

    /// Run `logic` once per line of `input`.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdapterError`] raised by reading input or by a turn.
    pub async fn process_lines<R>(&self, input: R, logic: &dyn Bot) -> Result<(), AdapterError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if self.handle_line(line, logic).await? == TurnOutcome::Terminate {
                return Ok(());
            }
        }

        debug!("console input closed");
        Ok(())
    }

    async fn handle_line(&self, line: String, logic: &dyn Bot) -> Result<TurnOutcome, AdapterError> {
        if self.skip_blank_lines && line.trim().is_empty() {
            debug!("skipping blank input line");
            return Ok(TurnOutcome::Continue);
        }

        let activity = self.incoming_activity(line);
        let context = TurnContext::new(self, activity);
        let outcome = self.run_middleware(&context, logic).await?;
        if outcome == TurnOutcome::Terminate {
            info!("turn requested termination, leaving input loop");
        }
        Ok(outcome)
    }

    /// Run the registered middleware around `logic` for one turn.
    ///
    /// # Errors
    ///
    /// Propagates errors from middleware or logic.
    pub async fn run_middleware(
        &self,
        context: &TurnContext<'_>,
        logic: &dyn Bot,
    ) -> Result<TurnOutcome, AdapterError> {
        self.middleware.run(context, logic).await
    }

    fn incoming_activity(&self, text: String) -> Activity {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        Activity::incoming(text, id, Utc::now()).apply_conversation_reference(&self.reference)
    }

    async fn write_line(&self, line: &str) -> Result<(), AdapterError> {
        let mut output = self.output.lock().await;
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

// Lines read from stdin on a plain thread, one at a time.
fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<std::io::Result<String>>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::Builder::new()
        .name("console-stdin".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Console rendering of a message activity.
///
/// Appends an attachment count when the message carries attachments.
pub fn format_message(activity: &Activity) -> String {
    let text = activity.text.as_deref().unwrap_or_default();
    match activity.attachments.len() {
        0 => text.to_owned(),
        1 => format!("{text} (1 attachment)"),
        n => format!("{text} ({n} attachments)"),
    }
}

#[async_trait]
impl<W> BotAdapter for ConsoleAdapter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_activities(
        &self,
        _context: &TurnContext<'_>,
        activities: Vec<Activity>,
    ) -> Result<Vec<ResourceResponse>, AdapterError> {
        if activities.is_empty() {
            return Err(AdapterError::InvalidArgument {
                operation: "ConsoleAdapter.send_activities",
                reason: "`activities` cannot be empty",
            });
        }

        let mut responses = Vec::with_capacity(activities.len());
        for activity in &activities {
            responses.push(ResourceResponse::new());
            match activity.kind {
                ActivityType::Delay => {
                    let pause = activity.delay_duration().unwrap_or_default();
                    debug!(?pause, "delaying outgoing batch");
                    tokio::time::sleep(pause).await;
                }
                ActivityType::Message => {
                    if !activity.attachments.is_empty() {
                        debug!(count = activity.attachments.len(), "message has attachments");
                    }
                    self.write_line(&format_message(activity)).await?;
                }
                ref other => self.write_line(&format!("[{other}]")).await?,
            }
        }

        Ok(responses)
    }

    async fn update_activity(
        &self,
        _context: &TurnContext<'_>,
        _activity: Activity,
    ) -> Result<ResourceResponse, AdapterError> {
        Err(AdapterError::Unsupported {
            operation: "ConsoleAdapter.update_activity",
        })
    }

    async fn delete_activity(
        &self,
        _context: &TurnContext<'_>,
        _reference: &ConversationReference,
    ) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported {
            operation: "ConsoleAdapter.delete_activity",
        })
    }
}
