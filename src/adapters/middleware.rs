//! Middleware run by an adapter around bot logic on every turn.
//!
//! Before hooks run in registration order and can stop the turn; after
//! hooks run in reverse order once the logic has produced an outcome.
//! An empty set is a pass-through.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::bot::Bot;

use super::{AdapterError, TurnContext, TurnOutcome};

/// A hook around bot logic.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Runs before the bot logic. Returning `false` skips the logic and the
    /// remaining middleware for this turn.
    ///
    /// # Errors
    ///
    /// An error aborts the turn and is propagated to the input loop.
    async fn before(&self, _context: &TurnContext<'_>) -> Result<bool, AdapterError> {
        Ok(true)
    }

    /// Runs after the bot logic with the outcome it produced.
    ///
    /// # Errors
    ///
    /// An error aborts the turn and is propagated to the input loop.
    async fn after(
        &self,
        _context: &TurnContext<'_>,
        _outcome: TurnOutcome,
    ) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Ordered list of middleware.
#[derive(Clone, Default)]
pub struct MiddlewareSet {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware.
    #[must_use]
    pub fn with(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Whether no middleware is registered.
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Run every before hook, then `logic`, then every after hook in reverse.
    ///
    /// A before hook returning `false` ends the turn with
    /// [`TurnOutcome::Continue`] without calling `logic`.
    ///
    /// # Errors
    ///
    /// Propagates the first error from a hook or from `logic`.
    pub async fn run(
        &self,
        context: &TurnContext<'_>,
        logic: &dyn Bot,
    ) -> Result<TurnOutcome, AdapterError> {
        for mw in &self.middleware {
            if !mw.before(context).await? {
                debug!(
                    middleware = std::any::type_name_of_val(mw.as_ref()),
                    "middleware stopped the turn"
                );
                return Ok(TurnOutcome::Continue);
            }
        }

        let outcome = logic.on_turn(context).await?;

        for mw in self.middleware.iter().rev() {
            mw.after(context, outcome).await?;
        }

        Ok(outcome)
    }
}

/// Logs the start and end of each turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn before(&self, context: &TurnContext<'_>) -> Result<bool, AdapterError> {
        let activity = context.activity();
        info!(
            activity_id = activity.id.as_deref().unwrap_or("-"),
            kind = %activity.kind,
            text_len = activity.text.as_deref().map_or(0, str::len),
            "turn started"
        );
        Ok(true)
    }

    async fn after(
        &self,
        context: &TurnContext<'_>,
        outcome: TurnOutcome,
    ) -> Result<(), AdapterError> {
        info!(
            activity_id = context.activity().id.as_deref().unwrap_or("-"),
            ?outcome,
            responded = context.responded(),
            "turn finished"
        );
        Ok(())
    }
}
