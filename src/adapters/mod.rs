//! Adapters: channel-side plumbing between a transport and bot logic.
//!
//! An adapter turns raw input into [`Activity`] records, hands each one to
//! bot logic wrapped in a [`TurnContext`], and delivers whatever the bot
//! sends back. Only the console channel is implemented.

use async_trait::async_trait;

use crate::schema::{Activity, ConversationReference, ResourceResponse};

pub mod console;
pub mod context;
pub mod middleware;

pub use console::ConsoleAdapter;
pub use context::TurnContext;
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareSet};

// ---------------------------------------------------------------------------
// Turn outcome
// ---------------------------------------------------------------------------

/// What the input loop should do after a turn completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Keep reading input.
    Continue,
    /// Stop the loop and return to the caller.
    Terminate,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by adapters and by logic running inside a turn.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A caller broke the operation's argument contract.
    #[error("{operation}(): {reason}")]
    InvalidArgument {
        /// Operation that rejected its arguments.
        operation: &'static str,
        /// What was wrong.
        reason: &'static str,
    },
    /// The channel cannot perform this operation at all.
    #[error("{operation}(): not supported")]
    Unsupported {
        /// Operation that was attempted.
        operation: &'static str,
    },
    /// Reading input or writing output failed.
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Outbound half of a channel adapter.
///
/// [`TurnContext`] routes every send, update and delete through this trait,
/// so bot logic never talks to a transport directly.
#[async_trait]
pub trait BotAdapter: Send + Sync {
    /// Deliver a batch of activities in order.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidArgument`] for an empty batch and
    /// [`AdapterError::Io`] when delivery fails.
    async fn send_activities(
        &self,
        context: &TurnContext<'_>,
        activities: Vec<Activity>,
    ) -> Result<Vec<ResourceResponse>, AdapterError>;

    /// Replace a previously sent activity.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Unsupported`] when the channel cannot edit output.
    async fn update_activity(
        &self,
        context: &TurnContext<'_>,
        activity: Activity,
    ) -> Result<ResourceResponse, AdapterError>;

    /// Retract a previously sent activity.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Unsupported`] when the channel cannot retract output.
    async fn delete_activity(
        &self,
        context: &TurnContext<'_>,
        reference: &ConversationReference,
    ) -> Result<(), AdapterError>;
}
