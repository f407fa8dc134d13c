//! Per-turn context handed to bot logic.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::schema::{Activity, ConversationReference, ResourceResponse};

use super::{AdapterError, BotAdapter};

/// Pairs an adapter with the one incoming activity of a turn.
///
/// Created by the adapter for every incoming activity and dropped when the
/// turn completes. Outgoing activities sent through the context are
/// addressed back to the sender of the incoming one.
pub struct TurnContext<'a> {
    adapter: &'a dyn BotAdapter,
    activity: Activity,
    responded: AtomicBool,
}

impl std::fmt::Debug for TurnContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("activity", &self.activity)
            .field("responded", &self.responded())
            .finish_non_exhaustive()
    }
}

impl<'a> TurnContext<'a> {
    /// Wrap an incoming activity for dispatch through `adapter`.
    pub fn new(adapter: &'a dyn BotAdapter, activity: Activity) -> Self {
        Self {
            adapter,
            activity,
            responded: AtomicBool::new(false),
        }
    }

    /// The incoming activity for this turn.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Whether anything has been sent during this turn.
    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::Relaxed)
    }

    /// Send a single text message back to the user.
    ///
    /// # Errors
    ///
    /// Propagates any [`AdapterError`] raised by the adapter.
    pub async fn send_activity(&self, text: &str) -> Result<ResourceResponse, AdapterError> {
        let mut responses = self.send_activities(vec![Activity::message(text)]).await?;
        Ok(responses.pop().unwrap_or_default())
    }

    /// Send a batch of activities back to the user, in order.
    ///
    /// # Errors
    ///
    /// Propagates any [`AdapterError`] raised by the adapter, including
    /// [`AdapterError::InvalidArgument`] for an empty batch.
    pub async fn send_activities(
        &self,
        activities: Vec<Activity>,
    ) -> Result<Vec<ResourceResponse>, AdapterError> {
        let addressed = activities
            .into_iter()
            .map(|activity| self.address_reply(activity))
            .collect();
        let responses = self.adapter.send_activities(self, addressed).await?;
        self.responded.store(true, Ordering::Relaxed);
        Ok(responses)
    }

    /// Replace a previously sent activity.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error; the console always refuses.
    pub async fn update_activity(
        &self,
        activity: Activity,
    ) -> Result<ResourceResponse, AdapterError> {
        self.adapter.update_activity(self, activity).await
    }

    /// Retract a previously sent activity by id.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error; the console always refuses.
    pub async fn delete_activity(&self, activity_id: &str) -> Result<(), AdapterError> {
        let reference = ConversationReference {
            activity_id: Some(activity_id.to_owned()),
            ..self.reference()
        };
        self.adapter.delete_activity(self, &reference).await
    }

    /// Conversation reference describing where this turn came from.
    pub fn reference(&self) -> ConversationReference {
        let incoming = &self.activity;
        let default = ConversationReference::default();
        ConversationReference {
            activity_id: incoming.id.clone(),
            user: incoming.from.clone().unwrap_or(default.user),
            bot: incoming.recipient.clone().unwrap_or(default.bot),
            conversation: incoming.conversation.clone().unwrap_or(default.conversation),
            channel_id: incoming.channel_id.clone(),
            service_url: incoming.service_url.clone(),
        }
    }

    // Outgoing activities go from the bot to the user on the same conversation.
    fn address_reply(&self, mut outgoing: Activity) -> Activity {
        let incoming = &self.activity;
        outgoing.channel_id = incoming.channel_id.clone();
        outgoing.service_url = incoming.service_url.clone();
        outgoing.conversation = incoming.conversation.clone();
        outgoing.from = incoming.recipient.clone();
        outgoing.recipient = incoming.from.clone();
        if outgoing.reply_to_id.is_none() {
            outgoing.reply_to_id = incoming.id.clone();
        }
        outgoing
    }
}
