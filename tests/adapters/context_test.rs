//! Turn context routing: replies are addressed back to the sender.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use consolebot::adapters::{AdapterError, BotAdapter, TurnContext};
use consolebot::schema::{Activity, ConversationReference, ResourceResponse};

/// Adapter that keeps everything it is asked to send.
#[derive(Default)]
struct CapturingAdapter {
    sent: Mutex<Vec<Activity>>,
}

impl CapturingAdapter {
    fn sent(&self) -> Vec<Activity> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(err) => panic!("capture lock poisoned: {err}"),
        }
    }
}

#[async_trait]
impl BotAdapter for CapturingAdapter {
    async fn send_activities(
        &self,
        _context: &TurnContext<'_>,
        activities: Vec<Activity>,
    ) -> Result<Vec<ResourceResponse>, AdapterError> {
        let responses = activities.iter().map(|_| ResourceResponse::new()).collect();
        match self.sent.lock() {
            Ok(mut sent) => sent.extend(activities),
            Err(err) => panic!("capture lock poisoned: {err}"),
        }
        Ok(responses)
    }

    async fn update_activity(
        &self,
        _context: &TurnContext<'_>,
        _activity: Activity,
    ) -> Result<ResourceResponse, AdapterError> {
        Ok(ResourceResponse::new())
    }

    async fn delete_activity(
        &self,
        _context: &TurnContext<'_>,
        reference: &ConversationReference,
    ) -> Result<(), AdapterError> {
        assert_eq!(reference.activity_id.as_deref(), Some("41"));
        Ok(())
    }
}

fn incoming() -> Activity {
    Activity::incoming("hello", 7, Utc::now())
        .apply_conversation_reference(&ConversationReference::default())
}

#[tokio::test]
async fn reply_swaps_sender_and_recipient() {
    let adapter = CapturingAdapter::default();
    let context = TurnContext::new(&adapter, incoming());
    assert!(!context.responded());

    let response = context.send_activity("hi back").await;
    assert!(response.is_ok());
    assert!(context.responded());

    let sent = adapter.sent();
    assert_eq!(sent.len(), 1);
    let reply = &sent[0];
    assert_eq!(reply.text.as_deref(), Some("hi back"));
    assert_eq!(reply.from.as_ref().map(|a| a.id.as_str()), Some("bot"));
    assert_eq!(reply.recipient.as_ref().map(|a| a.id.as_str()), Some("user"));
    assert_eq!(reply.reply_to_id.as_deref(), Some("7"));
    assert_eq!(reply.channel_id, "console");
    assert_eq!(
        reply.conversation.as_ref().map(|c| c.id.as_str()),
        Some("convo1")
    );
}

#[tokio::test]
async fn reference_describes_the_incoming_turn() {
    let adapter = CapturingAdapter::default();
    let context = TurnContext::new(&adapter, incoming());

    let reference = context.reference();
    assert_eq!(reference.activity_id.as_deref(), Some("7"));
    assert_eq!(reference.user.id, "user");
    assert_eq!(reference.bot.id, "bot");
    assert_eq!(reference.channel_id, "console");
}

#[tokio::test]
async fn delete_passes_the_target_id_to_the_adapter() {
    let adapter = CapturingAdapter::default();
    let context = TurnContext::new(&adapter, incoming());
    assert!(context.delete_activity("41").await.is_ok());
    assert!(!context.responded());
}
