//! Activity schema: the records exchanged between the console and the bot.
//!
//! An [`Activity`] is one unit of conversational exchange. Incoming
//! activities are built by the adapter from console lines; outgoing ones
//! are built by bot logic and printed by the adapter.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Activity type
// ---------------------------------------------------------------------------

/// Kind of activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// Plain message with text and optional attachments.
    Message,
    /// Pseudo-activity that pauses output for a duration.
    Delay,
    /// Typing indicator.
    Typing,
    /// Conversation ended.
    EndOfConversation,
    /// Generic named event.
    Event,
    /// Any other channel-specific type, kept verbatim.
    Other(String),
}

impl ActivityType {
    /// Wire name of the activity type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Delay => "delay",
            Self::Typing => "typing",
            Self::EndOfConversation => "endOfConversation",
            Self::Event => "event",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "message" => Self::Message,
            "delay" => Self::Delay,
            "typing" => Self::Typing,
            "endOfConversation" => Self::EndOfConversation,
            "event" => Self::Event,
            _ => Self::Other(value),
        }
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Accounts and references
// ---------------------------------------------------------------------------

/// A participant on a channel (user or bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    /// Channel-scoped identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl ChannelAccount {
    /// Build an account from an id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    /// Conversation identifier.
    pub id: String,
    /// Optional display name.
    #[serde(default)]
    pub name: String,
    /// Whether more than two participants take part.
    #[serde(default)]
    pub is_group: bool,
}

/// Identity tuple describing where activities are routed.
///
/// Built once when the adapter is constructed and never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationReference {
    /// Id of the activity being replied to, if any.
    #[serde(default)]
    pub activity_id: Option<String>,
    /// The human side of the conversation.
    pub user: ChannelAccount,
    /// The bot side of the conversation.
    pub bot: ChannelAccount,
    /// Conversation account.
    pub conversation: ConversationAccount,
    /// Channel identifier.
    pub channel_id: String,
    /// Service endpoint for the channel. Empty for the console.
    #[serde(default)]
    pub service_url: String,
}

impl Default for ConversationReference {
    fn default() -> Self {
        Self {
            activity_id: None,
            user: ChannelAccount::new("user", "User1"),
            bot: ChannelAccount::new("bot", "Bot"),
            conversation: ConversationAccount {
                id: "convo1".to_owned(),
                name: String::new(),
                is_group: false,
            },
            channel_id: "console".to_owned(),
            service_url: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// A file or card attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type of the content.
    pub content_type: String,
    /// Where the content can be fetched, if remote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    /// Optional file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single unit of conversational exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity kind.
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// Channel-scoped identifier. Outgoing activities may leave this empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// When the activity was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Channel identifier.
    #[serde(default)]
    pub channel_id: String,
    /// Sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    /// Receiver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    /// Conversation the activity belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    /// Service endpoint for replies.
    #[serde(default)]
    pub service_url: String,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Attachments carried by a message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Free-form payload. Delay activities carry milliseconds here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Id of the activity this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    fn empty(kind: ActivityType) -> Self {
        Self {
            kind,
            id: None,
            timestamp: None,
            channel_id: String::new(),
            from: None,
            recipient: None,
            conversation: None,
            service_url: String::new(),
            text: None,
            attachments: Vec::new(),
            value: None,
            reply_to_id: None,
        }
    }

    /// Outgoing text message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty(ActivityType::Message)
        }
    }

    /// Outgoing pause of `duration` before the next activity in a batch.
    pub fn delay(duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self {
            value: Some(serde_json::Value::from(millis)),
            ..Self::empty(ActivityType::Delay)
        }
    }

    /// Outgoing activity of an arbitrary type with no payload.
    pub fn of_type(kind: ActivityType) -> Self {
        Self::empty(kind)
    }

    /// Attach files or cards to this activity.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Incoming console message with the given id and creation time.
    ///
    /// Routing fields are filled in afterwards by
    /// [`Activity::apply_conversation_reference`].
    pub fn incoming(text: impl Into<String>, id: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Some(id.to_string()),
            timestamp: Some(timestamp),
            ..Self::message(text)
        }
    }

    /// Duration carried by a delay activity.
    ///
    /// Returns `None` for non-delay activities. A delay whose value is
    /// missing or not a non-negative integer is treated as zero.
    pub fn delay_duration(&self) -> Option<Duration> {
        if self.kind != ActivityType::Delay {
            return None;
        }
        let millis = self
            .value
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        Some(Duration::from_millis(millis))
    }

    /// Stamp routing information from `reference` onto an incoming activity.
    ///
    /// The reference user becomes the sender and the reference bot the
    /// recipient.
    #[must_use]
    pub fn apply_conversation_reference(mut self, reference: &ConversationReference) -> Self {
        self.channel_id = reference.channel_id.clone();
        self.service_url = reference.service_url.clone();
        self.conversation = Some(reference.conversation.clone());
        self.from = Some(reference.user.clone());
        self.recipient = Some(reference.bot.clone());
        if let Some(activity_id) = &reference.activity_id {
            self.reply_to_id = Some(activity_id.clone());
        }
        self
    }
}

/// Acknowledgement returned for every outgoing activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResponse {
    /// Identifier assigned to the sent activity.
    pub id: String,
}

impl ResourceResponse {
    /// Fresh response with a random identifier.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for ResourceResponse {
    fn default() -> Self {
        Self::new()
    }
}
