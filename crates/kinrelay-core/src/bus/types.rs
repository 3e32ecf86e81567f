//! Bus event types — messages flowing between channels and the relay loop.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// An inbound event from the hosting platform.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Channel name (e.g. "console", "qq").
    pub channel: String,
    /// Sender identity within the channel; this is the session key.
    pub sender_id: String,
    /// Conversation the reply should be delivered to.
    pub chat_id: String,
    /// Raw text, including any leading `/command`.
    pub content: String,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
    /// Channel-specific metadata (e.g. message_id, nickname).
    pub metadata: HashMap<String, String>,
}

impl InboundMessage {
    pub fn new(
        channel: impl Into<String>,
        sender_id: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        InboundMessage {
            channel: channel.into(),
            sender_id: sender_id.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Identity used to key the user's session.
    pub fn user_id(&self) -> &str {
        &self.sender_id
    }

    /// Build the reply to this message.
    pub fn reply(&self, content: impl Into<String>) -> OutboundMessage {
        let mut out = OutboundMessage::new(&self.channel, &self.chat_id, content);
        out.reply_to = self.metadata.get("message_id").cloned();
        out
    }
}

/// A reply headed back to a channel.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    pub channel: String,
    pub chat_id: String,
    pub content: String,
    /// Platform message id being answered, when the channel supports threading.
    pub reply_to: Option<String>,
}

impl OutboundMessage {
    pub fn new(
        channel: impl Into<String>,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        OutboundMessage {
            channel: channel.into(),
            chat_id: chat_id.into(),
            content: content.into(),
            reply_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_creation() {
        let msg = InboundMessage::new("qq", "10001", "group_7", "hello");
        assert_eq!(msg.channel, "qq");
        assert_eq!(msg.user_id(), "10001");
        assert_eq!(msg.chat_id, "group_7");
        assert_eq!(msg.content, "hello");
        assert!(msg.metadata.is_empty());
    }

    #[test]
    fn test_reply_targets_origin() {
        let msg = InboundMessage::new("console", "me", "tty", "hi");
        let out = msg.reply("hey");
        assert_eq!(out.channel, "console");
        assert_eq!(out.chat_id, "tty");
        assert_eq!(out.content, "hey");
        assert!(out.reply_to.is_none());
    }

    #[test]
    fn test_reply_threads_message_id() {
        let mut msg = InboundMessage::new("qq", "10001", "10001", "hi");
        msg.metadata.insert("message_id".into(), "m-55".into());
        assert_eq!(msg.reply("ok").reply_to.as_deref(), Some("m-55"));
    }
}
