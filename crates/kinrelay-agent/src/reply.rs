//! The platform's reply primitive.

use std::sync::Arc;

use async_trait::async_trait;

use kinrelay_core::bus::{InboundMessage, MessageBus, OutboundMessage};

/// Sends text back to whoever produced the event being handled.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, text: &str) -> anyhow::Result<()>;
}

/// Replies by publishing an [`OutboundMessage`] to the bus, addressed to the
/// channel and chat the inbound message came from.
pub struct BusReplier {
    bus: Arc<MessageBus>,
    template: OutboundMessage,
}

impl BusReplier {
    pub fn new(bus: Arc<MessageBus>, origin: &InboundMessage) -> Self {
        Self {
            bus,
            template: origin.reply(String::new()),
        }
    }
}

#[async_trait]
impl Replier for BusReplier {
    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        let mut msg = self.template.clone();
        msg.content = text.to_string();
        self.bus
            .publish_outbound(msg)
            .await
            .map_err(|e| anyhow::anyhow!("outbound bus closed: {e}"))
    }
}
