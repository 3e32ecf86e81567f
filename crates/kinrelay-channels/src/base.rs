//! The `Channel` trait — what a host-platform adapter has to provide.
//!
//! An adapter turns platform events into `InboundMessage`s on the bus and
//! delivers `OutboundMessage`s addressed to it.

use async_trait::async_trait;
use kinrelay_core::bus::OutboundMessage;

#[async_trait]
pub trait Channel: Send + Sync {
    /// Name used to route replies; matches `OutboundMessage.channel`.
    fn name(&self) -> &str;

    /// Listen for platform events until stopped or the source is exhausted.
    async fn start(&self) -> anyhow::Result<()>;

    async fn stop(&self) -> anyhow::Result<()>;

    /// Deliver a reply on this platform.
    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every delivered reply.
    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn start(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((msg.chat_id.clone(), msg.content.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_channel_as_trait_object() {
        let ch: Box<dyn Channel> = Box::new(RecordingChannel::default());
        assert_eq!(ch.name(), "recording");
        ch.start().await.unwrap();
        ch.send(&OutboundMessage::new("recording", "chat_1", "Hello!"))
            .await
            .unwrap();
        ch.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_send_records_chat_and_content() {
        let ch = RecordingChannel::default();
        ch.send(&OutboundMessage::new("recording", "group_2", "hi"))
            .await
            .unwrap();
        assert_eq!(
            *ch.sent.lock().unwrap(),
            vec![("group_2".to_string(), "hi".to_string())]
        );
    }
}
