//! Console channel — a local stand-in for a chat platform.
//!
//! Each line read from the input becomes an `InboundMessage` from one fixed
//! user; replies are written back as lines. The gateway uses stdin/stdout.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};

use kinrelay_core::bus::{InboundMessage, MessageBus, OutboundMessage};
use kinrelay_core::config::schema::ConsoleConfig;

use crate::base::Channel;

pub const CHANNEL_NAME: &str = "console";

type Reader = Box<dyn AsyncBufRead + Send + Unpin>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

pub struct ConsoleChannel {
    user_id: String,
    bus: Arc<MessageBus>,
    /// Taken by the first `start()`.
    input: Mutex<Option<Reader>>,
    output: Mutex<Writer>,
    shutdown: Notify,
}

impl ConsoleChannel {
    /// A console channel on the process's stdin/stdout.
    pub fn new(config: &ConsoleConfig, bus: Arc<MessageBus>) -> Self {
        Self::with_io(
            &config.user_id,
            bus,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
    }

    pub fn with_io(
        user_id: &str,
        bus: Arc<MessageBus>,
        input: impl AsyncBufRead + Send + Unpin + 'static,
        output: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            bus,
            input: Mutex::new(Some(Box::new(input))),
            output: Mutex::new(Box::new(output)),
            shutdown: Notify::new(),
        }
    }

    fn to_inbound(&self, line: &str) -> InboundMessage {
        InboundMessage::new(CHANNEL_NAME, &self.user_id, &self.user_id, line)
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> anyhow::Result<()> {
        let Some(input) = self.input.lock().await.take() else {
            warn!("console channel already started");
            return Ok(());
        };
        let mut lines = input.lines();
        info!(user_id = %self.user_id, "console channel listening");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("console input closed");
                        break;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.bus
                        .publish_inbound(self.to_inbound(line))
                        .await
                        .map_err(|e| anyhow::anyhow!("inbound bus closed: {e}"))?;
                }
                _ = self.shutdown.notified() => break,
            }
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        // Stored as a permit if `start` is busy publishing
        self.shutdown.notify_one();
        Ok(())
    }

    async fn send(&self, msg: &OutboundMessage) -> anyhow::Result<()> {
        let mut output = self.output.lock().await;
        output.write_all(msg.content.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_lines_become_inbound_messages() {
        let bus = Arc::new(MessageBus::new(8));
        let input: &'static [u8] = b"hello\n\n  /reset hi  \n";
        let ch = ConsoleChannel::with_io("alice", bus.clone(), input, tokio::io::sink());

        ch.start().await.unwrap();

        let first = bus.consume_inbound().await.unwrap();
        assert_eq!(first.channel, "console");
        assert_eq!(first.user_id(), "alice");
        assert_eq!(first.chat_id, "alice");
        assert_eq!(first.content, "hello");

        let second = bus.consume_inbound().await.unwrap();
        assert_eq!(second.content, "/reset hi");
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let bus = Arc::new(MessageBus::new(8));
        let input: &'static [u8] = b"";
        let ch = ConsoleChannel::with_io("alice", bus, input, tokio::io::sink());
        ch.start().await.unwrap();
        ch.start().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_while_not_waiting_still_stops() {
        let bus = Arc::new(MessageBus::new(8));
        // Input that never ends while `_keep_open` lives
        let (_keep_open, input) = tokio::io::duplex(64);
        let ch = ConsoleChannel::with_io("alice", bus, BufReader::new(input), tokio::io::sink());

        ch.stop().await.unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), ch.start()).await;
        assert!(result.is_ok(), "start should observe the earlier stop");
    }

    #[tokio::test]
    async fn test_send_writes_a_line() {
        let bus = Arc::new(MessageBus::new(8));
        let (writer, mut reader) = tokio::io::duplex(256);
        let input: &'static [u8] = b"";
        let ch = ConsoleChannel::with_io("alice", bus, input, writer);

        ch.send(&OutboundMessage::new("console", "alice", "hi there"))
            .await
            .unwrap();
        drop(ch);

        let mut written = String::new();
        reader.read_to_string(&mut written).await.unwrap();
        assert_eq!(written, "hi there\n");
    }
}
