//! Relay loop — drains the inbound bus into the [`RelayHandler`].
//!
//! Every user gets a queue and a worker task. A user's events are handled one
//! at a time, in arrival order, so a follow-up message always sees the
//! session id the previous reply stored. Different users run concurrently, so
//! a slow remote call for one user never holds up anyone else.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use kinrelay_core::bus::{InboundMessage, MessageBus};

use crate::handler::RelayHandler;
use crate::reply::BusReplier;

type UserQueue = mpsc::UnboundedSender<InboundMessage>;

pub struct RelayLoop {
    bus: Arc<MessageBus>,
    handler: Arc<RelayHandler>,
}

impl RelayLoop {
    pub fn new(bus: Arc<MessageBus>, handler: Arc<RelayHandler>) -> Self {
        Self { bus, handler }
    }

    pub fn handler(&self) -> &Arc<RelayHandler> {
        &self.handler
    }

    /// Poll inbound messages until the inbound channel closes.
    pub async fn run(&self) {
        info!("relay loop started, waiting for messages");
        let mut queues: HashMap<String, UserQueue> = HashMap::new();

        while let Some(msg) = self.bus.consume_inbound().await {
            let user_id = msg.user_id().to_string();
            debug!(channel = %msg.channel, user_id = %user_id, "received message");

            // A closed queue means its worker died; start a new one.
            let msg = match queues.get(&user_id) {
                Some(queue) => match queue.send(msg) {
                    Ok(()) => continue,
                    Err(mpsc::error::SendError(msg)) => msg,
                },
                None => msg,
            };

            let queue = self.spawn_worker(&user_id);
            if queue.send(msg).is_err() {
                warn!(user_id = %user_id, "user worker exited before its first message");
            }
            queues.insert(user_id, queue);
        }
        info!("inbound channel closed, relay loop exiting");
    }

    /// Start the task that handles one user's events in order.
    fn spawn_worker(&self, user_id: &str) -> UserQueue {
        let (tx, mut rx) = mpsc::unbounded_channel::<InboundMessage>();
        let handler = self.handler.clone();
        let bus = self.bus.clone();
        debug!(user_id = %user_id, "starting user worker");

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let replier = BusReplier::new(bus.clone(), &msg);
                handler.handle_event(&msg, &replier).await;
            }
        });
        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use kinrelay_client::{create_client, RelayApi};
    use kinrelay_core::bus::OutboundMessage;
    use kinrelay_core::config::Config;
    use kinrelay_core::session::SessionStore;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::handler::ClientFactory;

    fn http_factory() -> ClientFactory {
        Arc::new(|config: &Config| -> anyhow::Result<Arc<dyn RelayApi>> {
            Ok(Arc::new(create_client(config)?))
        })
    }

    async fn mount_reply(server: &MockServer, message: &str, reply: serde_json::Value, delay_ms: u64) {
        Mock::given(method("POST"))
            .and(path("/v1"))
            .and(body_partial_json(json!({ "message": message })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply)
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(server)
            .await;
    }

    struct Running {
        bus: Arc<MessageBus>,
        sessions: Arc<SessionStore>,
        task: tokio::task::JoinHandle<()>,
        _dir: tempfile::TempDir,
    }

    fn start_loop(server: &MockServer) -> Running {
        let mut config = Config::default();
        config.api_key = "key".into();
        config.ai_id = "ai".into();
        config.api_endpoint = format!("{}/v1", server.uri());

        let dir = tempfile::tempdir().unwrap();
        let sessions = Arc::new(SessionStore::new(config.session_timeout));
        let handler = Arc::new(RelayHandler::new(
            config,
            Some(dir.path().join("config.json")),
            sessions.clone(),
            http_factory(),
        ));

        let bus = Arc::new(MessageBus::new(16));
        let relay = RelayLoop::new(bus.clone(), handler);
        let task = tokio::spawn(async move { relay.run().await });

        Running {
            bus,
            sessions,
            task,
            _dir: dir,
        }
    }

    async fn next_reply(bus: &MessageBus) -> OutboundMessage {
        tokio::time::timeout(Duration::from_secs(5), bus.consume_outbound())
            .await
            .expect("reply within timeout")
            .expect("outbound message")
    }

    #[tokio::test]
    async fn test_loop_relays_and_replies_to_origin() {
        let server = MockServer::start().await;
        mount_reply(&server, "ping", json!({"response": "pong", "session_id": "s-1"}), 0).await;
        let running = start_loop(&server);

        running
            .bus
            .publish_inbound(InboundMessage::new("qq", "10001", "group_9", "ping"))
            .await
            .unwrap();

        let out = next_reply(&running.bus).await;
        assert_eq!(out.channel, "qq");
        assert_eq!(out.chat_id, "group_9");
        assert_eq!(out.content, "pong");
        assert_eq!(running.sessions.get_or_create("10001").session_id, "s-1");

        running.task.abort();
    }

    #[tokio::test]
    async fn test_same_user_handled_in_order_with_session() {
        let server = MockServer::start().await;
        mount_reply(&server, "one", json!({"response": "reply-one", "session_id": "s-1"}), 300).await;
        mount_reply(&server, "two", json!({"response": "reply-two"}), 0).await;
        let running = start_loop(&server);

        for text in ["one", "two"] {
            running
                .bus
                .publish_inbound(InboundMessage::new("qq", "u1", "u1", text))
                .await
                .unwrap();
        }

        assert_eq!(next_reply(&running.bus).await.content, "reply-one");
        assert_eq!(next_reply(&running.bus).await.content, "reply-two");

        let requests = server.received_requests().await.unwrap();
        let second: serde_json::Value = requests
            .iter()
            .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
            .find(|b| b["message"] == "two")
            .expect("second message was sent");
        assert_eq!(second["session_id"], "s-1");

        running.task.abort();
    }

    #[tokio::test]
    async fn test_slow_user_does_not_block_others() {
        let server = MockServer::start().await;
        mount_reply(&server, "slow", json!({"response": "slow-reply"}), 500).await;
        mount_reply(&server, "fast", json!({"response": "fast-reply"}), 0).await;
        let running = start_loop(&server);

        running
            .bus
            .publish_inbound(InboundMessage::new("qq", "alice", "alice", "slow"))
            .await
            .unwrap();
        running
            .bus
            .publish_inbound(InboundMessage::new("qq", "bob", "bob", "fast"))
            .await
            .unwrap();

        let first = next_reply(&running.bus).await;
        assert_eq!(first.chat_id, "bob");
        assert_eq!(first.content, "fast-reply");
        assert_eq!(next_reply(&running.bus).await.content, "slow-reply");

        running.task.abort();
    }
}
