//! WebSocket log subscription decoded into proposal events.

use crate::rpc::decode_hex_payload;
use crate::ChainError;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tally_abi as abi;
use tally_types::{Address, ProposalEvent};
use tokio::sync::broadcast;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Capacity of the event broadcast channel.
const CHANNEL_CAPACITY: usize = 256;

/// One `eth_subscribe("logs")` session over the voting contract, fanned out
/// as decoded [`ProposalEvent`]s on a broadcast channel.
///
/// Malformed or unrelated logs are logged and skipped; the delivery loop
/// never stops on a bad log. The session itself does not reconnect; when
/// [`run`](Self::run) returns the caller decides whether to start a new
/// session.
pub struct EventListener {
    ws_url: String,
    contract: Address,
    tx: broadcast::Sender<ProposalEvent>,
}

impl EventListener {
    pub fn new(ws_url: impl Into<String>, contract: Address) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            ws_url: ws_url.into(),
            contract,
            tx,
        }
    }

    /// Get a receiver for decoded contract events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProposalEvent> {
        self.tx.subscribe()
    }

    /// Connect, subscribe to the contract's logs, and pump events until the
    /// transport closes or fails.
    pub async fn run(&self) -> Result<(), ChainError> {
        let (mut ws, _) = connect_async(self.ws_url.as_str())
            .await
            .map_err(|e| ChainError::Unreachable(format!("websocket connect: {e}")))?;

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_subscribe",
            "params": ["logs", { "address": self.contract.to_string() }],
        });
        ws.send(Message::Text(request.to_string()))
            .await
            .map_err(|e| ChainError::RequestFailed(format!("subscribe request: {e}")))?;

        info!(contract = %self.contract, "log subscription opened");

        while let Some(message) = ws.next().await {
            match message {
                Ok(Message::Text(text)) => self.handle_text(&text),
                Ok(Message::Ping(payload)) => {
                    let _ = ws.send(Message::Pong(payload)).await;
                }
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "subscription closed by server");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(ChainError::Unreachable(format!("websocket receive: {e}")));
                }
            }
        }
        Ok(())
    }

    /// Process one text frame from the subscription.
    ///
    /// Everything here swallows its own failures: an undecodable frame is
    /// warned about and dropped so the loop keeps delivering later events.
    fn handle_text(&self, text: &str) {
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                warn!("undecodable subscription frame: {e}");
                return;
            }
        };

        if value.get("method").and_then(Value::as_str) != Some("eth_subscription") {
            // The acknowledgement of our eth_subscribe request.
            if let Some(id) = value.get("result").and_then(Value::as_str) {
                debug!(subscription = id, "subscription acknowledged");
            }
            return;
        }

        let Some(log) = value.pointer("/params/result") else {
            warn!("subscription notification without a log payload");
            return;
        };
        if log.get("removed").and_then(Value::as_bool) == Some(true) {
            warn!("ignoring removed (reorged) log");
            return;
        }

        match parse_log(log) {
            Ok((topics, data)) => match abi::decode_log(&topics, &data) {
                Ok(Some(event)) => {
                    debug!(id = %event.proposal_id(), "contract event received");
                    // send fails only while no receiver is attached yet.
                    let _ = self.tx.send(event);
                }
                Ok(None) => debug!("skipping unrelated log"),
                Err(e) => warn!("undecodable contract log: {e}"),
            },
            Err(e) => warn!("malformed log in notification: {e}"),
        }
    }
}

/// Extract `(topics, data)` from a JSON log object.
fn parse_log(log: &Value) -> Result<(Vec<[u8; 32]>, Vec<u8>), ChainError> {
    let raw_topics = log
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| ChainError::InvalidResponse("log without topics".into()))?;

    let mut topics = Vec::with_capacity(raw_topics.len());
    for raw in raw_topics {
        let s = raw
            .as_str()
            .ok_or_else(|| ChainError::InvalidResponse("non-string topic".into()))?;
        let bytes = decode_hex_payload(s)?;
        let topic: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChainError::InvalidResponse(format!("topic is not 32 bytes: {s}")))?;
        topics.push(topic);
    }

    let data = match log.get("data").and_then(Value::as_str) {
        Some(s) => decode_hex_payload(s)?,
        None => Vec::new(),
    };
    Ok((topics, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_abi::selector::{event_topic, EVT_PROPOSAL_EXECUTED};
    use tally_types::ProposalId;

    fn listener() -> EventListener {
        EventListener::new(
            "ws://127.0.0.1:8545",
            Address::from_hex("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap(),
        )
    }

    fn executed_notification(id: u64) -> String {
        let topic0 = format!("0x{}", hex::encode(event_topic(EVT_PROPOSAL_EXECUTED)));
        let topic1 = format!("0x{:064x}", id);
        json!({
            "jsonrpc": "2.0",
            "method": "eth_subscription",
            "params": {
                "subscription": "0xabc",
                "result": { "topics": [topic0, topic1], "data": "0x" },
            },
        })
        .to_string()
    }

    #[test]
    fn notification_reaches_subscribers() {
        let listener = listener();
        let mut rx = listener.subscribe();
        listener.handle_text(&executed_notification(4));
        assert_eq!(
            rx.try_recv().unwrap(),
            ProposalEvent::Executed {
                id: ProposalId::new(4)
            }
        );
    }

    #[test]
    fn ack_frame_is_not_an_event() {
        let listener = listener();
        let mut rx = listener.subscribe();
        listener.handle_text(r#"{"jsonrpc":"2.0","id":1,"result":"0xdeadbeef"}"#);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn removed_log_is_skipped() {
        let listener = listener();
        let mut rx = listener.subscribe();
        let mut value: Value = serde_json::from_str(&executed_notification(4)).unwrap();
        value["params"]["result"]["removed"] = Value::Bool(true);
        listener.handle_text(&value.to_string());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn garbage_frame_does_not_panic() {
        let listener = listener();
        listener.handle_text("not json at all");
        listener.handle_text(r#"{"method":"eth_subscription","params":{}}"#);
    }

    #[test]
    fn parse_log_rejects_short_topic() {
        let log = json!({ "topics": ["0x1234"], "data": "0x" });
        assert!(parse_log(&log).is_err());
    }
}
