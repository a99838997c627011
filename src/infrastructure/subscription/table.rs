use crate::infrastructure::graphql::GraphqlResponse;
use crate::infrastructure::subscription::protocol::SubscribePayload;
use crate::infrastructure::subscription::{StreamEvent, StreamKey};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

struct StreamState {
    op_id: String,
    request: SubscribePayload,
    listeners: Vec<(u64, UnboundedSender<StreamEvent>)>,
}

/// Reference-counted bookkeeping for the multiplexed streams: which server
/// operation backs which key, and who is listening. Pure state, no IO; the
/// connection task turns the returned operation ids into wire frames.
pub(crate) struct StreamTable {
    streams: HashMap<StreamKey, StreamState>,
    ops: HashMap<String, StreamKey>,
}

impl StreamTable {
    pub fn new() -> Self {
        StreamTable {
            streams: HashMap::new(),
            ops: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Register a listener. Returns the new operation id when this key was
    /// not subscribed yet, meaning a `subscribe` frame must go out;
    /// otherwise the listener piggybacks on the existing server stream.
    pub fn attach(
        &mut self,
        key: StreamKey,
        request: SubscribePayload,
        listener_id: u64,
        sender: UnboundedSender<StreamEvent>,
    ) -> Option<String> {
        if let Some(state) = self.streams.get_mut(&key) {
            state.listeners.push((listener_id, sender));
            debug!(
                "Listener {} joined stream {:?} ({} total)",
                listener_id,
                key,
                state.listeners.len()
            );
            return None;
        }

        let op_id = Uuid::new_v4().to_string();
        self.ops.insert(op_id.clone(), key.clone());
        self.streams.insert(
            key,
            StreamState {
                op_id: op_id.clone(),
                request,
                listeners: vec![(listener_id, sender)],
            },
        );
        Some(op_id)
    }

    /// Unregister a listener. Returns the operation id when the stream has
    /// no listeners left, meaning a `complete` frame must go out.
    pub fn detach(&mut self, key: &StreamKey, listener_id: u64) -> Option<String> {
        let state = self.streams.get_mut(key)?;
        state.listeners.retain(|(id, _)| *id != listener_id);
        if !state.listeners.is_empty() {
            return None;
        }
        let state = self.streams.remove(key)?;
        self.ops.remove(&state.op_id);
        debug!("Last listener left stream {:?}", key);
        Some(state.op_id)
    }

    /// Fan a `next` payload out to every listener of the operation. A
    /// payload carrying errors is delivered as an error event. Returns the
    /// operation id when every listener turned out to be gone and the
    /// server stream should be completed.
    pub fn route_next(&mut self, op_id: &str, payload: GraphqlResponse) -> Option<String> {
        let key = self.ops.get(op_id)?.clone();
        let event = match payload.errors.as_ref().and_then(|e| e.first()) {
            Some(first) => StreamEvent::Error(first.message.clone()),
            None => StreamEvent::Next(payload.data.unwrap_or(Value::Null)),
        };

        let state = self.streams.get_mut(&key)?;
        state
            .listeners
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        if !state.listeners.is_empty() {
            return None;
        }
        self.streams.remove(&key);
        self.ops.remove(op_id);
        Some(op_id.to_string())
    }

    /// Server terminated the operation with an error.
    pub fn route_error(&mut self, op_id: &str, message: String) {
        let Some(key) = self.ops.remove(op_id) else {
            return;
        };
        if let Some(state) = self.streams.remove(&key) {
            for (_, sender) in state.listeners {
                let _ = sender.send(StreamEvent::Error(message.clone()));
            }
        }
    }

    /// Server completed the operation normally.
    pub fn route_complete(&mut self, op_id: &str) {
        let Some(key) = self.ops.remove(op_id) else {
            return;
        };
        if let Some(state) = self.streams.remove(&key) {
            for (_, sender) in state.listeners {
                let _ = sender.send(StreamEvent::Complete);
            }
        }
    }

    /// Terminal failure of the whole channel: every listener hears about it
    /// once and the table empties.
    pub fn fail_all(&mut self, message: &str) {
        for (_, state) in self.streams.drain() {
            for (_, sender) in state.listeners {
                let _ = sender.send(StreamEvent::Error(message.to_string()));
            }
        }
        self.ops.clear();
    }

    /// Active `(operation id, request)` pairs, re-sent after a reconnect.
    pub fn requests(&self) -> Vec<(String, SubscribePayload)> {
        self.streams
            .values()
            .map(|state| (state.op_id.clone(), state.request.clone()))
            .collect()
    }
}
