use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub mod protocol;
pub mod table;
pub mod ws;

pub use ws::{ChannelOptions, SubscriptionChannel};

use protocol::SubscribePayload;

/// The named event streams the server publishes per group.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    GroupStatus,
    MemberStatus,
}

impl EventKind {
    /// Root field of the subscription's `data` payload.
    pub fn field(&self) -> &'static str {
        match self {
            EventKind::GroupStatus => "groupStatusChanged",
            EventKind::MemberStatus => "memberStatusChanged",
        }
    }
}

/// Streams are multiplexed over one socket and shared between listeners
/// with the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub event: EventKind,
    pub group_id: String,
}

impl StreamKey {
    pub fn new(event: EventKind, group_id: impl Into<String>) -> Self {
        StreamKey {
            event,
            group_id: group_id.into(),
        }
    }
}

/// What a listener receives. `Next` carries the operation's `data` payload;
/// errors never propagate as panics or poisoned state.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    Next(Value),
    Error(String),
    Complete,
}

pub(crate) enum Command {
    Subscribe {
        key: StreamKey,
        request: SubscribePayload,
        listener_id: u64,
        sender: UnboundedSender<StreamEvent>,
    },
    Unsubscribe {
        key: StreamKey,
        listener_id: u64,
    },
    Shutdown,
}

/// Disposable listener handle. Dropping it (or calling `dispose`)
/// unregisters the listener; when the last listener for a key goes away
/// the underlying server stream is completed.
pub struct Subscription {
    key: StreamKey,
    listener_id: u64,
    events: UnboundedReceiver<StreamEvent>,
    commands: Option<UnboundedSender<Command>>,
    disposed: bool,
}

impl Subscription {
    pub(crate) fn new(
        key: StreamKey,
        listener_id: u64,
        events: UnboundedReceiver<StreamEvent>,
        commands: Option<UnboundedSender<Command>>,
    ) -> Self {
        Subscription {
            key,
            listener_id,
            events,
            commands,
            disposed: false,
        }
    }

    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    /// Next pushed event; `None` once the stream has ended.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(commands) = &self.commands {
            let _ = commands.send(Command::Unsubscribe {
                key: self.key.clone(),
                listener_id: self.listener_id,
            });
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
