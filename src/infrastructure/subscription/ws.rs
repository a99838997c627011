use crate::config::CONFIG;
use crate::constants::GRAPHQL_WS_PROTOCOL;
use crate::core::errors::PaytoolError;
use crate::core::session::SessionContext;
use crate::infrastructure::graphql::GraphqlRequest;
use crate::infrastructure::subscription::protocol::{
    ClientMessage, ConnectionParams, ServerMessage, SubscribePayload,
};
use crate::infrastructure::subscription::table::StreamTable;
use crate::infrastructure::subscription::{Command, StreamEvent, StreamKey, Subscription};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::http::Uri;
use tokio_tungstenite::tungstenite::{ClientRequestBuilder, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Clone, Debug)]
pub struct ChannelOptions {
    pub url: String,
    pub auth_token: Option<String>,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub ack_timeout: Duration,
    pub enabled: bool,
}

impl ChannelOptions {
    pub fn from_config() -> Self {
        ChannelOptions {
            url: CONFIG.graphql_ws_url.clone(),
            auth_token: None,
            max_retries: CONFIG.ws_max_retries,
            retry_delay: CONFIG.ws_retry_delay,
            ack_timeout: CONFIG.ws_ack_timeout,
            enabled: CONFIG.subscriptions_enabled,
        }
    }

    pub fn with_session(mut self, session: &SessionContext) -> Self {
        self.auth_token = session.auth_token.clone();
        self
    }
}

/// Process-wide subscription client. One background task owns the single
/// WebSocket connection; all subscriptions multiplex over it. The socket is
/// dialed lazily on the first subscribe and closed again when the last
/// listener goes away.
#[derive(Clone)]
pub struct SubscriptionChannel {
    commands: UnboundedSender<Command>,
    next_listener: Arc<AtomicU64>,
    enabled: bool,
}

impl SubscriptionChannel {
    /// Spawns the connection task. In a disabled (headless) context no task
    /// is spawned and every subscribe is an inert no-op.
    pub fn connect(options: ChannelOptions) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let enabled = options.enabled;
        if enabled {
            tokio::spawn(run(options, receiver));
        } else {
            info!("Subscriptions disabled in this context");
        }
        SubscriptionChannel {
            commands,
            next_listener: Arc::new(AtomicU64::new(1)),
            enabled,
        }
    }

    /// Register a listener for one named stream. Listeners on the same key
    /// share a single server-side operation.
    pub fn subscribe(&self, key: StreamKey, request: &GraphqlRequest) -> Subscription {
        let (sender, events) = mpsc::unbounded_channel();
        let listener_id = self.next_listener.fetch_add(1, Ordering::SeqCst);

        if !self.enabled {
            debug!("Inert subscription for {:?}", key);
            let _ = sender.send(StreamEvent::Complete);
            return Subscription::new(key, listener_id, events, None);
        }

        let _ = self.commands.send(Command::Subscribe {
            key: key.clone(),
            request: SubscribePayload::from(request),
            listener_id,
            sender,
        });
        Subscription::new(key, listener_id, events, Some(self.commands.clone()))
    }

    /// Orderly teardown at application shutdown. Dropping every channel
    /// clone and subscription has the same effect.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

enum Pump {
    /// Every stream ended; close the socket and wait for new subscribers.
    Idle,
    /// The socket failed underneath us.
    Reconnect,
    Shutdown,
}

async fn run(options: ChannelOptions, mut commands: UnboundedReceiver<Command>) {
    let mut table = StreamTable::new();
    let mut attempts: u32 = 0;

    loop {
        // Lazy: no socket while nobody listens.
        while table.is_empty() {
            match commands.recv().await {
                Some(Command::Subscribe {
                    key,
                    request,
                    listener_id,
                    sender,
                }) => {
                    table.attach(key, request, listener_id, sender);
                }
                Some(Command::Unsubscribe { key, listener_id }) => {
                    table.detach(&key, listener_id);
                }
                Some(Command::Shutdown) | None => return,
            }
        }

        // Listeners may have come or gone while the socket was down.
        loop {
            match commands.try_recv() {
                Ok(Command::Subscribe {
                    key,
                    request,
                    listener_id,
                    sender,
                }) => {
                    table.attach(key, request, listener_id, sender);
                }
                Ok(Command::Unsubscribe { key, listener_id }) => {
                    table.detach(&key, listener_id);
                }
                Ok(Command::Shutdown) => return,
                Err(_) => break,
            }
        }
        if table.is_empty() {
            continue;
        }

        let mut socket = match establish(&options).await {
            Ok(socket) => {
                attempts = 0;
                socket
            }
            Err(e) => {
                attempts += 1;
                warn!(
                    "Subscription connect attempt {}/{} failed: {}",
                    attempts, options.max_retries, e
                );
                if attempts > options.max_retries {
                    error!("Subscription retry budget exhausted");
                    table.fail_all(&PaytoolError::ChannelExhausted(options.max_retries).to_string());
                    drain_exhausted(&mut commands, options.max_retries).await;
                    return;
                }
                tokio::time::sleep(options.retry_delay).await;
                continue;
            }
        };

        // Re-issue every active operation after (re)connecting.
        let mut resubscribe_failed = false;
        for (op_id, request) in table.requests() {
            let frame = ClientMessage::Subscribe {
                id: op_id,
                payload: request,
            };
            if send_frame(&mut socket, &frame).await.is_err() {
                resubscribe_failed = true;
                break;
            }
        }
        if resubscribe_failed {
            tokio::time::sleep(options.retry_delay).await;
            continue;
        }

        match pump(&mut socket, &mut table, &mut commands).await {
            Pump::Shutdown => {
                let _ = socket.close(None).await;
                return;
            }
            Pump::Idle => {
                debug!("No listeners left, closing subscription socket");
                let _ = socket.close(None).await;
            }
            Pump::Reconnect => {
                warn!("Subscription socket lost, reconnecting");
                tokio::time::sleep(options.retry_delay).await;
            }
        }
    }
}

/// After the retry budget is spent the channel stays down; late subscribers
/// get the terminal error immediately. Only constructing a new channel
/// starts over.
async fn drain_exhausted(commands: &mut UnboundedReceiver<Command>, retries: u32) {
    let message = PaytoolError::ChannelExhausted(retries).to_string();
    while let Some(command) = commands.recv().await {
        match command {
            Command::Subscribe { sender, .. } => {
                let _ = sender.send(StreamEvent::Error(message.clone()));
            }
            Command::Unsubscribe { .. } => {}
            Command::Shutdown => return,
        }
    }
}

async fn establish(options: &ChannelOptions) -> Result<WsStream, PaytoolError> {
    let uri: Uri = options
        .url
        .parse()
        .map_err(|_| PaytoolError::Transport(format!("invalid ws url: {}", options.url)))?;
    let request = ClientRequestBuilder::new(uri).with_sub_protocol(GRAPHQL_WS_PROTOCOL);

    let (mut socket, _) = connect_async(request)
        .await
        .map_err(|e| PaytoolError::Transport(e.to_string()))?;

    let init = ClientMessage::ConnectionInit {
        payload: Some(ConnectionParams {
            auth_token: options.auth_token.clone(),
        }),
    };
    send_frame(&mut socket, &init).await?;

    match tokio::time::timeout(options.ack_timeout, wait_for_ack(&mut socket)).await {
        Err(_) => Err(PaytoolError::AckTimeout),
        Ok(Err(e)) => Err(e),
        Ok(Ok(())) => {
            info!("Subscription connection acknowledged");
            Ok(socket)
        }
    }
}

async fn wait_for_ack(socket: &mut WsStream) -> Result<(), PaytoolError> {
    while let Some(message) = socket.next().await {
        let message = message.map_err(|e| PaytoolError::Transport(e.to_string()))?;
        if let Message::Text(text) = message {
            match serde_json::from_str::<ServerMessage>(text.as_str()) {
                Ok(ServerMessage::ConnectionAck) => return Ok(()),
                Ok(ServerMessage::Ping) => send_frame(socket, &ClientMessage::Pong).await?,
                Ok(_) | Err(_) => {}
            }
        }
    }
    Err(PaytoolError::Transport(
        "connection closed before ack".to_string(),
    ))
}

async fn pump(
    socket: &mut WsStream,
    table: &mut StreamTable,
    commands: &mut UnboundedReceiver<Command>,
) -> Pump {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Subscribe { key, request, listener_id, sender }) => {
                    let payload = request.clone();
                    if let Some(op_id) = table.attach(key, request, listener_id, sender) {
                        let frame = ClientMessage::Subscribe { id: op_id, payload };
                        if send_frame(socket, &frame).await.is_err() {
                            return Pump::Reconnect;
                        }
                    }
                }
                Some(Command::Unsubscribe { key, listener_id }) => {
                    if let Some(op_id) = table.detach(&key, listener_id) {
                        let _ = send_frame(socket, &ClientMessage::Complete { id: op_id }).await;
                    }
                    if table.is_empty() {
                        return Pump::Idle;
                    }
                }
                Some(Command::Shutdown) | None => return Pump::Shutdown,
            },
            message = socket.next() => match message {
                None => return Pump::Reconnect,
                Some(Err(e)) => {
                    warn!("Subscription socket error: {}", e);
                    return Pump::Reconnect;
                }
                Some(Ok(Message::Close(_))) => return Pump::Reconnect,
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(frame) => {
                            if let Some(outcome) = handle_frame(socket, table, frame).await {
                                return outcome;
                            }
                        }
                        Err(e) => warn!("Unparseable subscription frame: {}", e),
                    }
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn handle_frame(
    socket: &mut WsStream,
    table: &mut StreamTable,
    frame: ServerMessage,
) -> Option<Pump> {
    match frame {
        ServerMessage::ConnectionAck => {}
        ServerMessage::Ping => {
            if send_frame(socket, &ClientMessage::Pong).await.is_err() {
                return Some(Pump::Reconnect);
            }
        }
        ServerMessage::Next { id, payload } => {
            if let Some(orphaned) = table.route_next(&id, payload) {
                let _ = send_frame(socket, &ClientMessage::Complete { id: orphaned }).await;
            }
            if table.is_empty() {
                return Some(Pump::Idle);
            }
        }
        ServerMessage::Error { id, payload } => {
            let message = payload
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "subscription error".to_string());
            table.route_error(&id, message);
            if table.is_empty() {
                return Some(Pump::Idle);
            }
        }
        ServerMessage::Complete { id } => {
            table.route_complete(&id);
            if table.is_empty() {
                return Some(Pump::Idle);
            }
        }
        ServerMessage::Unsupported => debug!("Ignoring unsupported subscription frame"),
    }
    None
}

async fn send_frame(socket: &mut WsStream, frame: &ClientMessage) -> Result<(), PaytoolError> {
    let text = serde_json::to_string(frame).map_err(|e| PaytoolError::Serde(e.to_string()))?;
    socket
        .send(Message::text(text))
        .await
        .map_err(|e| PaytoolError::Transport(e.to_string()))
}
