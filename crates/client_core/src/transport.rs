//! Socket.IO websocket transport.
//!
//! The transport owns the socket, answers heartbeats, turns event packets into
//! [`ServerEvent`]s and reports connectivity as `Connected`/`Disconnected`
//! events in the same stream. After a lost connection it reconnects on its
//! own; resynchronizing state is left to the server's next presence snapshot.

use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, SinkExt, StreamExt};
use shared::{
    protocol::{ClientRequest, ServerEvent, EVENT_CONNECT, EVENT_DISCONNECT},
    wire::{EnginePacket, SocketPacket, DEFAULT_NAMESPACE, ENGINE_IO_VERSION, SOCKET_IO_PATH},
};
use tokio::{
    sync::mpsc,
    task::{AbortHandle, JoinHandle},
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::TransportError;

const EVENT_BUFFER: usize = 256;

/// Inbound side of a transport, drained by a single consumer.
#[async_trait]
pub trait EventSource: Send {
    /// Returns `None` once the transport has shut down for good.
    async fn next_event(&mut self) -> Option<ServerEvent>;
}

#[async_trait]
impl EventSource for mpsc::Receiver<ServerEvent> {
    async fn next_event(&mut self) -> Option<ServerEvent> {
        self.recv().await
    }
}

/// Outbound side of a transport. Requests queue while the socket is down.
pub trait RequestSink: Send + Sync {
    fn emit(&self, request: ClientRequest) -> Result<(), TransportError>;
}

impl RequestSink for mpsc::UnboundedSender<ClientRequest> {
    fn emit(&self, request: ClientRequest) -> Result<(), TransportError> {
        self.send(request).map_err(|_| TransportError::Closed)
    }
}

/// Builds `<server>/socket.io/?EIO=4&transport=websocket` from an http(s) or
/// ws(s) base url.
pub fn socket_io_url(server_url: &str) -> Result<Url, TransportError> {
    let invalid = |reason: &str| TransportError::InvalidUrl {
        url: server_url.to_string(),
        reason: reason.to_string(),
    };
    let mut url = Url::parse(server_url.trim()).map_err(|err| invalid(&err.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid("scheme must be http, https, ws or wss")),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid("cannot switch to websocket scheme"))?;

    let base = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base}/{SOCKET_IO_PATH}"));
    url.set_query(Some(&format!(
        "EIO={ENGINE_IO_VERSION}&transport=websocket"
    )));
    url.set_fragment(None);
    Ok(url)
}

pub struct SocketIoTransport {
    url: Url,
    reconnect_delay: Duration,
}

/// A running transport: the event stream, the request queue and the task
/// driving the socket.
pub struct TransportHandle {
    pub events: mpsc::Receiver<ServerEvent>,
    pub requests: mpsc::UnboundedSender<ClientRequest>,
    task: JoinHandle<()>,
}

impl TransportHandle {
    pub fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

enum ConnectionEnd {
    Lost,
    Shutdown,
}

impl SocketIoTransport {
    pub fn new(server_url: &str, reconnect_delay: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            url: socket_io_url(server_url)?,
            reconnect_delay,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn spawn(self) -> TransportHandle {
        let (events_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (requests, requests_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(events_tx, requests_rx));
        TransportHandle {
            events,
            requests,
            task,
        }
    }

    async fn run(
        self,
        events_tx: mpsc::Sender<ServerEvent>,
        mut requests_rx: mpsc::UnboundedReceiver<ClientRequest>,
    ) {
        loop {
            let mut connected = false;
            let end = self
                .pump(&events_tx, &mut requests_rx, &mut connected)
                .await;
            if connected && events_tx.send(ServerEvent::Disconnected).await.is_err() {
                return;
            }
            match end {
                Ok(ConnectionEnd::Shutdown) => {
                    info!("socket transport shut down");
                    return;
                }
                Ok(ConnectionEnd::Lost) => info!(url = %self.url, "socket connection closed"),
                Err(err) => warn!(url = %self.url, error = %err, "socket connection failed"),
            }
            if events_tx.is_closed() {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn pump(
        &self,
        events_tx: &mpsc::Sender<ServerEvent>,
        requests_rx: &mut mpsc::UnboundedReceiver<ClientRequest>,
        connected: &mut bool,
    ) -> Result<ConnectionEnd, TransportError> {
        let (socket, _) =
            connect_async(self.url.as_str())
                .await
                .map_err(|source| TransportError::Connect {
                    url: self.url.to_string(),
                    source,
                })?;
        debug!(url = %self.url, "websocket open");
        let (mut writer, mut reader) = socket.split();
        let mut heartbeat: Option<Duration> = None;

        loop {
            tokio::select! {
                frame = next_frame(&mut reader, heartbeat) => {
                    let Some(frame) = frame else {
                        warn!("no heartbeat from server; dropping connection");
                        return Ok(ConnectionEnd::Lost);
                    };
                    let Some(frame) = frame else {
                        return Ok(ConnectionEnd::Lost);
                    };
                    let text = match frame? {
                        Message::Text(text) => text,
                        Message::Close(_) => return Ok(ConnectionEnd::Lost),
                        _ => continue,
                    };
                    if let Some(end) =
                        on_frame(&text, &mut writer, events_tx, connected, &mut heartbeat).await?
                    {
                        return Ok(end);
                    }
                }
                request = requests_rx.recv(), if *connected => {
                    let Some(request) = request else {
                        return Ok(ConnectionEnd::Shutdown);
                    };
                    debug!(event = request.event_name(), "emitting request");
                    let frame = SocketPacket::event(request.event_name(), request.payload()).to_frame();
                    writer.send(Message::Text(frame)).await?;
                }
            }
        }
    }
}

/// Reads the next frame. The outer `None` means the heartbeat deadline
/// passed; the inner `None` means the stream ended.
async fn next_frame<R>(
    reader: &mut R,
    heartbeat: Option<Duration>,
) -> Option<Option<Result<Message, tungstenite::Error>>>
where
    R: futures::Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    match heartbeat {
        Some(deadline) => tokio::time::timeout(deadline, reader.next()).await.ok(),
        None => Some(reader.next().await),
    }
}

async fn on_frame<W>(
    text: &str,
    writer: &mut W,
    events_tx: &mpsc::Sender<ServerEvent>,
    connected: &mut bool,
    heartbeat: &mut Option<Duration>,
) -> Result<Option<ConnectionEnd>, TransportError>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let packet = match EnginePacket::decode(text) {
        Ok(packet) => packet,
        Err(err) => {
            warn!(error = %err, "dropping malformed engine frame");
            return Ok(None);
        }
    };

    match packet {
        EnginePacket::Open(handshake) => {
            debug!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "engine handshake");
            *heartbeat = Some(Duration::from_millis(
                handshake.ping_interval + handshake.ping_timeout,
            ));
            writer
                .send(Message::Text(SocketPacket::connect().to_frame()))
                .await?;
        }
        EnginePacket::Ping(data) => {
            writer
                .send(Message::Text(EnginePacket::Pong(data).encode()))
                .await?;
        }
        EnginePacket::Close => return Ok(Some(ConnectionEnd::Lost)),
        EnginePacket::Message(body) => {
            return on_socket_packet(&body, events_tx, connected).await;
        }
        EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
    }
    Ok(None)
}

async fn on_socket_packet(
    body: &str,
    events_tx: &mpsc::Sender<ServerEvent>,
    connected: &mut bool,
) -> Result<Option<ConnectionEnd>, TransportError> {
    let packet = match SocketPacket::decode(body) {
        Ok(packet) => packet,
        Err(err) => {
            warn!(error = %err, "dropping malformed socket packet");
            return Ok(None);
        }
    };
    if packet.namespace() != DEFAULT_NAMESPACE {
        debug!(namespace = packet.namespace(), "ignoring packet for other namespace");
        return Ok(None);
    }

    let event = match packet {
        SocketPacket::Connect { .. } => {
            *connected = true;
            ServerEvent::Connected
        }
        SocketPacket::Disconnect { .. } => return Ok(Some(ConnectionEnd::Lost)),
        SocketPacket::ConnectError { data, .. } => {
            let reason = data.map(|v| v.to_string()).unwrap_or_default();
            return Err(TransportError::ConnectRefused(reason));
        }
        SocketPacket::Ack { .. } => return Ok(None),
        SocketPacket::Event { name, payload, .. } => {
            if name == EVENT_CONNECT || name == EVENT_DISCONNECT {
                debug!(event = %name, "ignoring reserved event name from server");
                return Ok(None);
            }
            match ServerEvent::from_named(&name, payload) {
                Ok(Some(event)) => event,
                Ok(None) => {
                    debug!(event = %name, "ignoring unknown event");
                    return Ok(None);
                }
                Err(err) => {
                    warn!(error = %err, "dropping undecodable event");
                    return Ok(None);
                }
            }
        }
    };

    if events_tx.send(event).await.is_err() {
        return Ok(Some(ConnectionEnd::Shutdown));
    }
    Ok(None)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
