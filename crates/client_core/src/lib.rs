use std::{sync::Arc, time::Duration};

use shared::{
    domain::Participant,
    protocol::{ClientRequest, ServerEvent},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

pub mod classify;
pub mod compose;
pub mod config;
pub mod error;
pub mod presence;
pub mod roles;
pub mod router;
pub mod system_log;
pub mod transport;

pub use classify::{parse_sender_label, ChatLine, RenderDescriptor};
pub use compose::SubmitGuard;
pub use config::{load_settings, ClientSettings};
pub use error::{ClientError, ComposeError, TransportError};
pub use roles::{RoleAssigner, RoleStyle};
pub use router::{Connectivity, MemberPanel, SessionRouter, ViewUpdate};
pub use transport::{EventSource, RequestSink, SocketIoTransport, TransportHandle};

const CLIENT_EVENT_BUFFER: usize = 1024;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    View(ViewUpdate),
    /// Name submission rejected in a way the user should see.
    NameRejected(ComposeError),
}

/// One chat session: the reconciliation state behind a single-writer lock,
/// the outbound request sink, and a broadcast of view updates.
pub struct ChatClient {
    router: Mutex<SessionRouter>,
    submit_guard: Mutex<SubmitGuard>,
    requests: Arc<dyn RequestSink>,
    events: broadcast::Sender<ClientEvent>,
}

impl ChatClient {
    pub fn new(requests: Arc<dyn RequestSink>, send_cooldown: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(CLIENT_EVENT_BUFFER);
        Arc::new(Self {
            router: Mutex::new(SessionRouter::new()),
            submit_guard: Mutex::new(SubmitGuard::new(send_cooldown)),
            requests,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Drains `source` until it shuts down, applying each event in delivery
    /// order.
    pub async fn run<S: EventSource>(&self, mut source: S) {
        while let Some(event) = source.next_event().await {
            self.apply(event).await;
        }
        debug!("event source closed");
    }

    pub async fn apply(&self, event: ServerEvent) -> Vec<ViewUpdate> {
        let name = event.name();
        let updates = self.router.lock().await.handle(event);
        debug!(event = name, updates = updates.len(), "applied server event");
        for update in &updates {
            let _ = self.events.send(ClientEvent::View(update.clone()));
        }
        updates
    }

    /// Validates and sends `set_name`, then records the name as the local
    /// identity. Returns the request that was sent.
    pub async fn set_name(&self, raw: &str) -> Result<ClientRequest, ClientError> {
        let mut router = self.router.lock().await;
        let name = match router.submit_name(raw) {
            Ok(name) => name,
            Err(err) => {
                if err.is_user_visible() {
                    warn!(error = %err, "display name rejected");
                    let _ = self.events.send(ClientEvent::NameRejected(err.clone()));
                }
                return Err(err.into());
            }
        };
        let request = ClientRequest::SetName(name.clone());
        self.requests.emit(request.clone())?;
        router.record_name(name);
        Ok(request)
    }

    /// Validates and sends a chat message, refusing while the submit guard is
    /// still closed from the previous send.
    pub async fn send_message(&self, raw: &str) -> Result<(), ClientError> {
        let request = self.router.lock().await.submit_message(raw)?;
        if !self
            .submit_guard
            .lock()
            .await
            .try_acquire(std::time::Instant::now())
        {
            return Err(ComposeError::Busy.into());
        }
        self.requests.emit(request)?;
        Ok(())
    }

    pub async fn connectivity(&self) -> Connectivity {
        self.router.lock().await.connectivity()
    }

    pub async fn members(&self) -> Vec<Participant> {
        self.router.lock().await.membership().members().to_vec()
    }

    pub async fn local_name(&self) -> Option<String> {
        self.router.lock().await.local_name().map(str::to_string)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
