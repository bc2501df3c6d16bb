use super::*;
use shared::protocol::{ChatMessage, PresenceSnapshot};
use tokio::sync::mpsc;

fn client_with_sink(
    send_cooldown: Duration,
) -> (Arc<ChatClient>, mpsc::UnboundedReceiver<ClientRequest>) {
    let (requests, requests_rx) = mpsc::unbounded_channel();
    (ChatClient::new(Arc::new(requests), send_cooldown), requests_rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ClientRequest>) -> Vec<ClientRequest> {
    let mut sent = Vec::new();
    while let Ok(request) = rx.try_recv() {
        sent.push(request);
    }
    sent
}

#[tokio::test]
async fn over_long_name_sends_nothing_and_is_signalled() {
    let (client, mut requests) = client_with_sink(Duration::ZERO);
    let mut events = client.subscribe_events();

    let err = client
        .set_name(&"n".repeat(33))
        .await
        .expect_err("name too long");

    assert!(matches!(
        err,
        ClientError::Compose(ComposeError::NameTooLong { chars: 33 })
    ));
    assert!(drain(&mut requests).is_empty());
    assert!(matches!(
        events.try_recv(),
        Ok(ClientEvent::NameRejected(ComposeError::NameTooLong { .. }))
    ));
    assert_eq!(client.local_name().await, None);
}

#[tokio::test]
async fn empty_name_is_dropped_quietly() {
    let (client, mut requests) = client_with_sink(Duration::ZERO);
    let mut events = client.subscribe_events();

    assert!(client.set_name("   ").await.is_err());
    assert!(drain(&mut requests).is_empty());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn name_then_message_are_sent_trimmed() {
    let (client, mut requests) = client_with_sink(Duration::ZERO);

    let sent = client.set_name("  Alice  ").await.expect("name accepted");
    assert_eq!(sent, ClientRequest::SetName("Alice".into()));
    client.send_message("  hello ").await.expect("message sent");

    assert_eq!(
        drain(&mut requests),
        vec![
            ClientRequest::SetName("Alice".into()),
            ClientRequest::Message("hello".into()),
        ]
    );
    assert_eq!(client.local_name().await.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn messages_before_name_or_empty_are_not_sent() {
    let (client, mut requests) = client_with_sink(Duration::ZERO);

    assert!(matches!(
        client.send_message("hello").await,
        Err(ClientError::Compose(ComposeError::NameNotSet))
    ));
    client.set_name("Alice").await.expect("name accepted");
    assert!(matches!(
        client.send_message("   ").await,
        Err(ClientError::Compose(ComposeError::MessageEmpty))
    ));

    assert_eq!(
        drain(&mut requests),
        vec![ClientRequest::SetName("Alice".into())]
    );
}

#[tokio::test]
async fn second_send_inside_cooldown_is_refused() {
    let (client, mut requests) = client_with_sink(Duration::from_secs(60));
    client.set_name("Alice").await.expect("name accepted");

    client.send_message("one").await.expect("first send");
    assert!(matches!(
        client.send_message("two").await,
        Err(ClientError::Compose(ComposeError::Busy))
    ));

    assert_eq!(
        drain(&mut requests),
        vec![
            ClientRequest::SetName("Alice".into()),
            ClientRequest::Message("one".into()),
        ]
    );
}

#[tokio::test]
async fn closed_transport_surfaces_as_error() {
    let (client, requests) = client_with_sink(Duration::ZERO);
    drop(requests);

    assert!(matches!(
        client.set_name("Alice").await,
        Err(ClientError::Transport(TransportError::Closed))
    ));
}

#[tokio::test]
async fn unsent_name_is_not_recorded() {
    let (client, requests) = client_with_sink(Duration::ZERO);
    drop(requests);

    assert!(client.set_name("Alice").await.is_err());
    assert_eq!(client.local_name().await, None);
    assert!(matches!(
        client.send_message("hello").await,
        Err(ClientError::Compose(ComposeError::NameNotSet))
    ));
}

#[tokio::test]
async fn run_applies_events_in_delivery_order() {
    let (client, _requests) = client_with_sink(Duration::ZERO);
    let mut views = client.subscribe_events();
    let (events_tx, events_rx) = mpsc::channel(16);

    let alice = Participant::new("a", "Alice", "10.0.0.2");
    let bob = Participant::new("b", "Bob", "10.0.0.4");
    for event in [
        ServerEvent::Connected,
        ServerEvent::PresenceSnapshot(PresenceSnapshot {
            users: vec![alice.clone(), bob.clone()],
            system: None,
        }),
        ServerEvent::PresenceJoin(bob.clone()),
        ServerEvent::PresenceLeave(alice.clone()),
        ServerEvent::Message(ChatMessage::new("System", "welcome")),
        ServerEvent::Message(ChatMessage::new("Bob (10.0.0.4)", "hi")),
    ] {
        events_tx.send(event).await.expect("queue event");
    }
    drop(events_tx);

    client.run(events_rx).await;

    assert_eq!(client.connectivity().await, Connectivity::Connected);
    assert_eq!(client.members().await, vec![bob]);

    let mut chat = Vec::new();
    let mut log = Vec::new();
    while let Ok(ClientEvent::View(update)) = views.try_recv() {
        match update {
            ViewUpdate::Chat(line) => chat.push(line.body),
            ViewUpdate::SystemLog(line) => log.push(line.text),
            ViewUpdate::Status(_) | ViewUpdate::Members(_) => {}
        }
    }
    assert_eq!(chat, vec!["hi"]);
    assert_eq!(
        log,
        vec![
            "Bob (10.0.0.4) joined",
            "Alice (10.0.0.2) left",
            "welcome",
        ]
    );
}

#[tokio::test]
async fn reconnect_snapshot_replaces_stale_members() {
    let (client, _requests) = client_with_sink(Duration::ZERO);
    let alice = Participant::new("a", "Alice", "10.0.0.2");
    let carol = Participant::new("c", "Carol", "10.0.0.5");

    client.apply(ServerEvent::Connected).await;
    client.apply(ServerEvent::PresenceJoin(alice)).await;
    client.apply(ServerEvent::Disconnected).await;
    assert_eq!(client.connectivity().await, Connectivity::Disconnected);

    client.apply(ServerEvent::Connected).await;
    client
        .apply(ServerEvent::PresenceSnapshot(PresenceSnapshot {
            users: vec![carol.clone()],
            system: Some(vec!["not seeded again".into()]),
        }))
        .await;

    assert_eq!(client.members().await, vec![carol]);
}
