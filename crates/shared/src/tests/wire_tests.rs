use super::*;
use serde_json::json;

#[test]
fn decodes_open_handshake_with_defaults() {
    let packet = EnginePacket::decode(r#"0{"sid":"abc","upgrades":[]}"#).expect("open");
    let EnginePacket::Open(handshake) = packet else {
        panic!("expected open packet, got {packet:?}");
    };
    assert_eq!(handshake.sid, "abc");
    assert_eq!(handshake.ping_interval, 25_000);
    assert_eq!(handshake.ping_timeout, 20_000);
}

#[test]
fn ping_and_pong_keep_probe_data() {
    assert_eq!(
        EnginePacket::decode("2probe").expect("ping"),
        EnginePacket::Ping("probe".into())
    );
    assert_eq!(EnginePacket::Pong("probe".into()).encode(), "3probe");
    assert_eq!(EnginePacket::decode("2").expect("ping"), EnginePacket::Ping(String::new()));
}

#[test]
fn rejects_unknown_engine_type_and_empty_frame() {
    assert!(matches!(
        EnginePacket::decode("9"),
        Err(WireError::UnknownEngineType('9'))
    ));
    assert!(matches!(EnginePacket::decode(""), Err(WireError::Empty)));
}

#[test]
fn decodes_event_on_default_namespace() {
    let packet =
        SocketPacket::decode(r#"2["message",{"name":"Bob (10.0.0.2)","msg":"hi"}]"#).expect("event");
    assert_eq!(
        packet,
        SocketPacket::Event {
            namespace: "/".into(),
            ack_id: None,
            name: "message".into(),
            payload: json!({"name": "Bob (10.0.0.2)", "msg": "hi"}),
        }
    );
}

#[test]
fn decodes_event_with_namespace_and_ack_id() {
    let packet = SocketPacket::decode(r#"2/admin,12["presence_join",{"sid":"s1"}]"#).expect("event");
    let SocketPacket::Event {
        namespace,
        ack_id,
        name,
        payload,
    } = packet
    else {
        panic!("expected event");
    };
    assert_eq!(namespace, "/admin");
    assert_eq!(ack_id, Some(12));
    assert_eq!(name, "presence_join");
    assert_eq!(payload, json!({"sid": "s1"}));
}

#[test]
fn event_without_arguments_has_null_payload() {
    let packet = SocketPacket::decode(r#"2["ping_me"]"#).expect("event");
    assert!(matches!(
        packet,
        SocketPacket::Event { ref payload, .. } if payload.is_null()
    ));
}

#[test]
fn rejects_event_without_name() {
    assert!(matches!(
        SocketPacket::decode("2[]"),
        Err(WireError::MalformedEvent)
    ));
    assert!(matches!(
        SocketPacket::decode(r#"2[42,"x"]"#),
        Err(WireError::MalformedEvent)
    ));
    assert!(matches!(
        SocketPacket::decode(r#"2{"a":1}"#),
        Err(WireError::MalformedEvent)
    ));
}

#[test]
fn decodes_connect_acknowledgement_and_errors() {
    assert_eq!(
        SocketPacket::decode(r#"0{"sid":"xyz"}"#).expect("connect"),
        SocketPacket::Connect {
            namespace: "/".into(),
            data: Some(json!({"sid": "xyz"})),
        }
    );
    assert!(matches!(
        SocketPacket::decode(r#"4{"message":"Not authorized"}"#).expect("connect error"),
        SocketPacket::ConnectError { data: Some(_), .. }
    ));
    assert_eq!(
        SocketPacket::decode("1").expect("disconnect"),
        SocketPacket::Disconnect { namespace: "/".into() }
    );
}

#[test]
fn encodes_outbound_frames() {
    assert_eq!(SocketPacket::connect().to_frame(), "40");
    assert_eq!(
        SocketPacket::event("set_name", json!("alice")).to_frame(),
        r#"42["set_name","alice"]"#
    );
    let namespaced = SocketPacket::Event {
        namespace: "/admin".into(),
        ack_id: Some(3),
        name: "message".into(),
        payload: json!("hi"),
    };
    assert_eq!(namespaced.encode(), r#"2/admin,3["message","hi"]"#);
}
