//! End-to-end tests for the client SDK against a loopback dispatcher
//! built from `huddle-registry`.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use huddle_client::{Client, ClientConfig, ClientError};
use huddle_protocol::{Delivery, ProtocolError, RoomId};
use huddle_registry::{RegistryConfig, RegistryHandle, dispatch};
use huddle_transport::stream;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

// =========================================================================
// Loopback dispatcher
// =========================================================================

/// Minimal broker: one TCP listener and one UDP socket driving the
/// registry through its dispatch functions.
struct TestDispatcher {
    control_port: u16,
    data_port: u16,
    tasks: Vec<JoinHandle<()>>,
}

impl TestDispatcher {
    async fn start(capacity: usize) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let registry = RegistryHandle::spawn(RegistryConfig::with_capacity(capacity));
        let control = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let data = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let control_port = control.local_addr().unwrap().port();
        let data_port = data.local_addr().unwrap().port();

        let control_registry = registry.clone();
        let control_task = tokio::spawn(async move {
            while let Ok((mut conn, peer)) = control.accept().await {
                let registry = control_registry.clone();
                tokio::spawn(async move {
                    let Ok(request) = stream::read_request(&mut conn, 1024).await else {
                        return;
                    };
                    let response = dispatch::handle_control_bytes(&registry, peer, &request).await;
                    let _ = dispatch::write_control_response(&mut conn, &response).await;
                });
            }
        });

        let data_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 2048];
            while let Ok((n, _)) = data.recv_from(&mut buf).await {
                dispatch::handle_datagram(&registry, &buf[..n]).await;
            }
        });

        Self {
            control_port,
            data_port,
            tasks: vec![control_task, data_task],
        }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new("127.0.0.1")
            .with_control_port(self.control_port)
            .with_data_port(self.data_port)
            .with_listen_addr("127.0.0.1:0")
    }

    async fn client(&self) -> Client {
        Client::connect(self.config()).await.unwrap()
    }
}

impl Drop for TestDispatcher {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Drains deliveries until at least `count` have arrived.
async fn wait_for_deliveries(client: &Client, count: usize) -> Vec<Delivery> {
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), async {
        while received.len() < count {
            received.extend(client.deliveries().await);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("deliveries should arrive");
    received
}

/// A control server that answers every request with `reply`.
async fn fixed_reply_server(reply: &'static [u8]) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let task = tokio::spawn(async move {
        while let Ok((mut conn, _)) = listener.accept().await {
            let _ = stream::read_request(&mut conn, 1024).await;
            let _ = conn.write_all(reply).await;
            let _ = conn.shutdown().await;
        }
    });
    (port, task)
}

// =========================================================================
// Control plane
// =========================================================================

#[tokio::test]
async fn test_connect_registers_and_gets_identifier() {
    let dispatcher = TestDispatcher::start(2).await;
    let client = dispatcher.client().await;

    assert_eq!(client.identifier().as_str().len(), 32);
    assert!(client.room_id().is_none());
    client.stop().await;
}

#[tokio::test]
async fn test_register_again_with_new_identity_clears_room() {
    let dispatcher = TestDispatcher::start(3).await;
    let mut a = dispatcher.client().await;
    let mut b = dispatcher.client().await;

    let room_id = a.autojoin().await.unwrap().clone();
    b.join_room(&room_id).await.unwrap();

    let old = a.identifier().clone();
    let new = a.register().await.unwrap().clone();
    assert_ne!(new, old, "each control call arrives from a new source port");
    assert!(a.room_id().is_none());
    assert!(matches!(a.send(&json!("hi")).await, Err(ClientError::NoRoom)));

    // After joining again, sends carry the new identity and arrive.
    a.join_room(&room_id).await.unwrap();
    a.send(&json!("hi")).await.unwrap();

    let received = wait_for_deliveries(&b, 1).await;
    assert_eq!(received[0].sender, new);
    assert_eq!(received[0].message, json!("hi"));

    a.stop().await;
    b.stop().await;
}

#[tokio::test]
async fn test_create_room_then_get_rooms_lists_it() {
    let dispatcher = TestDispatcher::start(2).await;
    let client = dispatcher.client().await;

    let room_id = client.create_room(Some("Test room")).await.unwrap();
    assert!(client.room_id().is_none(), "create does not join");

    let rooms = client.get_rooms().await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, room_id);
    assert_eq!(rooms[0].name, "Test room");
    assert_eq!(rooms[0].nb_players, 0);
    assert_eq!(rooms[0].capacity, 2);
    client.stop().await;
}

#[tokio::test]
async fn test_join_full_room_is_rejected_with_text() {
    let dispatcher = TestDispatcher::start(1).await;
    let mut a = dispatcher.client().await;
    let mut b = dispatcher.client().await;

    let room_id = a.create_room(None).await.unwrap();
    a.join_room(&room_id).await.unwrap();

    let result = b.join_room(&room_id).await;
    match result {
        Err(ClientError::Rejected(text)) => assert_eq!(text, format!("room {room_id} is full")),
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(b.room_id().is_none());

    a.stop().await;
    b.stop().await;
}

#[tokio::test]
async fn test_join_missing_room_is_rejected() {
    let dispatcher = TestDispatcher::start(2).await;
    let mut client = dispatcher.client().await;

    let result = client.join_room(&RoomId::new("nope")).await;
    assert!(matches!(result, Err(ClientError::Rejected(_))));
    client.stop().await;
}

#[tokio::test]
async fn test_autojoin_then_leave_clears_room() {
    let dispatcher = TestDispatcher::start(2).await;
    let mut client = dispatcher.client().await;

    let room_id = client.autojoin().await.unwrap().clone();
    assert_eq!(client.room_id(), Some(&room_id));
    assert_eq!(client.get_rooms().await.unwrap()[0].nb_players, 1);

    client.leave_room().await.unwrap();
    assert!(client.room_id().is_none());
    assert_eq!(client.get_rooms().await.unwrap()[0].nb_players, 0);
    client.stop().await;
}

#[tokio::test]
async fn test_room_scoped_calls_without_room_fail_locally() {
    let dispatcher = TestDispatcher::start(2).await;
    let mut client = dispatcher.client().await;

    assert!(matches!(client.leave_room().await, Err(ClientError::NoRoom)));
    assert!(matches!(client.send(&json!("hi")).await, Err(ClientError::NoRoom)));
    assert!(matches!(
        client.sendto(client.identifier().clone(), &json!("hi")).await,
        Err(ClientError::NoRoom)
    ));
    client.stop().await;
}

#[tokio::test]
async fn test_malformed_response_is_decode_error() {
    let (port, server) = fixed_reply_server(b"definitely not json").await;
    let config = ClientConfig::new("127.0.0.1")
        .with_control_port(port)
        .with_data_port(port)
        .with_listen_addr("127.0.0.1:0");

    let result = Client::connect(config).await;
    assert!(matches!(
        result,
        Err(ClientError::Protocol(ProtocolError::Decode(_)))
    ));
    server.abort();
}

#[tokio::test]
async fn test_legacy_string_flag_is_accepted() {
    let (port, server) =
        fixed_reply_server(br#"{"success": "True", "message": "legacy-id"}"#).await;
    let config = ClientConfig::new("127.0.0.1")
        .with_control_port(port)
        .with_data_port(port)
        .with_listen_addr("127.0.0.1:0");

    let client = Client::connect(config).await.unwrap();
    assert_eq!(client.identifier().as_str(), "legacy-id");
    client.stop().await;
    server.abort();
}

#[tokio::test]
async fn test_connect_to_closed_port_is_transport_error() {
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = unused.local_addr().unwrap().port();
    drop(unused);

    let config = ClientConfig::new("127.0.0.1")
        .with_control_port(port)
        .with_listen_addr("127.0.0.1:0");
    let result = Client::connect(config).await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}

// =========================================================================
// Data plane
// =========================================================================

#[tokio::test]
async fn test_send_reaches_other_member_tagged_with_sender() {
    let dispatcher = TestDispatcher::start(2).await;
    let mut a = dispatcher.client().await;
    let mut b = dispatcher.client().await;

    let room_id = a.autojoin().await.unwrap().clone();
    b.join_room(&room_id).await.unwrap();

    let message = json!({"name": "A", "message": "AAA"});
    a.send(&message).await.unwrap();

    let received = wait_for_deliveries(&b, 1).await;
    assert_eq!(received.len(), 1);
    assert_eq!(&received[0].sender, a.identifier());
    assert_eq!(received[0].message, message);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(a.get_messages().await.is_empty(), "sender must not hear itself");

    a.stop().await;
    b.stop().await;
}

#[tokio::test]
async fn test_sendto_reaches_only_named_member() {
    let dispatcher = TestDispatcher::start(3).await;
    let mut a = dispatcher.client().await;
    let mut b = dispatcher.client().await;
    let mut c = dispatcher.client().await;

    let room_id = a.autojoin().await.unwrap().clone();
    b.join_room(&room_id).await.unwrap();
    c.join_room(&room_id).await.unwrap();

    b.sendto(a.identifier().clone(), &json!({"name": "B", "message": "BBB"}))
        .await
        .unwrap();

    let received = wait_for_deliveries(&a, 1).await;
    assert_eq!(&received[0].sender, b.identifier());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(c.get_messages().await.is_empty());

    a.stop().await;
    b.stop().await;
    c.stop().await;
}

#[tokio::test]
async fn test_get_messages_collapses_duplicates_then_empty() {
    let dispatcher = TestDispatcher::start(2).await;
    let client = dispatcher.client().await;

    let raw = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let payload = br#"{"someone": "hello"}"#;
    raw.send_to(payload, client.local_data_addr()).await.unwrap();
    raw.send_to(payload, client.local_data_addr()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let first = client.get_messages().await;
    assert_eq!(first, HashSet::from([payload.to_vec()]));
    assert!(client.get_messages().await.is_empty());
    client.stop().await;
}

#[tokio::test]
async fn test_deliveries_skips_malformed_payloads() {
    let dispatcher = TestDispatcher::start(2).await;
    let client = dispatcher.client().await;

    let raw = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    raw.send_to(b"not a delivery", client.local_data_addr())
        .await
        .unwrap();
    raw.send_to(br#"{"p1": 7}"#, client.local_data_addr())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let deliveries = client.deliveries().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].sender.as_str(), "p1");
    assert_eq!(deliveries[0].message, json!(7));
    client.stop().await;
}

#[tokio::test]
async fn test_stop_releases_data_port() {
    let dispatcher = TestDispatcher::start(2).await;
    let client = dispatcher.client().await;
    let addr: SocketAddr = client.local_data_addr();

    tokio::time::timeout(Duration::from_secs(2), client.stop())
        .await
        .expect("stop should return promptly");

    UdpSocket::bind(addr).await.expect("data port should be free");
}
