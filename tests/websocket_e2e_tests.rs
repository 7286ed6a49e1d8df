
use futures_util::{SinkExt, StreamExt};
use mrpg_server::config::HubConfig;
use std::net::SocketAddr;
use std::time::Duration;
use test_helpers::{
    create_test_server, create_test_server_with_hub, create_user_with_token, spawn_test_server,
    wait_for_connection_count,
};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, token: &str) -> Client {
    let url = format!("ws://{addr}/api/ws?token={token}");
    let (stream, _) = tokio::time::timeout(Duration::from_secs(5), connect_async(url))
        .await
        .expect("connect timed out")
        .expect("upgrade should succeed");
    stream
}

/// Next text or binary frame, skipping control frames.
async fn next_data_frame(client: &mut Client) -> Message {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("read failed");
        match frame {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return other,
        }
    }
}

fn expect_text(frame: Message) -> String {
    match frame {
        Message::Text(text) => text.as_str().to_string(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_reaches_both_then_world_only_reaches_remaining_peer() {
    let server = create_test_server();
    let addr = spawn_test_server(server.clone()).await;
    let (_, alice_token) = create_user_with_token(&server, "alice").await;
    let (_, bob_token) = create_user_with_token(&server, "bob").await;

    let mut alice = connect(addr, &alice_token).await;
    let mut bob = connect(addr, &bob_token).await;
    wait_for_connection_count(&server, 2).await;

    alice.send(Message::text("hello")).await.unwrap();
    assert_eq!(expect_text(next_data_frame(&mut alice).await), "hello");
    assert_eq!(expect_text(next_data_frame(&mut bob).await), "hello");

    alice.close(None).await.unwrap();
    wait_for_connection_count(&server, 1).await;

    bob.send(Message::text("world")).await.unwrap();
    assert_eq!(expect_text(next_data_frame(&mut bob).await), "world");

    // Queue barrier: counters are updated after the fan-out itself.
    assert_eq!(server.hub().connection_count().await, 1);
    let snapshot = server.hub().metrics().snapshot();
    assert_eq!(snapshot.connections_registered, 2);
    assert_eq!(snapshot.connections_unregistered, 1);
    // hello to two members, world to one.
    assert_eq!(snapshot.frames_delivered, 3);
}

#[tokio::test]
async fn test_binary_frames_are_relayed_as_binary() {
    let server = create_test_server();
    let addr = spawn_test_server(server.clone()).await;
    let (_, token) = create_user_with_token(&server, "carol").await;
    let mut client = connect(addr, &token).await;
    wait_for_connection_count(&server, 1).await;

    let payload = vec![0xff, 0xfe, 0x00, 0x01];
    client
        .send(Message::binary(payload.clone()))
        .await
        .unwrap();

    match next_data_frame(&mut client).await {
        Message::Binary(data) => assert_eq!(data.as_ref(), payload.as_slice()),
        other => panic!("expected a binary frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bearer_header_authenticates_upgrade() {
    let server = create_test_server();
    let addr = spawn_test_server(server.clone()).await;
    let (_, token) = create_user_with_token(&server, "dave").await;

    let mut request = format!("ws://{addr}/api/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    let (mut client, _) = connect_async(request).await.expect("upgrade should succeed");
    wait_for_connection_count(&server, 1).await;

    client.send(Message::text("ping")).await.unwrap();
    assert_eq!(expect_text(next_data_frame(&mut client).await), "ping");
}

#[tokio::test]
async fn test_upgrade_without_token_is_rejected() {
    let server = create_test_server();
    let addr = spawn_test_server(server.clone()).await;

    let result = connect_async(format!("ws://{addr}/api/ws")).await;
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade without a token must fail"),
    }
    assert_eq!(server.hub().connection_count().await, 0);
}

#[tokio::test]
async fn test_upgrade_with_forged_token_is_rejected() {
    let server = create_test_server();
    let addr = spawn_test_server(server.clone()).await;

    let result = connect_async(format!("ws://{addr}/api/ws?token=not.a.jwt")).await;
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade with a forged token must fail"),
    }
    assert_eq!(server.hub().metrics().snapshot().connections_registered, 0);
}

#[tokio::test]
async fn test_dropped_client_is_unregistered() {
    let server = create_test_server();
    let addr = spawn_test_server(server.clone()).await;
    let (_, erin_token) = create_user_with_token(&server, "erin").await;
    let (_, finn_token) = create_user_with_token(&server, "finn").await;

    let erin = connect(addr, &erin_token).await;
    let mut finn = connect(addr, &finn_token).await;
    wait_for_connection_count(&server, 2).await;

    // No close handshake, just a vanished socket.
    drop(erin);
    wait_for_connection_count(&server, 1).await;

    finn.send(Message::text("still here")).await.unwrap();
    assert_eq!(expect_text(next_data_frame(&mut finn).await), "still here");
}

#[tokio::test]
async fn test_presence_announcements_when_enabled() {
    let server = create_test_server_with_hub(HubConfig {
        announce_presence: true,
        ..HubConfig::default()
    });
    let addr = spawn_test_server(server.clone()).await;
    let (_, gina_token) = create_user_with_token(&server, "gina").await;
    let (hank, hank_token) = create_user_with_token(&server, "hank").await;

    let mut gina = connect(addr, &gina_token).await;
    let joined: serde_json::Value =
        serde_json::from_str(&expect_text(next_data_frame(&mut gina).await)).unwrap();
    assert_eq!(joined["type"], "user_joined");
    assert_eq!(joined["payload"]["username"], "gina");

    let mut hank_client = connect(addr, &hank_token).await;
    let joined: serde_json::Value =
        serde_json::from_str(&expect_text(next_data_frame(&mut gina).await)).unwrap();
    assert_eq!(joined["type"], "user_joined");
    assert_eq!(joined["payload"]["user_id"], hank.id);

    hank_client.close(None).await.unwrap();
    let left: serde_json::Value =
        serde_json::from_str(&expect_text(next_data_frame(&mut gina).await)).unwrap();
    assert_eq!(left["type"], "user_left");
    assert_eq!(left["payload"]["username"], "hank");
}

#[tokio::test]
async fn test_client_that_stops_reading_is_disconnected() {
    const PAYLOAD: usize = 256 * 1024;
    let server = create_test_server_with_hub(HubConfig {
        mailbox_capacity: 4,
        max_message_size: 1024 * 1024,
        ..HubConfig::default()
    });
    let addr = spawn_test_server(server.clone()).await;
    let (_, stalled_token) = create_user_with_token(&server, "ivy").await;
    let (_, reader_token) = create_user_with_token(&server, "jake").await;

    // Never read from this one, so its socket buffers fill up.
    let mut stalled = connect(addr, &stalled_token).await;
    let mut reader = connect(addr, &reader_token).await;
    wait_for_connection_count(&server, 2).await;

    let chunk = vec![0xab; PAYLOAD];
    let mut rounds = 0;
    while server.hub().connection_count().await == 2 {
        rounds += 1;
        assert!(rounds <= 400, "stalled client was never evicted");
        reader.send(Message::binary(chunk.clone())).await.unwrap();
        match next_data_frame(&mut reader).await {
            Message::Binary(data) => assert_eq!(data.len(), PAYLOAD),
            other => panic!("expected a binary frame, got {other:?}"),
        }
    }
    assert_eq!(server.hub().metrics().snapshot().slow_consumers_evicted, 1);

    // Whatever the evicted client still sends must not reach anyone.
    let _ = stalled.send(Message::text("from-evicted")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    reader.send(Message::text("marker")).await.unwrap();
    assert_eq!(expect_text(next_data_frame(&mut reader).await), "marker");
    assert_eq!(server.hub().connection_count().await, 1);
}
