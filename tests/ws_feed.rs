//! Live feed: a subscriber receives the events addressed to the accounts
//! it follows, and nothing else.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Method;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use common::TestServer;

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(server: &TestServer) -> Socket {
    let url = format!("ws://{}/ws", server.addr);
    let Ok((socket, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect failed");
    };
    socket
}

async fn next_json(socket: &mut Socket) -> Option<Value> {
    let frame = tokio::time::timeout(Duration::from_millis(500), socket.next())
        .await
        .ok()??;
    let Ok(Message::Text(text)) = frame else {
        return None;
    };
    serde_json::from_str(text.as_str()).ok()
}

async fn subscribe(socket: &mut Socket, user_ids: &[String]) {
    let command = json!({
        "id": "sub-1",
        "type": "command",
        "payload": {"command": "subscribe", "user_ids": user_ids},
    });
    let Ok(()) = socket.send(Message::text(command.to_string())).await else {
        panic!("send failed");
    };
    let Some(reply) = next_json(socket).await else {
        panic!("no subscribe reply");
    };
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "sub-1");
}

#[tokio::test]
async fn subscriber_receives_events_for_followed_account() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let mut socket = connect(&server).await;
    subscribe(&mut socket, &[welfare.id.to_string()]).await;

    let (status, _) = server
        .send(
            Method::POST,
            "/api/v1/cases",
            Some(welfare),
            Some(json!({"title": "Hip surgery", "target_amount": 500.0})),
        )
        .await;
    assert_eq!(status, 201);

    let Some(event) = next_json(&mut socket).await else {
        panic!("no event delivered");
    };
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "case_created");
}

#[tokio::test]
async fn events_for_other_accounts_are_filtered_out() {
    let server = TestServer::start().await;
    let watched = server.register("welfare", true).await;
    let other = server.register("welfare", true).await;
    let mut socket = connect(&server).await;
    subscribe(&mut socket, &[watched.id.to_string()]).await;

    let (status, _) = server
        .send(
            Method::POST,
            "/api/v1/cases",
            Some(other),
            Some(json!({"title": "Dental care", "target_amount": 80.0})),
        )
        .await;
    assert_eq!(status, 201);

    assert!(next_json(&mut socket).await.is_none());
}
