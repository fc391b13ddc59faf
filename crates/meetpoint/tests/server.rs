//! Integration tests for the rendezvous server: binding exchange and
//! roster broadcast over real WebSocket connections.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use meetpoint::RendezvousServer;
use meetpoint_protocol::{
    decode, decode_announcement, encode_binding_request, MessageType,
    PeerAnnouncement, TransactionId, MAGIC_COOKIE,
};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns its address.
async fn start_server() -> String {
    let server = RendezvousServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn tid(seed: u8) -> TransactionId {
    TransactionId(std::array::from_fn(|i| seed.wrapping_add(i as u8)))
}

/// Receives the next binary frame, or `None` if `wait` elapses first.
async fn next_frame(ws: &mut ClientWs, wait: Duration) -> Option<Vec<u8>> {
    match tokio::time::timeout(wait, ws.next()).await {
        Ok(Some(Ok(msg))) => Some(msg.into_data().to_vec()),
        _ => None,
    }
}

/// Sends a binding request and returns the success response bytes.
async fn bind(ws: &mut ClientWs, seed: u8) -> Vec<u8> {
    let request = encode_binding_request(&tid(seed));
    ws.send(Message::Binary(request.to_vec().into()))
        .await
        .expect("send binding request");
    next_frame(ws, Duration::from_secs(2))
        .await
        .expect("should receive binding success")
}

/// Collects announcements until `count` arrive or the wait runs dry.
async fn collect_announcements(
    ws: &mut ClientWs,
    count: usize,
) -> Vec<PeerAnnouncement> {
    let mut anns = Vec::new();
    while anns.len() < count {
        match next_frame(ws, Duration::from_secs(2)).await {
            Some(frame) => {
                anns.push(
                    decode_announcement(&frame)
                        .expect("frame should be an announcement"),
                );
            }
            None => break,
        }
    }
    anns
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_binding_success_echoes_transaction_id() {
    // Scenario A: one peer binds, gets exactly one success, no broadcast.
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = bind(&mut ws, 0x01).await;
    let msg = decode(&reply).expect("reply should decode");
    assert_eq!(msg.msg_type, MessageType::BindingSuccess);
    assert_eq!(msg.transaction_id, tid(0x01));

    // Registry size 1: nothing else should arrive.
    assert!(
        next_frame(&mut ws, Duration::from_millis(300)).await.is_none(),
        "single peer must not receive a broadcast"
    );
}

#[tokio::test]
async fn test_two_peers_are_introduced() {
    // Scenario B: after the second registration, both peers learn the
    // other's endpoint.
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    bind(&mut ws1, 0x10).await;

    let mut ws2 = connect(&addr).await;
    bind(&mut ws2, 0x20).await;

    let to_first = collect_announcements(&mut ws1, 1).await;
    assert_eq!(to_first.len(), 1);
    assert_eq!(to_first[0].index, 1, "peer 1 learns about peer 2");
    assert!(to_first[0].ip.is_loopback());
    assert!(to_first[0].port > 0);

    let to_second = collect_announcements(&mut ws2, 1).await;
    assert_eq!(to_second.len(), 1);
    assert_eq!(to_second[0].index, 0, "peer 2 learns about peer 1");
}

#[tokio::test]
async fn test_third_peer_triggers_full_rebroadcast() {
    // Scenario C: a third registration re-sends all ordered pairs,
    // including the unchanged peer-1/peer-2 information.
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    bind(&mut ws1, 0x01).await;
    let mut ws2 = connect(&addr).await;
    bind(&mut ws2, 0x02).await;

    // Drain the two-peer round.
    assert_eq!(collect_announcements(&mut ws1, 1).await.len(), 1);
    assert_eq!(collect_announcements(&mut ws2, 1).await.len(), 1);

    let mut ws3 = connect(&addr).await;
    bind(&mut ws3, 0x03).await;

    // 6 ordered pairs: every peer hears about both others.
    let to_first = collect_announcements(&mut ws1, 2).await;
    let mut indices: Vec<u64> =
        to_first.iter().map(|a| a.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![1, 2]);

    let to_second = collect_announcements(&mut ws2, 2).await;
    let mut indices: Vec<u64> =
        to_second.iter().map(|a| a.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 2], "stale peer-1 info re-sent");

    let to_third = collect_announcements(&mut ws3, 2).await;
    let mut indices: Vec<u64> =
        to_third.iter().map(|a| a.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1]);
}

#[tokio::test]
async fn test_non_protocol_payload_is_ignored() {
    // Scenario D: a payload without the magic cookie gets no response
    // and changes nothing.
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(
        b"definitely not a stun header!!".to_vec().into(),
    ))
    .await
    .expect("send");

    assert!(
        next_frame(&mut ws, Duration::from_millis(300)).await.is_none(),
        "no response to a non-protocol payload"
    );

    // The server is still healthy and the roster unchanged: a real
    // binding now registers as the very first peer, so no broadcast.
    let reply = bind(&mut ws, 0x0a).await;
    assert_eq!(
        decode(&reply).unwrap().msg_type,
        MessageType::BindingSuccess
    );
    assert!(
        next_frame(&mut ws, Duration::from_millis(300)).await.is_none()
    );
}

#[tokio::test]
async fn test_unsupported_type_gets_no_response() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    // Conformant header, type 0x0002 — outside the binding profile.
    let mut payload = vec![0x00, 0x02, 0x00, 0x00];
    payload.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    payload.extend_from_slice(&[0u8; 12]);
    ws.send(Message::Binary(payload.into())).await.expect("send");

    assert!(
        next_frame(&mut ws, Duration::from_millis(300)).await.is_none(),
        "rejected message gets no response"
    );
}

#[tokio::test]
async fn test_rebinding_does_not_grow_the_roster() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    bind(&mut ws1, 0x01).await;
    // Re-bind on the same connection: answered, but the roster still
    // holds one peer, so no broadcast fires.
    bind(&mut ws1, 0x02).await;
    assert!(
        next_frame(&mut ws1, Duration::from_millis(300)).await.is_none(),
        "re-binding alone must not trigger introductions"
    );

    // A genuine second peer produces exactly one announcement each.
    let mut ws2 = connect(&addr).await;
    bind(&mut ws2, 0x03).await;
    assert_eq!(collect_announcements(&mut ws2, 1).await.len(), 1);
    let to_first = collect_announcements(&mut ws1, 1).await;
    assert_eq!(to_first.len(), 1);
    assert!(
        next_frame(&mut ws1, Duration::from_millis(300)).await.is_none(),
        "an upserted roster of two yields one announcement per peer"
    );
}

#[tokio::test]
async fn test_disconnected_peer_leaves_the_roster() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    bind(&mut ws1, 0x01).await;
    let mut ws2 = connect(&addr).await;
    bind(&mut ws2, 0x02).await;

    // Drain the two-peer round.
    collect_announcements(&mut ws1, 1).await;
    collect_announcements(&mut ws2, 1).await;

    // Peer 2 disconnects; give the loop a moment to process it.
    ws2.close(None).await.expect("close");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Peer 3 binds: the round covers only peers 1 and 3.
    let mut ws3 = connect(&addr).await;
    bind(&mut ws3, 0x03).await;

    let to_third = collect_announcements(&mut ws3, 1).await;
    assert_eq!(to_third.len(), 1);
    assert_eq!(to_third[0].index, 0, "only the surviving peer");

    let to_first = collect_announcements(&mut ws1, 1).await;
    assert_eq!(to_first.len(), 1);
    assert_eq!(to_first[0].index, 2, "the departed peer is gone");
    assert!(
        next_frame(&mut ws1, Duration::from_millis(300)).await.is_none()
    );
}
