//! Failover Integration Tests
//!
//! Each test spawns real RADIUS responders on loopback UDP sockets and drives
//! `Context::authenticate_async` against them:
//! - Ordered failover from a silent server to a live one
//! - Reject and unexpected codes end the call without failover
//! - Forged replies are ignored and end in a timeout
//! - Vendor attribute extraction from Access-Accept

use radius_client::{AuthOutcome, Context};
use radius_proto::{
    AttributeType, Code, Packet, VendorSpecific, decrypt_user_password, sign_response,
    verify_request_message_authenticator,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::net::UdpSocket;
use tokio::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone)]
enum Reply {
    /// Accept when the password matches, reject otherwise
    CheckPassword {
        password: &'static str,
        vendor_attrs: Vec<(u32, u8, &'static [u8])>,
    },
    /// Answer every request with this code
    Fixed(Code),
    /// Answer signed with a different secret
    Forged(&'static str),
}

struct Responder {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

/// Spawn a responder that answers with `reply`, signed with `secret`
async fn spawn_responder(secret: &'static str, reply: Reply) -> Responder {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let Ok(request) = Packet::decode(&buf[..len]) else {
                continue;
            };
            let response = build_reply(&request, secret, &reply);
            let _ = socket.send_to(&response.encode().unwrap(), peer).await;
        }
    });

    Responder { addr, requests }
}

/// Bind a socket that never answers
async fn spawn_silent() -> Responder {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        while socket.recv_from(&mut buf).await.is_ok() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    Responder { addr, requests }
}

fn build_reply(request: &Packet, secret: &str, reply: &Reply) -> Packet {
    assert_eq!(
        verify_request_message_authenticator(request, secret.as_bytes()),
        Some(true)
    );

    let (code, vendor_attrs, signing_secret) = match reply {
        Reply::CheckPassword {
            password,
            vendor_attrs,
        } => {
            let hidden = request
                .find_attribute(AttributeType::UserPassword as u8)
                .unwrap();
            let clear =
                decrypt_user_password(&hidden.value, secret.as_bytes(), &request.authenticator)
                    .unwrap();
            if clear == password.as_bytes() {
                (Code::AccessAccept, vendor_attrs.clone(), secret)
            } else {
                (Code::AccessReject, vec![], secret)
            }
        }
        Reply::Fixed(code) => (*code, vec![], secret),
        Reply::Forged(other) => (Code::AccessAccept, vec![], *other),
    };

    let mut response = Packet::new(code, request.identifier, request.authenticator);
    for (vendor, subtype, value) in vendor_attrs {
        response.add_attribute(
            VendorSpecific::new(vendor)
                .with(subtype, value.to_vec())
                .into_attribute()
                .unwrap(),
        );
    }
    response
        .sign_message_authenticator(signing_secret.as_bytes())
        .unwrap();
    sign_response(&mut response, &request.authenticator, signing_secret.as_bytes()).unwrap();
    response
}

fn context_with(servers: &[(&Responder, &str)], specs: &[(u32, u8)]) -> Context {
    let mut context = Context::new();
    for (responder, secret) in servers {
        context
            .add_server(*secret, responder.addr.ip(), responder.addr.port(), TIMEOUT)
            .unwrap();
    }
    for (vendor, subtype) in specs {
        context.add_attribute_spec(*vendor, *subtype).unwrap();
    }
    context.enable_debug_logging();
    context
}

#[tokio::test]
async fn test_accept_with_vendor_attributes() {
    let server = spawn_responder(
        "testing123",
        Reply::CheckPassword {
            password: "password",
            vendor_attrs: vec![(311, 1, &b"admins"[..]), (9, 1, &b"shell:priv-lvl=15"[..])],
        },
    )
    .await;
    let mut context = context_with(&[(&server, "testing123")], &[(9, 1), (311, 1), (311, 2)]);

    let outcome = context.authenticate_async("alice", "password").await;

    assert_eq!(outcome, AuthOutcome::Accept);
    let results = context.attribute_results();
    assert_eq!(results[0].value(), Some(&b"shell:priv-lvl=15"[..]));
    assert_eq!(results[1].value(), Some(&b"admins"[..]));
    assert!(!results[2].is_present());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let server = spawn_responder(
        "testing123",
        Reply::CheckPassword {
            password: "password",
            vendor_attrs: vec![(1, 2, &b"x"[..])],
        },
    )
    .await;
    let mut context = context_with(&[(&server, "testing123")], &[(1, 2)]);

    let outcome = context.authenticate_async("alice", "wrong").await;

    assert_eq!(outcome, AuthOutcome::Reject);
    assert_eq!(context.last_outcome(), Some(AuthOutcome::Reject));
    assert!(!context.attribute_results()[0].is_present());
}

#[tokio::test]
async fn test_failover_after_one_timeout() {
    let a = spawn_silent().await;
    let b = spawn_responder(
        "secret-b",
        Reply::CheckPassword {
            password: "p",
            vendor_attrs: vec![(1, 2, &b"x"[..])],
        },
    )
    .await;
    let mut context = context_with(&[(&a, "secret-a"), (&b, "secret-b")], &[(1, 2)]);

    let started = Instant::now();
    let outcome = context.authenticate_async("u", "p").await;
    let elapsed = started.elapsed();

    assert_eq!(outcome, AuthOutcome::Accept);
    assert!(elapsed >= TIMEOUT, "failed over after {:?}", elapsed);
    assert!(elapsed < TIMEOUT * 2, "took {:?}", elapsed);
    assert_eq!(a.requests.load(Ordering::SeqCst), 1);
    assert_eq!(b.requests.load(Ordering::SeqCst), 1);

    let results = context.attribute_results();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_present());
    assert_eq!(results[0].value(), Some(&b"x"[..]));
    assert_eq!(context.last_attempt().map(|p| p.server_index), Some(1));
}

#[tokio::test]
async fn test_reject_does_not_fail_over() {
    let a = spawn_responder("s", Reply::Fixed(Code::AccessReject)).await;
    let b = spawn_responder("s", Reply::Fixed(Code::AccessAccept)).await;
    let mut context = context_with(&[(&a, "s"), (&b, "s")], &[]);

    let outcome = context.authenticate_async("u", "p").await;

    assert_eq!(outcome, AuthOutcome::Reject);
    assert_eq!(b.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unexpected_code_is_protocol_error() {
    let a = spawn_responder("s", Reply::Fixed(Code::AccessChallenge)).await;
    let b = spawn_responder("s", Reply::Fixed(Code::AccessAccept)).await;
    let mut context = context_with(&[(&a, "s"), (&b, "s")], &[]);

    let outcome = context.authenticate_async("u", "p").await;

    assert_eq!(outcome, AuthOutcome::ProtocolError);
    assert_eq!(b.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_forged_reply_is_ignored() {
    let a = spawn_responder("s", Reply::Forged("not-the-secret")).await;
    let b = spawn_silent().await;
    let mut context = context_with(&[(&a, "s"), (&b, "s")], &[]);

    let outcome = context.authenticate_async("u", "p").await;

    assert_eq!(outcome, AuthOutcome::AllServersTimedOut);
    assert_eq!(a.requests.load(Ordering::SeqCst), 1);
    assert_eq!(b.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_context_is_reusable() {
    let server = spawn_responder(
        "s",
        Reply::CheckPassword {
            password: "p",
            vendor_attrs: vec![(1, 2, &b"x"[..])],
        },
    )
    .await;
    let mut context = context_with(&[(&server, "s")], &[(1, 2)]);

    assert_eq!(context.authenticate_async("u", "p").await, AuthOutcome::Accept);
    assert!(context.attribute_results()[0].is_present());

    // A reject keeps the values of the last accepted call
    assert_eq!(context.authenticate_async("u", "nope").await, AuthOutcome::Reject);
    assert_eq!(context.attribute_results()[0].value(), Some(&b"x"[..]));
    assert_eq!(server.requests.load(Ordering::SeqCst), 2);
}
