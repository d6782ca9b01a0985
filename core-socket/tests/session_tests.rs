//! Socket session behavior against a scripted host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use bridge_traits::error::BridgeError;
use bridge_traits::socket::{ConnectOptions, SocketData};
use bridge_traits::testing::{ListenerKind, ScriptedSocket, ScriptedSocketHost};
use core_socket::{ReadyState, SocketError, SocketEventHandler, SocketEventKind, SocketSession};

fn open_session(url: &str) -> (ScriptedSocketHost, ScriptedSocket, SocketSession) {
    let host = ScriptedSocketHost::new();
    let session = SocketSession::connect(&host, url, ConnectOptions::default()).unwrap();
    let socket = host.socket(0).unwrap();
    (host, socket, session)
}

#[test]
fn test_connect_opens_socket_immediately() {
    let host = ScriptedSocketHost::new();
    let options = ConnectOptions::default()
        .header("x-token", "t")
        .protocol("graphql-ws");

    let session = SocketSession::connect(&host, "wss://db.example.com/ws", options).unwrap();

    assert_eq!(host.connection_count(), 1);
    let socket = host.socket(0).unwrap();
    assert_eq!(socket.url(), "wss://db.example.com/ws");
    assert_eq!(socket.options().protocols, vec!["graphql-ws".to_string()]);
    assert_eq!(session.url(), "wss://db.example.com/ws");
}

#[test]
fn test_connect_failure_is_reported() {
    let host = ScriptedSocketHost::new();
    host.fail_connects_with(BridgeError::NotAvailable("connectSocket".to_string()));

    let err = SocketSession::connect(&host, "wss://x", ConnectOptions::default()).unwrap_err();
    assert!(matches!(err, SocketError::Connect { ref url, .. } if url == "wss://x"));
}

#[test]
fn test_ready_state_follows_host_events() {
    let (_host, socket, session) = open_session("wss://x");
    assert_eq!(session.ready_state(), ReadyState::Connecting);
    assert_eq!(session.ready_state().code(), 0);

    socket.emit_open();
    assert_eq!(session.ready_state(), SocketSession::OPEN);
    assert_eq!(session.ready_state().code(), 1);

    session.close(Some(1000), Some("bye")).unwrap();
    assert_eq!(session.ready_state(), ReadyState::Open);

    socket.emit_close(Some(1000), "bye");
    assert_eq!(session.ready_state(), SocketSession::CLOSED);
    assert_eq!(session.ready_state().code(), 3);
    assert_ne!(session.ready_state(), SocketSession::CLOSING);
}

#[test]
fn test_state_tracked_without_handlers() {
    let (_host, socket, session) = open_session("wss://x");
    assert!(!session.has_handler(SocketEventKind::Open));

    socket.emit_open();
    assert_eq!(session.ready_state(), ReadyState::Open);
}

#[test]
fn test_transition_happens_before_handler_runs() {
    let (_host, socket, session) = open_session("wss://x");
    let session = Arc::new(session);
    let observed = Arc::new(Mutex::new(Vec::new()));

    let weak: Weak<SocketSession> = Arc::downgrade(&session);
    let seen = Arc::clone(&observed);
    session.set_onopen(move |_| {
        if let Some(session) = weak.upgrade() {
            seen.lock().unwrap().push(session.ready_state());
        }
    });

    let weak: Weak<SocketSession> = Arc::downgrade(&session);
    let seen = Arc::clone(&observed);
    session.set_onclose(move |event| {
        assert_eq!(event.code, Some(1006));
        if let Some(session) = weak.upgrade() {
            seen.lock().unwrap().push(session.ready_state());
        }
    });

    socket.emit_open();
    socket.emit_close(Some(1006), "abnormal");

    assert_eq!(
        *observed.lock().unwrap(),
        vec![ReadyState::Open, ReadyState::Closed]
    );
}

#[test]
fn test_reassigning_onmessage_delivers_to_latest_only() {
    let (_host, socket, session) = open_session("wss://x");
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    session.set_onmessage(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&second);
    session.set_onmessage(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    socket.emit_message("hello");

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(socket.listener_count(ListenerKind::Message), 1);
}

#[test]
fn test_message_payload_reaches_handler() {
    let (_host, socket, session) = open_session("wss://x");
    let received = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&received);
    session.subscribe(SocketEventHandler::on_message(move |event| {
        sink.lock().unwrap().push(event.data);
    }));

    socket.emit_message("text");
    socket.emit_message(vec![0u8, 1, 2]);

    let received = received.lock().unwrap();
    assert_eq!(received[0], SocketData::from("text"));
    assert_eq!(received[1], SocketData::from(vec![0u8, 1, 2]));
}

#[test]
fn test_unsubscribe_ignores_stale_handles() {
    let (_host, socket, session) = open_session("wss://x");
    let hits = Arc::new(AtomicUsize::new(0));

    let stale = session.set_onerror(|_| {});
    let counter = Arc::clone(&hits);
    let current = session.set_onerror(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!session.unsubscribe(stale));
    socket.emit_error("connection reset");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    assert!(session.unsubscribe(current));
    socket.emit_error("connection reset");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handler_may_reassign_its_own_slot() {
    let (_host, socket, session) = open_session("wss://x");
    let session = Arc::new(session);
    let late = Arc::new(AtomicUsize::new(0));

    let weak = Arc::downgrade(&session);
    let counter = Arc::clone(&late);
    session.set_onmessage(move |_| {
        if let Some(session) = weak.upgrade() {
            let counter = Arc::clone(&counter);
            session.set_onmessage(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    socket.emit_message("first");
    socket.emit_message("second");
    assert_eq!(late.load(Ordering::SeqCst), 1);
}

#[test]
fn test_send_and_close_delegate_to_host() {
    let (_host, socket, session) = open_session("wss://x");

    session.send("ping").unwrap();
    session.send(vec![9u8]).unwrap();
    session.close(None, None).unwrap();

    assert_eq!(
        socket.sent(),
        vec![SocketData::from("ping"), SocketData::from(vec![9u8])]
    );
    assert_eq!(socket.close_calls(), vec![(None, None)]);
}

#[test]
fn test_send_failure_is_reported() {
    let (_host, socket, session) = open_session("wss://x");
    socket.fail_sends_with(BridgeError::OperationFailed("socket not open".to_string()));

    let err = session.send("ping").unwrap_err();
    assert_eq!(
        err,
        SocketError::Send(BridgeError::OperationFailed("socket not open".to_string()))
    );
}

#[test]
fn test_host_sees_one_listener_per_kind() {
    let (_host, socket, session) = open_session("wss://x");
    for _ in 0..3 {
        session.set_onopen(|_| {});
        session.set_onclose(|_| {});
        session.set_onerror(|_| {});
    }

    for kind in [
        ListenerKind::Open,
        ListenerKind::Message,
        ListenerKind::Close,
        ListenerKind::Error,
    ] {
        assert_eq!(socket.listener_count(kind), 1);
    }
}
