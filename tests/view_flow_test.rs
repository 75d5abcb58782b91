//! End-to-end view tests: quota gate, send, thread switching and loading,
//! with the assistant API and backend served by wiremock.

mod common;

use common::{text_run, Harness, USER_TOKEN};

use assistant_chat::meter::UPSELL_MESSAGE;
use assistant_chat::models::{Message, Role, Thread, WELCOME_MESSAGE};
use assistant_chat::view::{AppMessage, Command, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn seed_thread(view: &mut assistant_chat::view::ChatView, thread: Thread) {
    let id = thread.id.clone();
    view.threads.push(thread);
    assert!(view.select_thread(&id));
}

#[tokio::test]
async fn test_exhausted_quota_appends_upsell_without_sending() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path(harness.backend_path("/tokens")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"tokens": 0})))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.api_path("/threads/thread_1/messages")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    let mut view = harness.view(Some(USER_TOKEN));
    seed_thread(&mut view, Thread::with_welcome("thread_1"));
    view.input = "Tell me a joke".to_string();

    let handle = view.submit_input().await;

    assert!(handle.is_none());
    let thread = view.current_thread().unwrap();
    assert_eq!(
        thread.messages,
        vec![
            Message::assistant(WELCOME_MESSAGE),
            Message::assistant(UPSELL_MESSAGE)
        ]
    );
    assert_eq!(view.quota, Some(0));
    assert!(view.input.is_empty());
    assert!(view.input_enabled);
}

#[tokio::test]
async fn test_quota_check_failure_shows_alert_and_sends_nothing() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path(harness.backend_path("/tokens")))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.api_path("/threads/thread_1/messages")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    let mut view = harness.view(Some(USER_TOKEN));
    seed_thread(&mut view, Thread::with_welcome("thread_1"));
    view.input = "hello".to_string();

    assert!(view.submit_input().await.is_none());

    let alert = view.alert.clone().expect("alert should be shown");
    assert!(alert.contains("remaining tokens"), "alert was {:?}", alert);
    assert_eq!(view.current_thread().unwrap().messages.len(), 1);
    assert_eq!(view.input, "hello");
}

#[tokio::test]
async fn test_send_streams_reply_and_records_usage() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path(harness.backend_path("/tokens")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"tokens": 10})))
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"threads": ["thread_1"]})),
        )
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.api_path("/threads/thread_1/messages")))
        .and(body_json(serde_json::json!({"role": "user", "content": "Say hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "msg_u"})))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.api_path("/threads/thread_1/runs")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(text_run(&["Hel", "lo!"], 7), "text/event-stream"),
        )
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.backend_path("/tokens/decrease")))
        .and(body_json(serde_json::json!({"utoken": USER_TOKEN, "decrement_by": 7})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    let mut view = harness.view(Some(USER_TOKEN));
    seed_thread(&mut view, Thread::with_welcome("thread_1"));
    view.input = "Say hello".to_string();

    let handle = view.submit_input().await.expect("run should start");
    assert!(!view.input_enabled);
    assert_eq!(view.current_thread().unwrap().last(), Some(&Message::user("Say hello")));

    handle.await.unwrap();

    // Input comes back only once usage has been recorded
    let mut rx = view.message_rx.take().unwrap();
    let mut received = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        received.push(msg);
    }
    view.message_rx = Some(rx);
    let quota_at = received
        .iter()
        .position(|m| matches!(m, AppMessage::QuotaUpdated(_)))
        .expect("quota update sent");
    let enabled_at = received
        .iter()
        .position(|m| matches!(m, AppMessage::InputEnabled(true)))
        .expect("input re-enabled");
    assert!(quota_at < enabled_at);
    for msg in received {
        view.handle_message(msg);
    }

    let thread = view.current_thread().unwrap();
    assert_eq!(thread.last(), Some(&Message::assistant("Hello!")));
    assert_eq!(thread.messages.len(), 3);
    assert!(view.input_enabled);
    assert_eq!(view.quota, Some(3));
    assert_eq!(view.status, None);

    // The streamed reply was persisted as it arrived
    let cached = harness.cache.messages("thread_1").unwrap().unwrap();
    assert_eq!(cached.last().map(|m| m.text.as_str()), Some("Hello!"));
}

#[tokio::test]
async fn test_switching_threads_restores_messages() {
    let harness = Harness::start().await;
    let mut view = harness.view(Some(USER_TOKEN));

    let first = Thread::from_history(
        "thread_1",
        vec![Message::user("first question"), Message::assistant("first answer")],
    );
    let second = Thread::from_history(
        "thread_2",
        vec![Message::user("second question"), Message::new(Role::Code, "print(1)")],
    );
    let original = first.messages.clone();

    seed_thread(&mut view, first);
    seed_thread(&mut view, second);
    assert_eq!(view.current_thread_id.as_deref(), Some("thread_2"));

    // Drop the in-memory copy; it must come back from the cache
    view.threads.retain(|t| t.id != "thread_1");
    assert!(view.select_thread("thread_1"));

    assert_eq!(view.current_thread().unwrap().messages, original);
    assert!(!view.select_thread("thread_unknown"));
}

#[tokio::test]
async fn test_load_with_no_threads_creates_welcome_thread() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"threads": []})))
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.api_path("/threads")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "thread_new", "object": "thread"})),
        )
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&harness.server)
        .await;

    let mut view = harness.view(Some(USER_TOKEN));
    view.load().await;

    assert!(!view.loading);
    assert_eq!(view.threads.len(), 1);
    assert_eq!(view.current_thread_id.as_deref(), Some("thread_new"));
    assert_eq!(
        view.current_thread().unwrap().messages,
        vec![Message::assistant(WELCOME_MESSAGE)]
    );
}

#[tokio::test]
async fn test_load_hydrates_registered_threads_in_order() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"threads": ["thread_b", "thread_a"]})),
        )
        .mount(&harness.server)
        .await;
    for (id, text) in [("thread_a", "from a"), ("thread_b", "from b")] {
        Mock::given(method("GET"))
            .and(path(harness.api_path(&format!("/threads/{}/messages", id))))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"role": "user", "content": [{"type": "text", "text": {"value": text}}]}
                ]
            })))
            .mount(&harness.server)
            .await;
    }

    let mut view = harness.view(Some(USER_TOKEN));
    view.load().await;

    let ids: Vec<&str> = view.threads.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["thread_b", "thread_a"]);
    assert_eq!(view.current_thread_id.as_deref(), Some("thread_b"));
    assert_eq!(
        view.current_thread().unwrap().messages,
        vec![Message::user("from b")]
    );
    assert_eq!(
        harness.cache.known_thread_ids().unwrap(),
        vec!["thread_b".to_string(), "thread_a".to_string()]
    );
}

#[tokio::test]
async fn test_identity_screen_blocks_until_token_submitted() {
    let harness = Harness::start().await;
    let mut view = harness.view(None);

    assert_eq!(view.screen(), Screen::IdentityRequired);
    // Chat shortcuts do nothing here
    assert_eq!(
        view.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)),
        Command::None
    );

    for c in "tok-42".chars() {
        assert_eq!(view.handle_key(key(KeyCode::Char(c))), Command::None);
    }
    assert_eq!(view.handle_key(key(KeyCode::Enter)), Command::SubmitToken);
    assert!(view.submit_token());

    assert_eq!(view.screen(), Screen::Chat);
    assert_eq!(view.user_token.as_deref(), Some("tok-42"));
    assert_eq!(harness.cache.user_token().unwrap(), Some("tok-42".to_string()));
}
