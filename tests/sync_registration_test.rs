//! Thread registration and token metering against a wiremock backend.

mod common;

use common::{Harness, USER_TOKEN};

use assistant_chat::meter::QuotaDecision;
use assistant_chat::sync::SyncOutcome;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_unknown_thread_is_registered_once() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(harness.backend_path("/chat_threads")))
        .and(header("Authorization", USER_TOKEN))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"threads": ["A", "B"]})),
        )
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.backend_path("/chat_threads")))
        .and(body_partial_json(serde_json::json!({"thread_id": "C"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    let sync = &harness.services.sync;
    assert_eq!(
        sync.ensure_registered("C", USER_TOKEN).await,
        SyncOutcome::Registered
    );
    assert_eq!(
        harness.cache.known_thread_ids().unwrap(),
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    );

    // Now known locally: no further network traffic
    assert_eq!(
        sync.ensure_registered("C", USER_TOKEN).await,
        SyncOutcome::AlreadyKnownLocally
    );
}

#[tokio::test]
async fn test_registration_retries_transient_failure() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"threads": []})))
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&harness.server)
        .await;

    let outcome = harness.services.sync.ensure_registered("T", USER_TOKEN).await;

    assert_eq!(outcome, SyncOutcome::Registered);
}

#[tokio::test]
async fn test_registry_outage_reports_failure() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path(harness.backend_path("/chat_threads")))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&harness.server)
        .await;

    let outcome = harness.services.sync.ensure_registered("T", USER_TOKEN).await;

    assert!(matches!(outcome, SyncOutcome::Failed(reason) if reason.contains("down")));
    assert!(harness.cache.known_thread_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_meter_sends_fingerprint_and_token() {
    let harness = Harness::start().await;

    Mock::given(method("POST"))
        .and(path(harness.backend_path("/tokens")))
        .and(body_partial_json(serde_json::json!({"utoken": USER_TOKEN})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"tokens": 42})))
        .expect(1)
        .mount(&harness.server)
        .await;

    let decision = harness.services.meter.check(USER_TOKEN).await.unwrap();

    assert_eq!(decision, QuotaDecision::Allowed { remaining: 42 });
    assert_eq!(harness.services.meter.last_known(), Some(42));

    let requests = harness.server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(!body["fingerprint"].as_str().unwrap().is_empty());
}
