//! Behavior-driven tests for the request engine.
//!
//! These tests verify HOW one logical request behaves under rate limiting,
//! server failures, network flakiness, and version skew, using a scripted
//! transport and tokio's paused clock so retry delays are observable
//! without real waiting.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use trialkit_client::{
    ApiError, ApiRequest, ClientConfig, NoopVersionObserver, RequestEngine, Transport,
    TransportError, TransportResponse, CLIENT_VERSION, CLIENT_VERSION_HEADER,
};
use trialkit_tests::{
    engine_over, error_response, test_config, RecordingObserver, ScriptedTransport,
};

// =============================================================================
// Request Engine: Rate Limiting
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_rate_limited_with_retry_after_engine_waits_exactly_that_long_and_succeeds() {
    // Given: The server rate-limits once with a 2-second Retry-After hint
    let transport = Arc::new(ScriptedTransport::replying(vec![
        error_response(429, r#"{"message":"rate limited"}"#).with_header("retry-after", "2"),
        TransportResponse::ok_json(r#"{"status":"ok"}"#),
    ]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let started = tokio::time::Instant::now();
    let payload = engine
        .execute(&ApiRequest::get("/api/v1/tags/"))
        .await
        .expect("request should eventually succeed");

    // Then: Exactly one retry after exactly the hinted delay, and the
    // eventual success payload is returned unchanged
    assert_eq!(payload, json!({ "status": "ok" }));
    assert_eq!(transport.request_count(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn when_retries_exhaust_the_last_rate_limit_failure_surfaces_unchanged() {
    // Given: The server rate-limits on every attempt
    let limited = error_response(429, r#"{"message":"slow down","detail":"quota exhausted"}"#)
        .with_header("retry-after", "1");
    let transport = Arc::new(ScriptedTransport::replying(vec![
        limited.clone(),
        limited.clone(),
        limited,
    ]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let error = engine
        .execute(&ApiRequest::get("/api/v1/tags/"))
        .await
        .expect_err("budget exhaustion must surface the failure");

    // Then: All three attempts ran and the final error keeps its kind,
    // message, and detail
    assert_eq!(transport.request_count(), 3);
    assert!(matches!(error, ApiError::RateLimit { .. }));
    assert_eq!(error.to_string(), "slow down");
    assert_eq!(error.detail(), Some("quota exhausted"));
}

// =============================================================================
// Request Engine: Server Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_server_fails_three_times_engine_stops_at_the_attempt_budget() {
    // Given: The server answers 503 on every attempt and max_attempts is 3
    let transport = Arc::new(ScriptedTransport::replying(vec![
        error_response(503, r#"{"message":"maintenance"}"#),
        error_response(503, r#"{"message":"maintenance"}"#),
        error_response(503, r#"{"message":"maintenance"}"#),
    ]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let error = engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect_err("persistent 503 must fail");

    // Then: Exactly three attempts, and the failure preserves the status
    assert_eq!(transport.request_count(), 3);
    assert!(matches!(error, ApiError::Server { status: 503, .. }));
}

#[tokio::test(start_paused = true)]
async fn when_server_recovers_mid_budget_the_caller_sees_only_success() {
    // Given: One 502 followed by a healthy response
    let transport = Arc::new(ScriptedTransport::replying(vec![
        error_response(502, r#"{"message":"bad gateway"}"#),
        TransportResponse::ok_json(r#"{"recovered":true}"#),
    ]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let payload = engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect("second attempt succeeds");

    // Then: The transient failure is invisible to the caller
    assert_eq!(payload, json!({ "recovered": true }));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn when_server_returns_501_engine_does_not_retry() {
    // Given: 501 is a server error outside the retryable set
    let transport = Arc::new(ScriptedTransport::replying(vec![error_response(
        501,
        r#"{"message":"not implemented"}"#,
    )]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let error = engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect_err("must fail");

    // Then: A single attempt was made
    assert_eq!(transport.request_count(), 1);
    assert!(matches!(error, ApiError::Server { status: 501, .. }));
}

// =============================================================================
// Request Engine: Terminal Client Errors
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_request_is_invalid_engine_fails_immediately_without_retry() {
    let cases: [(u16, fn(&ApiError) -> bool); 4] = [
        (400, |e| matches!(e, ApiError::Validation { .. })),
        (401, |e| matches!(e, ApiError::Authentication { .. })),
        (403, |e| matches!(e, ApiError::Authorization { .. })),
        (404, |e| matches!(e, ApiError::NotFound { .. })),
    ];

    for (status, is_expected) in cases {
        // Given: A terminal client error status
        let transport = Arc::new(ScriptedTransport::replying(vec![error_response(
            status,
            r#"{"message":"nope"}"#,
        )]));
        let engine = engine_over(Arc::clone(&transport));

        // When: A request is executed
        let error = engine
            .execute(&ApiRequest::get("/api/v1/experiments/"))
            .await
            .expect_err("terminal status must fail");

        // Then: No retry happened and the kind matches the status
        assert_eq!(transport.request_count(), 1, "status {status} was retried");
        assert!(is_expected(&error), "status {status} misclassified");
    }
}

// =============================================================================
// Request Engine: Network Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_request_times_out_engine_retries_and_succeeds() {
    // Given: A timeout followed by a healthy response
    let transport = Arc::new(ScriptedTransport::new(vec![
        Err(TransportError::retryable("request timeout: deadline elapsed")),
        Ok(TransportResponse::ok_json("{}")),
    ]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let payload = engine.execute(&ApiRequest::get("/health")).await;

    // Then: The timeout was retried transparently
    assert!(payload.is_ok());
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn when_transport_fails_terminally_engine_wraps_it_without_retry() {
    // Given: A non-retryable transport failure
    let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::terminal(
        "invalid TLS certificate",
    ))]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let error = engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect_err("must fail");

    // Then: The original message is preserved in a generic network error
    assert_eq!(transport.request_count(), 1);
    match error {
        ApiError::Network { message, retryable } => {
            assert!(message.contains("invalid TLS certificate"));
            assert!(!retryable);
        }
        other => panic!("expected network error, got {other:?}"),
    }
}

// =============================================================================
// Request Engine: Payload Decoding
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_response_is_not_json_the_raw_text_is_wrapped() {
    // Given: A healthy response that is plain text
    let transport = Arc::new(ScriptedTransport::replying(vec![TransportResponse::new(
        200, "pong",
    )
    .with_header("content-type", "text/plain")]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request is executed
    let payload = engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect("plain text is a valid success");

    // Then: The body is wrapped in a single-field payload
    assert_eq!(payload, json!({ "message": "pong" }));
}

#[tokio::test(start_paused = true)]
async fn every_attempt_carries_auth_and_client_version_headers() {
    // Given: A server that rate-limits once
    let transport = Arc::new(ScriptedTransport::replying(vec![
        error_response(429, "{}").with_header("retry-after", "1"),
        TransportResponse::ok_json("{}"),
    ]));
    let engine = engine_over(Arc::clone(&transport));

    // When: A request with a body is executed
    let request = ApiRequest::post("/api/v1/tags/").with_body(json!({ "name": "memory" }));
    engine.execute(&request).await.expect("should succeed");

    // Then: Both attempts carried identical headers and body
    let attempts = transport.recorded_requests();
    assert_eq!(attempts.len(), 2);
    for attempt in &attempts {
        assert_eq!(attempt.header("authorization"), Some("Bearer test-key"));
        assert_eq!(attempt.header(CLIENT_VERSION_HEADER), Some(CLIENT_VERSION));
        assert_eq!(attempt.body.as_deref(), Some(r#"{"name":"memory"}"#));
    }
    assert_eq!(attempts[0], attempts[1]);
}

// =============================================================================
// Request Engine: Version Skew
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_server_version_is_incompatible_observer_is_warned_but_request_succeeds() {
    // Given: A healthy response from a much newer server
    let transport = Arc::new(ScriptedTransport::replying(vec![
        TransportResponse::ok_json(r#"{"status":"ok"}"#)
            .with_header("x-trialkit-api-version", "99.0.0"),
    ]));
    let observer = Arc::new(RecordingObserver::new());
    let engine = RequestEngine::new(
        &test_config(),
        Arc::clone(&transport) as Arc<dyn Transport>,
        observer.clone(),
    );

    // When: A request is executed
    let payload = engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect("version skew must never fail a request");

    // Then: The payload is intact and the observer saw a directional warning
    assert_eq!(payload, json!({ "status": "ok" }));
    let observations = observer.observations();
    assert_eq!(observations.len(), 1);
    let (client, server, warning) = &observations[0];
    assert_eq!(client, CLIENT_VERSION);
    assert_eq!(server, "99.0.0");
    let warning = warning.as_deref().expect("majors differ, warning expected");
    assert!(warning.contains("older than server"));
}

#[tokio::test(start_paused = true)]
async fn when_server_version_is_compatible_observer_sees_no_warning() {
    // Given: A server on the same major version
    let transport = Arc::new(ScriptedTransport::replying(vec![
        TransportResponse::ok_json("{}").with_header("x-trialkit-api-version", CLIENT_VERSION),
    ]));
    let observer = Arc::new(RecordingObserver::new());
    let engine = RequestEngine::new(
        &test_config(),
        Arc::clone(&transport) as Arc<dyn Transport>,
        observer.clone(),
    );

    // When: A request is executed
    engine
        .execute(&ApiRequest::get("/health"))
        .await
        .expect("should succeed");

    // Then: The observation carries no warning
    let observations = observer.observations();
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].2, None);
}

// =============================================================================
// Request Engine: Backoff Configuration
// =============================================================================

#[tokio::test(start_paused = true)]
async fn custom_attempt_budget_is_honored() {
    // Given: An engine allowed five attempts against a flaky server
    let transport = Arc::new(ScriptedTransport::replying(vec![
        error_response(503, "{}"),
        error_response(503, "{}"),
        error_response(503, "{}"),
        error_response(503, "{}"),
        TransportResponse::ok_json("{}"),
    ]));
    let config = ClientConfig::new("test-key")
        .with_base_url("https://lab.example.test")
        .with_max_attempts(5)
        .with_base_delay(Duration::from_millis(10));
    let engine = RequestEngine::new(
        &config,
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::new(NoopVersionObserver),
    );

    // When: A request is executed
    let payload = engine.execute(&ApiRequest::get("/health")).await;

    // Then: The fifth attempt succeeds
    assert!(payload.is_ok());
    assert_eq!(transport.request_count(), 5);
}
