mod common;

use std::time::Duration;

use common::{line_client, spawn_mock_line};
use tsundoku_backend::services::line_client::LineError;

#[tokio::test]
async fn test_authenticate_returns_profile() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_secs(5));

    let profile = client.authenticate("Bearer token-alice").await.unwrap();
    assert_eq!(profile.user_id, "U-alice");
    assert_eq!(profile.display_name, "Alice");
    assert_eq!(profile.picture_url.as_deref(), Some("https://profile.example/U-alice.png"));
    assert_eq!(profile.status_message.as_deref(), Some("reading"));
}

#[tokio::test]
async fn test_rejected_token_stops_before_profile() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_secs(5));

    let result = client.authenticate("Bearer token-nobody").await;
    assert!(matches!(result, Err(LineError::Rejected(_))));
    assert_eq!(line.calls.verify_count(), 1);
    assert_eq!(line.calls.profile_count(), 0);
}

#[tokio::test]
async fn test_verify_checks_channel_and_expiry() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_secs(5));

    assert!(matches!(
        client.verify_access_token("token-other-channel").await,
        Err(LineError::Rejected(_))
    ));
    assert!(matches!(
        client.verify_access_token("token-expired").await,
        Err(LineError::Rejected(_))
    ));
    let verified = client.verify_access_token("token-bob").await.unwrap();
    assert_eq!(verified.client_id, common::CHANNEL_ID);
    assert_eq!(verified.scope, "profile");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_secs(5));
    assert!(matches!(
        client.authenticate("Bearer token-flaky").await,
        Err(LineError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_responses() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_secs(5));
    assert!(matches!(
        client.verify_access_token("token-garbage-verify").await,
        Err(LineError::BadResponse(_))
    ));
    assert!(matches!(
        client.authenticate("Bearer token-broken-profile").await,
        Err(LineError::BadResponse(_))
    ));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_millis(300));

    let started = std::time::Instant::now();
    let result = client.authenticate("Bearer token-slow").await;
    assert!(matches!(result, Err(LineError::Unavailable(ref msg)) if msg.contains("timed out")));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_revoke_sends_channel_credentials() {
    let line = spawn_mock_line().await;
    let client = line_client(&line.base_url, Duration::from_secs(5));
    client.revoke("Bearer token-alice").await.unwrap();
    assert_eq!(line.calls.revoke_count(), 1);

    let wrong_secret = tsundoku_backend::services::LineClient::new(
        &line.base_url,
        common::CHANNEL_ID,
        "wrong",
        Duration::from_secs(5),
    )
    .unwrap();
    assert!(matches!(
        wrong_secret.revoke("Bearer token-alice").await,
        Err(LineError::Rejected(_))
    ));
}
