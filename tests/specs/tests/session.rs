// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

//! End-to-end session scenarios: login, silent refresh under expiry, and
//! terminal teardown, driven through the public client API against the mock
//! platform.

use chatcart_client::{ApiConfig, AuthClient, Error, SessionEvent};
use chatcart_specs::{MockPlatform, ADMIN_EMAIL, ADMIN_PASSWORD};
use futures_util::future::join_all;

fn client_for(platform: &MockPlatform, persist: Option<&std::path::Path>) -> AuthClient {
    let mut config = ApiConfig::new(platform.base_url());
    if let Some(path) = persist {
        config = config.persist_path(path);
    }
    AuthClient::new(config)
}

#[tokio::test]
async fn session_survives_access_token_expiry() -> anyhow::Result<()> {
    let platform = MockPlatform::start().await?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("credentials.json");
    let client = client_for(&platform, Some(&path));

    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    let resp = client.get("/api/products").await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(platform.refresh_calls(), 0);

    let mut events = client.subscribe();
    platform.expire_access_token();

    // The caller sees a plain success; the refresh happened underneath.
    let resp = client.get("/api/products").await?;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(platform.refresh_calls(), 1);
    assert!(matches!(events.recv().await, Ok(SessionEvent::Refreshed)));

    // The rotated pair reached the store and the file on disk.
    let contents = std::fs::read_to_string(&path)?;
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    assert_eq!(json["token"], platform.current_access_token());

    Ok(())
}

#[tokio::test]
async fn concurrent_expiry_is_absorbed_by_one_refresh() -> anyhow::Result<()> {
    let platform = MockPlatform::start().await?;
    let client = client_for(&platform, None);

    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    platform.expire_access_token();

    let results = join_all([
        client.get("/api/products"),
        client.get("/api/customers"),
        client.get("/api/products"),
    ])
    .await;
    for resp in results {
        assert_eq!(resp?.status().as_u16(), 200);
    }
    assert_eq!(platform.refresh_calls(), 1);

    Ok(())
}

#[tokio::test]
async fn revoked_refresh_token_tears_the_session_down() -> anyhow::Result<()> {
    let platform = MockPlatform::start().await?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("credentials.json");
    let client = client_for(&platform, Some(&path));

    client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    let mut events = client.subscribe();
    platform.expire_access_token();
    platform.revoke_refresh_token();

    let err = client.get("/api/products").await.err();
    assert!(matches!(err, Some(Error::SessionExpired { .. })));
    assert_eq!(platform.refresh_calls(), 1);
    assert!(matches!(events.recv().await, Ok(SessionEvent::Expired { .. })));
    assert!(client.credentials().is_none());
    assert!(!path.exists());

    // Logged out now: the next request fails without touching the refresh
    // endpoint again.
    let err = client.get("/api/products").await.err();
    assert!(matches!(err, Some(Error::SessionExpired { .. })));
    assert_eq!(platform.refresh_calls(), 1);

    Ok(())
}

#[tokio::test]
async fn fresh_visitor_is_rejected_without_a_refresh_attempt() -> anyhow::Result<()> {
    let platform = MockPlatform::start().await?;
    let client = client_for(&platform, None);

    let err = client.get("/api/customers").await.err();
    assert!(matches!(err, Some(Error::SessionExpired { .. })));
    assert_eq!(platform.refresh_calls(), 0);

    Ok(())
}

#[tokio::test]
async fn wrong_password_is_not_a_session_error() -> anyhow::Result<()> {
    let platform = MockPlatform::start().await?;
    let client = client_for(&platform, None);

    let err = client.login(ADMIN_EMAIL, "not-sesame").await.err();
    assert!(matches!(err, Some(Error::InvalidCredentials)));
    assert_eq!(platform.refresh_calls(), 0);
    assert!(client.credentials().is_none());

    Ok(())
}
