// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

//! The authenticated client: outbound token attachment, 401 detection, and
//! single-flight refresh with FIFO settlement of queued requests.
//!
//! The refresh window works without holding a lock across I/O: the first
//! request to hit a 401 flips `in_flight` and becomes the owner of the one
//! refresh call; every 401 that lands while the window is open parks a
//! oneshot waiter instead. When the refresh settles the owner drains the
//! queue in enqueue order: everyone gets the new token, or everyone gets
//! the same terminal error.

use std::collections::VecDeque;

use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::credentials::{CredentialStore, TokenPair};
use crate::error::Error;
use crate::events::SessionEvent;
use crate::request::{ApiRequest, ApiResponse};

/// Success body of `POST /auth/refresh` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Error body the platform attaches to non-2xx auth responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// One parked request waiting for the in-flight refresh to settle.
type Waiter = oneshot::Sender<Result<String, Error>>;

/// Refresh coordination state. Touched only inside short lock sections;
/// never held across an await.
#[derive(Default)]
struct RefreshGate {
    in_flight: bool,
    waiters: VecDeque<Waiter>,
}

/// Authenticated client for the platform API. One instance per process;
/// cheap to share behind an `Arc`.
pub struct AuthClient {
    config: ApiConfig,
    http: reqwest::Client,
    store: CredentialStore,
    gate: Mutex<RefreshGate>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl AuthClient {
    pub fn new(config: ApiConfig) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        let store = CredentialStore::new(config.persist_path.clone());
        Self { config, http, store, gate: Mutex::new(RefreshGate::default()), event_tx }
    }

    /// Subscribe to session events (refreshes, teardowns).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Current token pair, if logged in.
    pub fn credentials(&self) -> Option<TokenPair> {
        self.store.get()
    }

    /// Issue a request, transparently refreshing the session on a 401.
    ///
    /// Resolves with the final response (any status, including non-401
    /// errors, which are forwarded untouched). Rejects only on transport
    /// failure or terminal session expiry.
    pub async fn request(&self, req: ApiRequest) -> Result<ApiResponse, Error> {
        let token = self.store.access_token();
        let resp = self.execute(&req, token.as_deref()).await?;
        if req.skip_auth || resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        // First 401 for this request: join or own the refresh, then replay
        // exactly once. A 401 on the replay is final: the refreshed token
        // itself was rejected, so the session is unrecoverable.
        let token = self.fresh_token().await?;
        let resp = self.execute(&req, Some(&token)).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            let reason = "access token rejected after refresh".to_owned();
            self.teardown(&reason);
            return Err(Error::SessionExpired { reason });
        }
        Ok(resp)
    }

    pub async fn get(&self, path: impl Into<String>) -> Result<ApiResponse, Error> {
        self.request(ApiRequest::get(path)).await
    }

    pub async fn post(
        &self,
        path: impl Into<String>,
        body: serde_json::Value,
    ) -> Result<ApiResponse, Error> {
        self.request(ApiRequest::post(path).body(body)).await
    }

    pub async fn delete(&self, path: impl Into<String>) -> Result<ApiResponse, Error> {
        self.request(ApiRequest::delete(path)).await
    }

    /// Exchange email/password for a token pair and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), Error> {
        let req = ApiRequest::post("/auth/login")
            .body(serde_json::json!({ "email": email, "password": password }))
            .skip_auth();
        let resp = self.request(req).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidCredentials);
        }
        if !resp.is_success() {
            return Err(Error::Api {
                status: resp.status().as_u16(),
                message: error_message(&resp),
            });
        }

        let tokens: TokenResponse = resp.json()?;
        self.store.set(TokenPair {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        });
        info!("logged in");
        let _ = self.event_tx.send(SessionEvent::Refreshed);
        Ok(())
    }

    /// Install a token pair obtained out of band (e.g. an OAuth callback).
    pub fn seed(&self, pair: TokenPair) {
        self.store.set(pair);
        let _ = self.event_tx.send(SessionEvent::Refreshed);
    }

    /// End the session locally: erase stored credentials.
    pub fn logout(&self) {
        if self.store.clear() {
            info!("logged out");
            let _ = self.event_tx.send(SessionEvent::Expired { reason: "logged out".to_owned() });
        }
    }

    /// Send one request, attaching the bearer token unless the request opts
    /// out. A missing token is not an error; the server's 401 handles it.
    async fn execute(&self, req: &ApiRequest, token: Option<&str>) -> Result<ApiResponse, Error> {
        let url = format!("{}{}", self.config.base_url, req.path);
        let mut builder = self.http.request(req.method.clone(), &url);
        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }
        if !req.skip_auth {
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
        }
        let resp = builder.send().await?;
        ApiResponse::read(resp).await
    }

    /// Obtain a fresh access token, joining the in-flight refresh if one is
    /// already underway.
    async fn fresh_token(&self) -> Result<String, Error> {
        let rx = {
            let mut gate = self.gate.lock();
            if gate.in_flight {
                let (tx, rx) = oneshot::channel();
                gate.waiters.push_back(tx);
                Some(rx)
            } else {
                gate.in_flight = true;
                None
            }
        };

        match rx {
            Some(rx) => match rx.await {
                Ok(outcome) => outcome,
                // Owner dropped without settling (cancelled mid-refresh).
                Err(_) => Err(Error::SessionExpired { reason: "refresh abandoned".to_owned() }),
            },
            None => self.run_refresh().await,
        }
    }

    /// Owner path: perform the one refresh call, then settle every parked
    /// waiter in FIFO order with the outcome.
    async fn run_refresh(&self) -> Result<String, Error> {
        let outcome = self.refresh_once().await;

        let waiters = {
            let mut gate = self.gate.lock();
            gate.in_flight = false;
            std::mem::take(&mut gate.waiters)
        };

        match outcome {
            Ok(token) => {
                for tx in waiters {
                    let _ = tx.send(Ok(token.clone()));
                }
                Ok(token)
            }
            Err(reason) => {
                self.teardown(&reason);
                for tx in waiters {
                    let _ = tx.send(Err(Error::SessionExpired { reason: reason.clone() }));
                }
                Err(Error::SessionExpired { reason })
            }
        }
    }

    /// One refresh attempt. Never retried: an invalid refresh token would
    /// just loop. Every failure path is terminal and returns the reason.
    async fn refresh_once(&self) -> Result<String, String> {
        let Some(refresh_token) = self.store.refresh_token() else {
            return Err("no refresh token".to_owned());
        };

        debug!("access token rejected, refreshing session");
        let url = format!("{}/auth/refresh", self.config.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| format!("refresh request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("refresh rejected ({status})"));
        }

        let tokens: TokenResponse = resp
            .json()
            .await
            .map_err(|e| format!("malformed refresh response: {e}"))?;

        self.store.set(TokenPair {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token,
        });
        info!("session refreshed");
        let _ = self.event_tx.send(SessionEvent::Refreshed);
        Ok(tokens.access_token)
    }

    /// Terminal teardown: clear credentials and signal the host, exactly once
    /// even when several in-flight requests fail together.
    fn teardown(&self, reason: &str) {
        if self.store.clear() {
            warn!(reason, "session expired, credentials cleared");
            let _ = self.event_tx.send(SessionEvent::Expired { reason: reason.to_owned() });
        }
    }
}

/// Pull the platform's `{"message": ...}` out of an error body, if present.
fn error_message(resp: &ApiResponse) -> String {
    resp.json::<ApiErrorBody>()
        .map(|b| b.message)
        .unwrap_or_else(|_| "unknown error".to_owned())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
