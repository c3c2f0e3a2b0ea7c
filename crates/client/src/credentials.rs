// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

//! Credential storage: in-memory token pair with optional JSON file
//! persistence (atomic write: tmp + rename).
//!
//! The store is a pass-through. It never validates tokens, checks expiry, or
//! encrypts anything; validity is discovered lazily when the server rejects
//! a request. Reads are synchronous and immediately reflect the most recent
//! `set`/`clear`.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The access/refresh token pair for the current session.
///
/// `refresh_token` can be absent: some grants hand out a bare access token,
/// and a session in that state ends at the first 401 with no refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// On-disk schema. Field names are the platform's storage keys.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedTokens {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Process-wide credential store backing [`AuthClient`](crate::AuthClient).
pub struct CredentialStore {
    tokens: RwLock<Option<TokenPair>>,
    persist_path: Option<PathBuf>,
}

impl CredentialStore {
    /// Create a store, loading any persisted pair from `persist_path`.
    ///
    /// A missing file is the logged-out state. An unreadable file is treated
    /// the same, with a warning, never a hard failure.
    pub fn new(persist_path: Option<PathBuf>) -> Self {
        let tokens = persist_path.as_deref().and_then(load);
        Self { tokens: RwLock::new(tokens), persist_path }
    }

    pub fn get(&self) -> Option<TokenPair> {
        self.tokens.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().as_ref().map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.read().as_ref().and_then(|t| t.refresh_token.clone())
    }

    /// Replace the stored pair. Last writer wins.
    pub fn set(&self, pair: TokenPair) {
        if let Some(ref path) = self.persist_path {
            save(path, &pair);
        }
        *self.tokens.write() = Some(pair);
    }

    /// Erase the stored pair and the persisted file.
    ///
    /// Returns whether credentials were actually present, so callers can make
    /// session teardown side effects fire exactly once even when several
    /// in-flight requests fail together.
    pub fn clear(&self) -> bool {
        let had = self.tokens.write().take().is_some();
        if had {
            if let Some(ref path) = self.persist_path {
                if let Err(e) = std::fs::remove_file(path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %path.display(), "failed to remove credentials file: {e}");
                    }
                }
            }
        }
        had
    }
}

/// Load a persisted pair from a JSON file.
fn load(path: &Path) -> Option<TokenPair> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), "no persisted credentials: {e}");
            return None;
        }
    };
    match serde_json::from_str::<PersistedTokens>(&contents) {
        Ok(p) => Some(TokenPair { access_token: p.token, refresh_token: p.refresh_token }),
        Err(e) => {
            warn!(path = %path.display(), "failed to parse persisted credentials: {e}");
            None
        }
    }
}

/// Save a pair to a JSON file atomically (write tmp + rename).
fn save(path: &Path, pair: &TokenPair) {
    let persisted = PersistedTokens {
        token: pair.access_token.clone(),
        refresh_token: pair.refresh_token.clone(),
    };
    let json = match serde_json::to_string_pretty(&persisted) {
        Ok(j) => j,
        Err(e) => {
            warn!("failed to serialize credentials: {e}");
            return;
        }
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let tmp = path.with_extension("tmp");
    if let Err(e) = std::fs::write(&tmp, &json) {
        warn!(path = %tmp.display(), "failed to write credentials: {e}");
        return;
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        warn!(path = %path.display(), "failed to rename credentials file: {e}");
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
