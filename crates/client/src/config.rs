// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

use std::path::PathBuf;
use std::time::Duration;

/// Default transport timeout. Also bounds the refresh call itself, so a
/// hanging refresh endpoint cannot strand queued requests forever.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`AuthClient`](crate::AuthClient).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the platform API, without a trailing slash
    /// (e.g. `https://api.chatcart.app/v1`).
    pub base_url: String,
    /// Timeout applied to every request, including the refresh call.
    pub timeout: Duration,
    /// Where to persist the token pair. `None` keeps credentials in memory
    /// only.
    pub persist_path: Option<PathBuf>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, timeout: DEFAULT_TIMEOUT, persist_path: None }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
