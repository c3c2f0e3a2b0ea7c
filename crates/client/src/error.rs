// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

//! Client error taxonomy.
//!
//! Only one category ends a session: a refresh that fails or cannot be
//! attempted. Non-401 HTTP statuses are not errors at all; they ride back to
//! the caller inside [`ApiResponse`](crate::ApiResponse) untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure: no usable response was received. Never treated
    /// as an authentication failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Terminal authentication failure. The credential store has been cleared
    /// and a [`SessionEvent::Expired`](crate::SessionEvent) broadcast by the
    /// time the caller sees this.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    /// Login rejected by the server (wrong email or password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Non-2xx response on an auth endpoint (login) other than 401.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A response body that should have been JSON of a known shape wasn't.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error ended the authenticated session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}
