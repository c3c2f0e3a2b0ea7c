// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

//! Authenticated HTTP client for the Chatcart platform API.
//!
//! Every call goes through [`AuthClient::request`], which attaches the current
//! bearer token on the way out and drives a single-flight refresh on a 401 on
//! the way back. Callers never see the refresh cycle: a request either resolves
//! with the final response or rejects with a terminal error. Terminal auth
//! failures clear the [`CredentialStore`] and broadcast
//! [`SessionEvent::Expired`] so the host can send the user back to login.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod request;

pub use client::AuthClient;
pub use config::ApiConfig;
pub use credentials::{CredentialStore, TokenPair};
pub use error::Error;
pub use events::SessionEvent;
pub use request::{ApiRequest, ApiResponse};
