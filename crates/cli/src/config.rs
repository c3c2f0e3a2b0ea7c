// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use chatcart_client::ApiConfig;

/// Admin CLI for the Chatcart platform.
#[derive(Debug, Parser)]
#[command(name = "chatcart", version, about)]
pub struct Config {
    /// Base URL of the platform API.
    #[arg(long, env = "CHATCART_API_URL", default_value = "https://api.chatcart.app/v1")]
    pub api_url: String,

    /// Path to the credentials file. Defaults to the XDG state directory.
    #[arg(long, env = "CHATCART_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, env = "CHATCART_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log filter (tracing env-filter syntax).
    #[arg(long, env = "CHATCART_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log output format: pretty or json.
    #[arg(long, env = "CHATCART_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email and password
    Login {
        email: String,
        /// Password; read from stdin when omitted
        #[arg(long, env = "CHATCART_PASSWORD")]
        password: Option<String>,
    },
    /// Show session status
    Status,
    /// GET an API path and print the response
    Get { path: String },
    /// Log out and erase stored credentials
    Logout,
}

impl Config {
    pub fn credentials_path(&self) -> PathBuf {
        match self.credentials {
            Some(ref path) => path.clone(),
            None => default_credentials_path(),
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api_url.as_str())
            .timeout(Duration::from_secs(self.timeout_secs))
            .persist_path(self.credentials_path())
    }
}

/// Resolve the default credentials file location.
///
/// Checks `$XDG_STATE_HOME/chatcart`, then `$HOME/.local/state/chatcart`.
pub fn default_credentials_path() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("chatcart/credentials.json");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/chatcart/credentials.json");
    }
    PathBuf::from(".chatcart/credentials.json")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
