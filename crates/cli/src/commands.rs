// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

//! Command implementations: `chatcart login|status|get|logout`.

use std::io::{BufRead, Write};

use chatcart_client::{ApiRequest, AuthClient, Error, TokenPair};
use tracing::debug;

use crate::config::{Command, Config};

pub async fn run(config: Config) -> i32 {
    debug!(
        api_url = %config.api_url,
        credentials = %config.credentials_path().display(),
        "client configured"
    );
    let client = AuthClient::new(config.api_config());

    match config.command {
        Command::Login { ref email, ref password } => {
            login(&client, email, password.as_deref()).await
        }
        Command::Status => status(&client),
        Command::Get { ref path } => get(&client, path).await,
        Command::Logout => logout(&client),
    }
}

async fn login(client: &AuthClient, email: &str, password: Option<&str>) -> i32 {
    let password = match password {
        Some(p) => p.to_owned(),
        None => match prompt_password() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: failed to read password: {e}");
                return 2;
            }
        },
    };

    match client.login(email, &password).await {
        Ok(()) => {
            println!("Logged in as {email}.");
            0
        }
        Err(Error::InvalidCredentials) => {
            eprintln!("error: invalid email or password");
            1
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn status(client: &AuthClient) -> i32 {
    println!("{}", format_status(client.credentials().as_ref()));
    0
}

async fn get(client: &AuthClient, path: &str) -> i32 {
    let resp = match client.request(ApiRequest::get(normalize_path(path))).await {
        Ok(resp) => resp,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_terminal() {
                eprintln!("Session expired. Run `chatcart login` to sign in again.");
            }
            return 1;
        }
    };

    if !resp.is_success() {
        eprintln!("error: server returned {}", resp.status());
        return 1;
    }
    println!("{}", render_body(&resp.text()));
    0
}

fn logout(client: &AuthClient) -> i32 {
    client.logout();
    println!("Logged out.");
    0
}

fn prompt_password() -> std::io::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

/// API paths are rooted at the base URL; tolerate a missing leading slash.
fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

fn format_status(credentials: Option<&TokenPair>) -> String {
    match credentials {
        Some(pair) => {
            let refresh = if pair.refresh_token.is_some() { "present" } else { "absent" };
            format!("Logged in.\n  refresh token: {refresh}")
        }
        None => "Logged out.".to_owned(),
    }
}

/// Pretty-print JSON bodies; pass anything else through as-is.
fn render_body(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_owned()),
        Err(_) => text.to_owned(),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
