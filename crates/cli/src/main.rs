// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Chatcart, Inc.

use clap::Parser;

use chatcart::commands;
use chatcart::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_tracing(&config);
    let code = commands::run(config).await;
    std::process::exit(code);
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).init();
        }
    }
}
