//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the loaded configuration (secrets excluded)

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config::{LoggingSettings, Settings};

/// Starts logging to the terminal and to the configured file.
///
/// The file is appended to, so restarts keep earlier history. Records from
/// the HTTP and Redis client crates are dropped unless the level is `Trace`.
///
/// # Errors
/// Fails if the file cannot be opened or a logger is already set.
pub fn init_logger(settings: &LoggingSettings) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", settings.file_path, e))?;

    let config = logger_config(settings.level);
    CombinedLogger::init(vec![
        TermLogger::new(settings.level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(settings.level, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

fn logger_config(level: LevelFilter) -> Config {
    let mut builder = ConfigBuilder::new();
    if level < LevelFilter::Trace {
        builder
            .add_filter_ignore_str("hyper")
            .add_filter_ignore_str("reqwest")
            .add_filter_ignore_str("redis");
    }
    builder.build()
}

/// Logs what the bot is about to connect to.
///
/// Tokens and passwords are never printed; only whether they are present.
pub fn log_startup_configuration(settings: &Settings) {
    log::info!("Elasticpath API: {}", settings.elasticpath.api_url);
    log::info!(
        "Elasticpath auth: {}",
        if settings.elasticpath.client_secret.is_some() {
            "client_credentials"
        } else {
            "implicit"
        }
    );
    log::info!(
        "Redis: {}:{} (db {}, password {})",
        settings.redis.host,
        settings.redis.port,
        settings.redis.db,
        if secrecy::ExposeSecret::expose_secret(&settings.redis.password).is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    match settings.redis.session_ttl {
        Some(ttl) => log::info!("Session TTL: {}s", ttl.as_secs()),
        None => log::info!("Session TTL: none (sessions never expire)"),
    }
    if let Some(ref url) = settings.bot_api_url {
        log::info!("Using custom Bot API URL: {}", url);
    }
}
