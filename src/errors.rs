//! Typed error hierarchy for the box factory.
//!
//! Three top-level enums cover the three subsystems:
//! - `ConfigError` — environment and connection-string parsing failures
//! - `StoreError` — storage layer failures (Postgres or in-memory)
//! - `WebDriverError` — browser session failures in the UI harness
//!
//! The HTTP probe and the fixture surface failures as `anyhow` chains
//! instead: every failure there is fatal and only the message matters.

use thiserror::Error;

/// Errors from environment and connection-string handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {name} is not set")]
    MissingEnv { name: String },

    #[error("Malformed connection string: {reason}")]
    MalformedConnectionString { reason: String },

    #[error("Invalid port '{value}' in connection string")]
    InvalidPort { value: String },
}

/// Errors from the box storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database unreachable at {host}:{port}: {source}")]
    Unreachable {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Errors from the WebDriver client used by the UI flow.
///
/// `NoSuchElement` is split out because visibility polling must treat
/// "not on the page" as an answer, not a transport failure.
#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("No element matches '{selector}'")]
    NoSuchElement { selector: String },

    #[error("WebDriver session error: {message}")]
    Session { message: String },

    #[error("Unexpected WebDriver response: {message}")]
    Protocol { message: String },

    #[error("WebDriver request failed: {0}")]
    Http(#[from] reqwest::Error),
}
