//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Persistence failure when interacting with `SQLite`.
    Db(String),
    /// Slack API or message delivery failure.
    Slack(String),
    /// URL recognized but the request number is missing or malformed.
    InvalidUrl(String),
    /// URL matches neither the GitLab nor the GitHub review-request shape.
    UnsupportedHost(String),
    /// The same review request is already queued in this channel.
    DuplicateTask(String),
    /// Requested task or reminder configuration does not exist.
    NotFound(String),
    /// Cron expression is syntactically malformed.
    InvalidCronSyntax(String),
    /// Cron field value lies outside its valid range.
    InvalidCronField(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::Slack(msg) => write!(f, "slack: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            Self::UnsupportedHost(msg) => write!(f, "unsupported host: {msg}"),
            Self::DuplicateTask(msg) => write!(f, "duplicate task: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::InvalidCronSyntax(msg) => write!(f, "invalid cron syntax: {msg}"),
            Self::InvalidCronField(msg) => write!(f, "invalid cron field: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}
