// File: crates/chart-core/src/error.rs
// Summary: Error types for decoding, transport and configuration.

use std::io;

/// Failure to turn a `data` payload into records.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("no schema registered for indicator `{0}`")]
    UnknownIndicator(String),
    #[error("payload is not valid base64")]
    Base64(#[from] base64::DecodeError),
    #[error("payload of {len} bytes is not a whole number of {row}-byte rows")]
    Truncated { len: usize, row: usize },
    #[error("row carries {got} values but schema `{schema}` has {want} fields")]
    FieldCount { schema: String, got: usize, want: usize },
}

/// Failure on the message channel to the series service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("channel is closed")]
    Closed,
    #[error("remote error: {0}")]
    Remote(String),
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("unexpected reply to `{topic}`: {detail}")]
    UnexpectedReply { topic: &'static str, detail: String },
}

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
