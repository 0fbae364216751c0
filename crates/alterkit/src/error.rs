use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database {name} has a non-numeric uid {uid:?}: {source}")]
    InvalidDatabaseUid {
        name: String,
        uid: String,
        source: std::num::ParseIntError,
    },

    #[error("failed to encode edit for database {database_id}: {message}")]
    Encode { database_id: i64, message: String },

    #[error("failed to decode edit response: {0}")]
    Decode(String),

    #[error("malformed edit response: missing {0}")]
    MalformedResponse(&'static str),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors from the HTTP channel.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
}
