//! Shared error type across sockmux crates.

use thiserror::Error;

/// Stable error categories, usable in logs and by callers that only care about
/// the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport could not be established.
    Dial,
    /// Inbound packet could not be decoded.
    Decode,
    /// Packet arguments did not match the requested shape.
    InvalidArgs,
    /// Inbound frame kind is not supported (non-text).
    UnsupportedFrame,
    /// Outbound arguments could not be encoded.
    Serialization,
    /// Connection already closed.
    Closed,
    /// Transport I/O failure.
    Transport,
    /// Invalid configuration.
    Config,
}

impl ErrorKind {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Dial => "DIAL",
            ErrorKind::Decode => "DECODE",
            ErrorKind::InvalidArgs => "INVALID_ARGS",
            ErrorKind::UnsupportedFrame => "UNSUPPORTED_FRAME",
            ErrorKind::Serialization => "SERIALIZATION",
            ErrorKind::Closed => "CLOSED",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::Config => "CONFIG",
        }
    }
}

/// Why an inbound message could not be turned into a `Packet`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No packet type digit was read. Means "no packet", not malformed input.
    #[error("empty message")]
    Empty,
    #[error("invalid packet type: {0:?}")]
    InvalidType(char),
    #[error("invalid attachment count")]
    InvalidAttachments,
    #[error("invalid ack id")]
    InvalidAckId,
    #[error("missing body for {0} packet")]
    MissingBody(&'static str),
    #[error("invalid body: {0}")]
    InvalidBody(String),
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("dial failed: {0}")]
    Dial(String),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid args: {0}")]
    InvalidArgs(String),
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("connection closed")]
    Closed,
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Map to a stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Dial(_) => ErrorKind::Dial,
            Error::Decode(_) => ErrorKind::Decode,
            Error::InvalidArgs(_) => ErrorKind::InvalidArgs,
            Error::UnsupportedFrame(_) => ErrorKind::UnsupportedFrame,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Closed => ErrorKind::Closed,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the error ends the whole channel rather than a single message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Dial(_) | Error::UnsupportedFrame(_) | Error::Closed | Error::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_message_errors_are_not_fatal() {
        assert!(!Error::Decode(DecodeError::Empty).is_fatal());
        assert!(!Error::Serialization("x".into()).is_fatal());
        assert!(!Error::InvalidArgs("x".into()).is_fatal());
        assert!(Error::UnsupportedFrame("binary".into()).is_fatal());
        assert!(Error::Closed.is_fatal());
    }

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(Error::Closed.kind().as_str(), "CLOSED");
        assert_eq!(Error::from(DecodeError::InvalidAckId).kind().as_str(), "DECODE");
    }
}
