//! Error types for the gmc library.

use bytes::Bytes;
use thiserror::Error;

/// The main error type for gmc operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration record encoding/decoding error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The device answered with something other than the expected literal.
    #[error(
        "expected response {} but got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    ProtocolMismatch { expected: Bytes, actual: Bytes },

    /// The reply length does not match the declared fixed-width shape.
    #[error("response length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A reply that must be 7-bit ASCII contained a high byte.
    #[error("non-ASCII byte 0x{byte:02x} at position {position}")]
    Encoding { position: usize, byte: u8 },

    /// An access-point record carried an encryption code outside the known set.
    #[error("unknown encryption method code {code}")]
    UnknownEncryptionMethod { code: i64 },

    /// No byte arrived within the idle window where a reply was required.
    #[error("no response within {timeout_ms}ms")]
    ChannelTimeout { timeout_ms: u64 },

    /// Reply content could not be interpreted.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Date or time cannot be represented on the device clock.
    #[error("invalid date/time: {reason}")]
    InvalidDateTime { reason: String },

    /// A multi-step write stopped partway.
    #[error("stopped after {completed} of {total} steps: {source}")]
    Incomplete {
        completed: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,
}

/// Configuration record errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The record buffer is not the size of the layout.
    #[error("config record is {actual} bytes, layout {layout} needs {expected}")]
    LengthMismatch {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A value does not fit the declared width of its field.
    #[error("value for {field} needs {len} bytes but the field holds {width}")]
    FieldOverflow {
        field: &'static str,
        width: usize,
        len: usize,
    },

    /// No field with this name exists in the layout.
    #[error("unknown config field: {0}")]
    UnknownField(String),

    /// The supplied value has a different kind than the field.
    #[error("field {field} holds {expected} values")]
    KindMismatch {
        field: &'static str,
        expected: &'static str,
    },

    /// A text field contains bytes outside 7-bit ASCII.
    #[error("text field {field} is not ASCII")]
    NonAscii { field: &'static str },
}

/// Result type alias for gmc operations.
pub type Result<T> = std::result::Result<T, Error>;
