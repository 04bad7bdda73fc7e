//! # Upper Link Error Handling
//!
//! Every fallible operation in this crate returns [`UpperLinkResult`]. The
//! error kinds map one-to-one onto the failure modes of the protocol:
//!
//! | Variant | Raised by | Retried internally |
//! |---------|-----------|--------------------|
//! | `Format` | address parsing, before any I/O | never |
//! | `Connection` | connect (refused or past its deadline), peer close mid-response | never |
//! | `Timeout` | send or receive phase | never |
//! | `Protocol` | `E…` read response, non-`OK` write response | never |
//! | `NotSupported` | suffix/operation combination without an encoding | never |
//!
//! Two situations are deliberately *not* errors: an unparsable numeric token
//! in a multi-value read decodes as `0`, and a read that ends with a clean
//! zero-byte read yields `None`.
//!
//! ```rust
//! use voltage_upperlink::{UpperLinkError, UpperLinkResult};
//!
//! fn report(result: UpperLinkResult<Option<Vec<u16>>>) {
//!     match result {
//!         Ok(Some(words)) => println!("read {:?}", words),
//!         Ok(None) => println!("no response"),
//!         Err(UpperLinkError::Protocol { response, .. }) => {
//!             println!("device rejected the command: {}", response)
//!         }
//!         Err(e) if e.is_transport_error() => println!("reconnect and retry: {}", e),
//!         Err(e) => println!("fatal: {}", e),
//!     }
//! }
//! ```

use thiserror::Error;

/// Result type alias for Upper Link operations
pub type UpperLinkResult<T> = Result<T, UpperLinkError>;

/// Upper Link error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpperLinkError {
    /// Malformed address text (missing prefix, missing or invalid offset).
    #[error("Invalid address '{input}': {reason}")]
    Format { input: String, reason: String },

    /// The socket could not be established, or the peer closed the stream
    /// in the middle of a response.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// No response delimiter observed before the deadline.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    /// A well-formed response that signals failure.
    ///
    /// `response` carries the raw device text (e.g. `E1`).
    #[error("Protocol error: {message} (response: '{response}')")]
    Protocol { message: String, response: String },

    /// A recognized suffix/operation combination that has no encoding.
    #[error("Not supported: {message}")]
    NotSupported { message: String },

    /// Caller-supplied argument out of range (zero count, empty write).
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Client configuration issue (unparsable host/port, bad word order).
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl UpperLinkError {
    /// Create a new address format error
    pub fn format<I: Into<String>, R: Into<String>>(input: I, reason: R) -> Self {
        Self::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    ///
    /// # Arguments
    ///
    /// * `operation` - Description of the operation that timed out
    /// * `timeout_ms` - Timeout duration in milliseconds
    pub fn timeout<S: Into<String>>(operation: S, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a new protocol error carrying the raw device response
    pub fn protocol<M: Into<String>, R: Into<String>>(message: M, response: R) -> Self {
        Self::Protocol {
            message: message.into(),
            response: response.into(),
        }
    }

    /// Create a new not-supported error
    pub fn not_supported<S: Into<String>>(message: S) -> Self {
        Self::NotSupported {
            message: message.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if the error is a network/transport issue; the caller may
    /// reconnect and retry.
    ///
    /// ```rust
    /// use voltage_upperlink::UpperLinkError;
    ///
    /// assert!(UpperLinkError::timeout("read response", 5000).is_transport_error());
    /// assert!(!UpperLinkError::format("100", "missing area prefix").is_transport_error());
    /// ```
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    /// Check if the error was reported by the device or by response parsing
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}
