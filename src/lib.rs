//! # Voltage Upper Link - Async PLC Memory Access over TCP
//!
//! **Author:** Evan Liu <liuyifanz.1996@gmail.com>
//! **Version:** 0.1.0
//! **License:** MIT
//!
//! A client for the ASCII "Upper Link" protocol spoken by many PLCs: one
//! text command per line, one text response per line, over a plain TCP
//! socket.
//!
//! ## Features
//!
//! - **Async**: built on Tokio, safe to share one client between tasks
//! - **Single-flight**: at most one command outstanding per connection
//! - **Typed access**: 16-bit, 32-bit, float and packed ASCII values
//! - **Configurable word order** for 32-bit values
//! - **Built-in Monitoring**: transport statistics and packet logging
//!
//! ## Commands
//!
//! | Command | Wire form | Response |
//! |---------|-----------|----------|
//! | Read one word | `RD DM100` | `<v>` |
//! | Read words | `RDS DM100 <n>` | `<v1> … <vn>` |
//! | Write one word | `WR DM100 <v>` | `OK` |
//! | Write words | `WRS DM100 <n> <v1> … <vn>` | `OK` |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voltage_upperlink::{UpperLinkTcpClient, UpperLinkClient, UpperLinkResult};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> UpperLinkResult<()> {
//!     let client = UpperLinkTcpClient::from_address("127.0.0.1:8501", Duration::from_secs(5)).await?;
//!
//!     let values = client.read_words("DM0", 10).await?;
//!     println!("Read words: {:?}", values);
//!
//!     client.write_words("DM100", &[0x1234]).await?;
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Core error types and result handling
pub mod error;

/// Protocol constants: mnemonics, terminators, limits
pub mod constants;

/// Address text parsing (`DM100.H`)
pub mod address;

/// Command text building and response interpretation
pub mod command;

/// Network transport layer
pub mod transport;

/// Upper Link client implementations
pub mod client;

/// Client configuration and device limits
pub mod config;

/// Logging system for the library
pub mod logging;

// ============================================================================
// Data handling
// ============================================================================

/// Typed PLC values
pub mod value;

/// Word order handling for 32-bit values
pub mod bytes;

/// Encoding and decoding of words, numbers and strings
pub mod codec;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use voltage_upperlink::tokio) ===
pub use tokio;

// === Core client API ===
pub use client::{GenericUpperLinkClient, UpperLinkClient, UpperLinkTcpClient};

// === Error handling ===
pub use error::{UpperLinkError, UpperLinkResult};

// === Core types ===
pub use address::{Address, DataSuffix, WordKind};
pub use crate::bytes::WordOrder;
pub use command::Command;
pub use value::PlcValue;

// === Codec ===
pub use codec::{string_to_words, words_to_string, WordCodec};

// === Configuration ===
pub use config::{ClientConfig, DeviceLimits};

// === Monitoring ===
pub use transport::{TcpTransport, TransportStats, UpperLinkTransport};

// === Protocol limits (commonly needed constants) ===
pub use constants::{MAX_READ_WORDS, MAX_WRITE_WORDS};

// === Logging ===
pub use logging::{CallbackLogger, LogCallback, LogLevel, LoggingMode};

/// Default timeout for connect and per-command deadlines (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default Upper Link TCP port
pub const DEFAULT_TCP_PORT: u16 = 8501;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!(
        "Voltage Upper Link v{} - Async PLC memory access by Evan Liu",
        VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let info = info();
        assert!(info.contains("Voltage Upper Link"));
        assert!(info.contains(VERSION));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_TCP_PORT, 8501);
        assert_eq!(DEFAULT_TIMEOUT_MS, 5000);
        let config = ClientConfig::default();
        assert_eq!(config.port, DEFAULT_TCP_PORT);
    }
}
