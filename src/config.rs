//! # Client Configuration
//!
//! [`ClientConfig`] gathers everything a TCP client needs: the endpoint,
//! connect and command deadlines, the word order for 32-bit values and
//! per-device transfer limits.
//!
//! ```rust
//! use std::time::Duration;
//! use voltage_upperlink::{ClientConfig, WordOrder};
//!
//! let config = ClientConfig::from_address("192.168.0.10:8501")
//!     .unwrap()
//!     .with_timeout(Duration::from_millis(500))
//!     .with_word_order(WordOrder::HighWordFirst);
//!
//! assert_eq!(config.port, 8501);
//! ```

use std::time::Duration;

use crate::bytes::WordOrder;
use crate::constants::{MAX_READ_WORDS, MAX_WRITE_WORDS};
use crate::error::{UpperLinkError, UpperLinkResult};
use crate::{DEFAULT_TCP_PORT, DEFAULT_TIMEOUT_MS};

/// Default inter-request delay in milliseconds.
pub const DEFAULT_INTER_REQUEST_DELAY_MS: u64 = 0;

/// Device-specific transfer limits used by the batch operations.
///
/// # Example
///
/// ```rust
/// use voltage_upperlink::DeviceLimits;
///
/// let limits = DeviceLimits::new()
///     .with_max_read_words(64)
///     .with_inter_request_delay_ms(10);
///
/// assert_eq!(limits.read_request_count(200), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum words per `RDS` command.
    pub max_read_words: usize,
    /// Maximum words per `WRS` command.
    pub max_write_words: usize,
    /// Minimum delay between batch requests (milliseconds).
    pub inter_request_delay_ms: u64,
}

impl DeviceLimits {
    /// Create limits with protocol maximums.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits for older or slower units.
    pub fn conservative() -> Self {
        Self {
            max_read_words: 100,
            max_write_words: 100,
            inter_request_delay_ms: 10,
        }
    }

    /// Set maximum words per read; clamped to `1..=MAX_READ_WORDS`.
    pub fn with_max_read_words(mut self, count: usize) -> Self {
        self.max_read_words = count.clamp(1, MAX_READ_WORDS);
        self
    }

    /// Set maximum words per write; clamped to `1..=MAX_WRITE_WORDS`.
    pub fn with_max_write_words(mut self, count: usize) -> Self {
        self.max_write_words = count.clamp(1, MAX_WRITE_WORDS);
        self
    }

    pub fn with_inter_request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.inter_request_delay_ms = delay_ms;
        self
    }

    /// Number of read commands needed for `total_words`.
    pub fn read_request_count(&self, total_words: usize) -> usize {
        total_words.div_ceil(self.max_read_words)
    }

    /// Number of write commands needed for `total_words`.
    pub fn write_request_count(&self, total_words: usize) -> usize {
        total_words.div_ceil(self.max_write_words)
    }
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_read_words: MAX_READ_WORDS,
            max_write_words: MAX_WRITE_WORDS,
            inter_request_delay_ms: DEFAULT_INTER_REQUEST_DELAY_MS,
        }
    }
}

/// Connection and codec settings for a TCP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Host name or IP address of the PLC.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Deadline for establishing the connection.
    pub connect_timeout: Duration,
    /// Deadline for one command: lock wait, write and response.
    pub timeout: Duration,
    /// Placement of the halves of 32-bit values.
    pub word_order: WordOrder,
    /// Log every command and response line via `tracing`.
    pub packet_logging: bool,
    /// Limits for batch transfers.
    pub limits: DeviceLimits,
}

impl ClientConfig {
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Parse `host:port`; a bare host uses the default port.
    pub fn from_address(address: &str) -> UpperLinkResult<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(UpperLinkError::configuration("Invalid address: empty"));
        }

        match address.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    UpperLinkError::configuration(format!("Invalid port '{}': {}", port, e))
                })?;
                if host.is_empty() {
                    return Err(UpperLinkError::configuration("Invalid address: missing host"));
                }
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(address, DEFAULT_TCP_PORT)),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_word_order(mut self, order: WordOrder) -> Self {
        self.word_order = order;
        self
    }

    pub fn with_packet_logging(mut self, enabled: bool) -> Self {
        self.packet_logging = enabled;
        self
    }

    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// `host:port` as used for connecting.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_TCP_PORT,
            connect_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            word_order: WordOrder::default(),
            packet_logging: false,
            limits: DeviceLimits::default(),
        }
    }
}
