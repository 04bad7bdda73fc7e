//! High-level Upper Link client implementations
//!
//! Every typed operation follows the same path: parse the address text,
//! build the command line, send it over the transport, interpret the
//! response. The parsing and interpretation live in [`GenericUpperLinkClient`]
//! so any [`UpperLinkTransport`] can be plugged in; [`UpperLinkTcpClient`] is
//! the ready-made TCP variant.
//!
//! # Operations
//!
//! | Method | Words | Commands |
//! |--------|-------|----------|
//! | `read_words` | 1..=1000 | `RD` / `RDS` |
//! | `write_words` | 1..=1000 | `WR` / `WRS` |
//! | `read_i32` / `write_i32` | 2 | `RDS` / `WRS` |
//! | `read_f32` / `write_f32` | 2 | `RDS` / `WRS` |
//! | `read_string` / `write_string` | ⌈len/2⌉ | any |
//! | `read_any` / `write_any` | by suffix | any |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voltage_upperlink::{UpperLinkClient, UpperLinkResult, UpperLinkTcpClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> UpperLinkResult<()> {
//!     let client = UpperLinkTcpClient::from_address("192.168.0.10:8501", Duration::from_secs(5)).await?;
//!
//!     let words = client.read_words("DM100", 4).await?;
//!     println!("DM100..DM103: {:?}", words);
//!
//!     client.write_i32("DM200", -42).await?;
//!     println!("DM300.H = {}", client.read_any("DM300.H").await?);
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::address::Address;
use crate::bytes::WordOrder;
use crate::codec::{string_to_words, words_to_string, WordCodec};
use crate::command::{check_write_response, parse_read_response, Command};
use crate::config::{ClientConfig, DeviceLimits};
use crate::constants::{MAX_READ_WORDS, MAX_WRITE_WORDS};
use crate::error::{UpperLinkError, UpperLinkResult};
use crate::logging::CallbackLogger;
use crate::transport::{TcpTransport, TransportStats, UpperLinkTransport};
use crate::value::PlcValue;

/// Trait defining the interface for Upper Link client operations.
///
/// Addresses are plain text such as `DM100`, `R5` or `DM10.D`; malformed text
/// fails with `UpperLinkError::Format` before anything is sent.
///
/// # Implemented By
///
/// - [`UpperLinkTcpClient`] - TCP client
/// - [`GenericUpperLinkClient`] - generic client for custom transports
pub trait UpperLinkClient: Send + Sync {
    /// Read `count` consecutive words starting at `address`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - the device sent nothing (blank line or clean close)
    /// * `Ok(Some(words))` - at most `count` words; a short response yields
    ///   fewer
    ///
    /// # Errors
    ///
    /// `Protocol` when the device answers with an error code such as `E1`.
    fn read_words(
        &self,
        address: &str,
        count: usize,
    ) -> impl Future<Output = UpperLinkResult<Option<Vec<u16>>>> + Send;

    /// Write consecutive words starting at `address`.
    ///
    /// Succeeds only when the device answers exactly `OK`.
    fn write_words(
        &self,
        address: &str,
        values: &[u16],
    ) -> impl Future<Output = UpperLinkResult<()>> + Send;

    /// Codec used for 32-bit values.
    fn codec(&self) -> WordCodec;

    /// Check if client is connected
    fn is_connected(&self) -> bool;

    /// Close the client connection
    fn close(&self) -> impl Future<Output = UpperLinkResult<()>> + Send;

    /// Get transport statistics
    fn get_stats(&self) -> TransportStats;

    /// Read a signed 32-bit value from two words at `address`.
    fn read_i32(&self, address: &str) -> impl Future<Output = UpperLinkResult<i32>> + Send
    where
        Self: Sized,
    {
        async move {
            let words = read_word_pair(self, address).await?;
            Ok(self.codec().words_to_i32(&words))
        }
    }

    /// Write a signed 32-bit value to two words at `address`.
    fn write_i32(
        &self,
        address: &str,
        value: i32,
    ) -> impl Future<Output = UpperLinkResult<()>> + Send
    where
        Self: Sized,
    {
        async move {
            let words = self.codec().i32_to_words(value);
            self.write_words(address, &words).await
        }
    }

    /// Read an IEEE-754 float from two words at `address`.
    fn read_f32(&self, address: &str) -> impl Future<Output = UpperLinkResult<f32>> + Send
    where
        Self: Sized,
    {
        async move {
            let words = read_word_pair(self, address).await?;
            Ok(self.codec().words_to_f32(&words))
        }
    }

    /// Write an IEEE-754 float to two words at `address`.
    fn write_f32(
        &self,
        address: &str,
        value: f32,
    ) -> impl Future<Output = UpperLinkResult<()>> + Send
    where
        Self: Sized,
    {
        async move {
            let words = self.codec().f32_to_words(value);
            self.write_words(address, &words).await
        }
    }

    /// Read up to `length_bytes` characters of packed ASCII.
    ///
    /// Reads `⌈length_bytes / 2⌉` words. Decoding stops at the first NUL byte.
    /// A zero length returns an empty string without any I/O. Strings longer
    /// than one command can carry are read in consecutive chunks.
    fn read_string(
        &self,
        address: &str,
        length_bytes: usize,
    ) -> impl Future<Output = UpperLinkResult<String>> + Send
    where
        Self: Sized,
    {
        async move {
            if length_bytes == 0 {
                return Ok(String::new());
            }

            let count = length_bytes.div_ceil(2);
            if count > MAX_READ_WORDS {
                let words = self
                    .read_words_batch(address, count, &DeviceLimits::default())
                    .await?;
                return Ok(words_to_string(&words, length_bytes));
            }

            match self.read_words(address, count).await? {
                Some(words) => Ok(words_to_string(&words, length_bytes)),
                None => Err(UpperLinkError::protocol(
                    format!("no data returned for string at {}", address),
                    "",
                )),
            }
        }
    }

    /// Write `text` as packed ASCII, high byte first.
    ///
    /// An odd-length string has its last word zero-padded; an empty string
    /// writes a single zero word. Strings longer than one command can carry
    /// are written in consecutive chunks.
    fn write_string(
        &self,
        address: &str,
        text: &str,
    ) -> impl Future<Output = UpperLinkResult<()>> + Send
    where
        Self: Sized,
    {
        async move {
            let words = string_to_words(text);
            if words.len() > MAX_WRITE_WORDS {
                return self
                    .write_words_batch(address, &words, &DeviceLimits::default())
                    .await;
            }
            self.write_words(address, &words).await
        }
    }

    /// Read according to the address suffix and render the value as text.
    ///
    /// | Suffix | Rendering |
    /// |--------|-----------|
    /// | none, `.U` | unsigned decimal |
    /// | `.S` | signed decimal |
    /// | `.H` | 4 upper-case hex digits |
    /// | `.D`, `.L` | signed 32-bit decimal |
    fn read_any(&self, address: &str) -> impl Future<Output = UpperLinkResult<String>> + Send
    where
        Self: Sized,
    {
        async move {
            let suffix = Address::parse(address)?.suffix();
            let words = read_exact(self, address, suffix.word_count()).await?;
            let value = self.codec().decode(&words, suffix)?;
            Ok(value.to_string())
        }
    }

    /// Write a typed value according to the address suffix.
    ///
    /// # Errors
    ///
    /// `NotSupported` when the value has no encoding for the suffix, e.g. a
    /// float to a `.H` address.
    fn write_any(
        &self,
        address: &str,
        value: PlcValue,
    ) -> impl Future<Output = UpperLinkResult<()>> + Send
    where
        Self: Sized,
    {
        async move {
            let suffix = Address::parse(address)?.suffix();
            let words = self.codec().encode(&value, suffix)?;
            self.write_words(address, &words).await
        }
    }

    /// Read a large range of words with automatic chunking.
    ///
    /// The range is split into commands of at most `limits.max_read_words`,
    /// advancing the offset after each chunk. The first failing chunk aborts
    /// the batch.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use voltage_upperlink::{UpperLinkTcpClient, UpperLinkClient, DeviceLimits};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> voltage_upperlink::UpperLinkResult<()> {
    /// let client = UpperLinkTcpClient::from_address("127.0.0.1:8501", Duration::from_secs(5)).await?;
    /// let limits = DeviceLimits::new().with_max_read_words(200);
    ///
    /// // Five RDS commands of 200 words each
    /// let words = client.read_words_batch("DM0", 1000, &limits).await?;
    /// # Ok(())
    /// # }
    /// ```
    fn read_words_batch(
        &self,
        address: &str,
        count: usize,
        limits: &DeviceLimits,
    ) -> impl Future<Output = UpperLinkResult<Vec<u16>>> + Send
    where
        Self: Sized,
    {
        let max_read_words = limits.max_read_words.max(1);
        let inter_request_delay_ms = limits.inter_request_delay_ms;
        async move {
            if count == 0 {
                return Ok(Vec::new());
            }

            let start = Address::parse(address)?;
            let mut result = Vec::with_capacity(count);
            let mut offset = start.offset();
            let mut remaining = count;

            while remaining > 0 {
                let chunk_len = remaining.min(max_read_words);
                let chunk_address = start.with_offset(offset).to_string();
                let chunk = self
                    .read_words(&chunk_address, chunk_len)
                    .await?
                    .ok_or_else(|| {
                        UpperLinkError::protocol(
                            format!("no data returned for chunk at {}", chunk_address),
                            "",
                        )
                    })?;
                result.extend_from_slice(&chunk);

                remaining -= chunk_len;
                if remaining > 0 {
                    offset = advance(offset, chunk_len)?;
                    if inter_request_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
                    }
                }
            }

            Ok(result)
        }
    }

    /// Write a large block of words with automatic chunking.
    ///
    /// Chunks of at most `limits.max_write_words` are written in order; the
    /// first rejected chunk aborts the batch, leaving earlier chunks written.
    fn write_words_batch(
        &self,
        address: &str,
        values: &[u16],
        limits: &DeviceLimits,
    ) -> impl Future<Output = UpperLinkResult<()>> + Send
    where
        Self: Sized,
    {
        let max_write_words = limits.max_write_words.max(1);
        let inter_request_delay_ms = limits.inter_request_delay_ms;
        async move {
            let start = Address::parse(address)?;
            let mut offset = start.offset();
            let mut chunks = values.chunks(max_write_words).peekable();

            while let Some(chunk) = chunks.next() {
                let chunk_address = start.with_offset(offset).to_string();
                self.write_words(&chunk_address, chunk).await?;

                if chunks.peek().is_some() {
                    offset = advance(offset, chunk.len())?;
                    if inter_request_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
                    }
                }
            }

            Ok(())
        }
    }
}

fn advance(offset: u32, by: usize) -> UpperLinkResult<u32> {
    u32::try_from(by)
        .ok()
        .and_then(|by| offset.checked_add(by))
        .ok_or_else(|| UpperLinkError::invalid_data(format!("offset overflow past {}", offset)))
}

/// Read exactly `count` words or fail with "insufficient data".
async fn read_exact<C: UpperLinkClient>(
    client: &C,
    address: &str,
    count: usize,
) -> UpperLinkResult<Vec<u16>> {
    let words = client.read_words(address, count).await?.unwrap_or_default();
    if words.len() < count {
        return Err(UpperLinkError::protocol(
            format!(
                "insufficient data at {}: expected {} word(s), got {}",
                address,
                count,
                words.len()
            ),
            words
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        ));
    }
    Ok(words)
}

async fn read_word_pair<C: UpperLinkClient>(client: &C, address: &str) -> UpperLinkResult<[u16; 2]> {
    let words = read_exact(client, address, 2).await?;
    Ok([words[0], words[1]])
}

/// Generic Upper Link client that works with any transport
///
/// Holds the command building and response interpretation; the transport
/// only moves lines.
pub struct GenericUpperLinkClient<T: UpperLinkTransport> {
    transport: T,
    codec: WordCodec,
    logger: Option<CallbackLogger>,
}

impl<T: UpperLinkTransport> GenericUpperLinkClient<T> {
    /// Create a new generic client with the specified transport
    pub fn new(transport: T, word_order: WordOrder) -> Self {
        Self {
            transport,
            codec: WordCodec::new(word_order),
            logger: None,
        }
    }

    /// Create a new generic client with logging
    pub fn with_logger(transport: T, word_order: WordOrder, logger: CallbackLogger) -> Self {
        Self {
            transport,
            codec: WordCodec::new(word_order),
            logger: Some(logger),
        }
    }

    /// Get a reference to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn word_order(&self) -> WordOrder {
        self.codec.word_order()
    }

    /// Change the word order used by subsequent 32-bit operations.
    pub fn set_word_order(&mut self, order: WordOrder) {
        self.codec.set_word_order(order);
    }

    /// Send one command and return the raw response line
    pub async fn execute(&self, command: &Command) -> UpperLinkResult<Option<String>> {
        if let Some(ref logger) = self.logger {
            logger.log_command(command);
        }

        let response = self.transport.send_command(&command.to_wire()).await;

        if let Some(ref logger) = self.logger {
            match &response {
                Ok(line) => logger.log_response(command, line.as_deref()),
                Err(e) => logger.error(&format!("'{}' failed: {}", command, e)),
            }
        }

        response
    }
}

impl<T: UpperLinkTransport> UpperLinkClient for GenericUpperLinkClient<T> {
    async fn read_words(&self, address: &str, count: usize) -> UpperLinkResult<Option<Vec<u16>>> {
        let address = Address::parse(address)?;
        let command = Command::read(&address, count)?;
        debug!("Reading {} word(s) at {}", count, address);

        let response = self.execute(&command).await?;
        parse_read_response(response.as_deref(), count)
    }

    async fn write_words(&self, address: &str, values: &[u16]) -> UpperLinkResult<()> {
        let address = Address::parse(address)?;
        let command = Command::write(&address, values)?;
        debug!("Writing {} word(s) at {}", values.len(), address);

        let response = self.execute(&command).await?;
        check_write_response(response.as_deref())
    }

    fn codec(&self) -> WordCodec {
        self.codec
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    async fn close(&self) -> UpperLinkResult<()> {
        self.transport.close().await
    }

    fn get_stats(&self) -> TransportStats {
        self.transport.get_stats()
    }
}

/// Upper Link TCP client implementation using the generic client
pub struct UpperLinkTcpClient {
    inner: GenericUpperLinkClient<TcpTransport>,
    config: ClientConfig,
}

impl std::fmt::Debug for UpperLinkTcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpperLinkTcpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl UpperLinkTcpClient {
    /// Create a client and connect it
    pub async fn new(config: ClientConfig) -> UpperLinkResult<Self> {
        let client = Self::with_config(config);
        client.connect().await?;
        Ok(client)
    }

    /// Create a client without connecting
    pub fn with_config(config: ClientConfig) -> Self {
        let transport = TcpTransport::new(&config);
        Self {
            inner: GenericUpperLinkClient::new(transport, config.word_order),
            config,
        }
    }

    /// Create a connected client with a callback logger attached
    pub async fn with_logging(
        config: ClientConfig,
        logger: Option<CallbackLogger>,
    ) -> UpperLinkResult<Self> {
        let transport = TcpTransport::new(&config);
        let client = Self {
            inner: GenericUpperLinkClient::with_logger(
                transport,
                config.word_order,
                logger.unwrap_or_default(),
            ),
            config,
        };
        client.connect().await?;
        Ok(client)
    }

    /// Create a connected client from `host:port`; `timeout` applies to the
    /// connect and to every command.
    pub async fn from_address(address: &str, timeout: Duration) -> UpperLinkResult<Self> {
        let config = ClientConfig::from_address(address)?
            .with_connect_timeout(timeout)
            .with_timeout(timeout);
        Self::new(config).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect if not already connected
    pub async fn connect(&self) -> UpperLinkResult<()> {
        self.inner.transport().connect().await
    }

    pub async fn disconnect(&self) -> UpperLinkResult<()> {
        self.inner.transport().disconnect().await
    }

    /// Drop the current connection and open a fresh one
    pub async fn reconnect(&self) -> UpperLinkResult<()> {
        self.disconnect().await?;
        self.connect().await
    }

    pub fn word_order(&self) -> WordOrder {
        self.inner.word_order()
    }

    /// Change the word order; must not race in-flight requests.
    pub fn set_word_order(&mut self, order: WordOrder) {
        self.config.word_order = order;
        self.inner.set_word_order(order);
    }

    /// Enable or disable packet logging on existing client
    pub fn set_packet_logging(&mut self, enabled: bool) {
        self.config.packet_logging = enabled;
        self.inner.transport().set_packet_logging(enabled);
    }

    /// Read `count` words in chunks sized by the configured device limits
    pub async fn read_block(&self, address: &str, count: usize) -> UpperLinkResult<Vec<u16>> {
        self.read_words_batch(address, count, &self.config.limits).await
    }

    /// Write `values` in chunks sized by the configured device limits
    pub async fn write_block(&self, address: &str, values: &[u16]) -> UpperLinkResult<()> {
        self.write_words_batch(address, values, &self.config.limits).await
    }

    /// Send a raw command line and return the raw response line
    pub async fn send_raw(&self, command: &str) -> UpperLinkResult<Option<String>> {
        self.inner.transport().send_command(command).await
    }

    /// Send a raw command line with its own deadline
    pub async fn send_raw_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> UpperLinkResult<Option<String>> {
        self.inner
            .transport()
            .send_command_with_timeout(command, timeout)
            .await
    }
}

impl UpperLinkClient for UpperLinkTcpClient {
    async fn read_words(&self, address: &str, count: usize) -> UpperLinkResult<Option<Vec<u16>>> {
        self.inner.read_words(address, count).await
    }

    async fn write_words(&self, address: &str, values: &[u16]) -> UpperLinkResult<()> {
        self.inner.write_words(address, values).await
    }

    fn codec(&self) -> WordCodec {
        self.inner.codec()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn close(&self) -> UpperLinkResult<()> {
        self.inner.close().await
    }

    fn get_stats(&self) -> TransportStats {
        self.inner.get_stats()
    }
}
