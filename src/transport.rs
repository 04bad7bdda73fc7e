//! # Upper Link Transport Layer
//!
//! A single TCP connection carrying one command line at a time.
//!
//! ## Single-flight channel
//!
//! Every exchange (write command, read response) runs while holding the
//! channel lock, so at most one command is outstanding per connection.
//! Concurrent callers queue on the lock in arrival order. The lock is a
//! `tokio::sync::Mutex`, which is fair, and its guard is released whenever
//! the exchange future completes, times out or is dropped.
//!
//! ## Response framing
//!
//! Commands are terminated with one CR. A response is every byte up to the
//! first CR or LF; anything after the delimiter in the same read is
//! discarded. A clean end-of-stream before any byte arrives is reported as
//! `Ok(None)`; an end-of-stream after a partial line is a `Connection`
//! error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use voltage_upperlink::{TcpTransport, UpperLinkTransport};
//!
//! #[tokio::main]
//! async fn main() -> voltage_upperlink::UpperLinkResult<()> {
//!     let transport = TcpTransport::connect_to("127.0.0.1", 8501, Duration::from_secs(5)).await?;
//!
//!     let response = transport.send_command("RD DM100").await?;
//!     println!("Response: {:?}", response);
//!
//!     let stats = transport.get_stats();
//!     println!("Requests sent: {}", stats.requests_sent);
//!
//!     transport.close().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::constants::{CR, LF, MAX_RESPONSE_LEN, READ_CHUNK_SIZE};
use crate::error::{UpperLinkError, UpperLinkResult};

/// Log a command or response line for packet tracing
fn log_line(direction: &str, line: &str) {
    info!("[UPPERLINK] {} {}", direction, line.escape_debug());
}

/// Transport abstraction for Upper Link communication.
///
/// All methods take `&self`; implementations serialize exchanges internally
/// so one transport can be shared between tasks.
pub trait UpperLinkTransport: Send + Sync {
    /// Send one command line and wait for its response line.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(text))` - response without its delimiter
    /// * `Ok(None)` - the peer closed the stream before sending anything
    ///
    /// # Errors
    ///
    /// - `UpperLinkError::Timeout` - no delimiter before the deadline
    /// - `UpperLinkError::Connection` - not connected, write failed, or the
    ///   peer closed the stream mid-response
    fn send_command(
        &self,
        command: &str,
    ) -> impl Future<Output = UpperLinkResult<Option<String>>> + Send;

    /// Local view of the connection state; does not probe the device.
    fn is_connected(&self) -> bool;

    /// Close the connection. Safe to call repeatedly.
    fn close(&self) -> impl Future<Output = UpperLinkResult<()>> + Send;

    /// Get communication statistics.
    fn get_stats(&self) -> TransportStats;
}

/// Transport layer statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    requests_sent: AtomicU64,
    responses_received: AtomicU64,
    errors: AtomicU64,
    timeouts: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl StatsCounters {
    fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TransportStats {
        TransportStats {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            responses_received: self.responses_received.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

/// Write `command` followed by a single CR. Returns the bytes written.
pub(crate) async fn write_command<W>(writer: &mut W, command: &str) -> std::io::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = BytesMut::with_capacity(command.len() + 1);
    frame.put_slice(command.as_bytes());
    frame.put_u8(CR);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(frame.len())
}

/// Read one response line, delimited by CR or LF.
pub(crate) async fn read_response<R>(reader: &mut R) -> UpperLinkResult<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut line = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| UpperLinkError::connection(format!("Failed to read response: {}", e)))?;

        if n == 0 {
            if line.is_empty() {
                return Ok(None);
            }
            return Err(UpperLinkError::connection(format!(
                "Peer closed the stream after {} byte(s) without a delimiter",
                line.len()
            )));
        }

        let received = &chunk[..n];
        if let Some(end) = received.iter().position(|b| *b == CR || *b == LF) {
            line.extend_from_slice(&received[..end]);
            if end + 1 < n {
                debug!("Discarding {} byte(s) after response delimiter", n - end - 1);
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }

        line.extend_from_slice(received);
        if line.len() > MAX_RESPONSE_LEN {
            return Err(UpperLinkError::protocol(
                format!("response exceeds {} bytes without a delimiter", MAX_RESPONSE_LEN),
                String::from_utf8_lossy(&line[..32]).into_owned(),
            ));
        }
    }
}

/// Upper Link TCP transport
pub struct TcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
    timeout: Duration,
    stream: Mutex<Option<TcpStream>>,
    connected: AtomicBool,
    stats: StatsCounters,
    packet_logging: AtomicBool,
}

impl TcpTransport {
    /// Create a disconnected transport from client settings
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            connect_timeout: config.connect_timeout,
            timeout: config.timeout,
            stream: Mutex::new(None),
            connected: AtomicBool::new(false),
            stats: StatsCounters::default(),
            packet_logging: AtomicBool::new(config.packet_logging),
        }
    }

    /// Create a transport and connect it; `timeout` is used for both the
    /// connect and the per-command deadline.
    pub async fn connect_to(host: &str, port: u16, timeout: Duration) -> UpperLinkResult<Self> {
        let config = ClientConfig::new(host, port)
            .with_connect_timeout(timeout)
            .with_timeout(timeout);
        let transport = Self::new(&config);
        transport.connect().await?;
        Ok(transport)
    }

    /// `host:port` of the device
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default per-command deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Enable or disable packet logging
    pub fn set_packet_logging(&self, enabled: bool) {
        self.packet_logging.store(enabled, Ordering::Relaxed);
    }

    /// Establish the connection. A no-op when already connected.
    ///
    /// # Errors
    ///
    /// `Connection` if the socket cannot be established before the connect
    /// deadline.
    pub async fn connect(&self) -> UpperLinkResult<()> {
        let endpoint = self.endpoint();
        // A live socket may be busy with another exchange; don't wait on it.
        if self.connected.load(Ordering::Acquire) {
            debug!("Already connected to {}", endpoint);
            return Ok(());
        }
        let deadline_ms = self.connect_timeout.as_millis() as u64;

        let attempt = async {
            let mut slot = self.stream.lock().await;
            if slot.is_some() {
                debug!("Already connected to {}", endpoint);
                return Ok(());
            }

            let stream = TcpStream::connect((self.host.as_str(), self.port))
                .await
                .map_err(|e| {
                    UpperLinkError::connection(format!("Failed to connect to {}: {}", endpoint, e))
                })?;
            if let Err(e) = stream.set_nodelay(true) {
                debug!("set_nodelay failed on {}: {}", endpoint, e);
            }

            *slot = Some(stream);
            self.connected.store(true, Ordering::Release);
            info!("Connected to {}", endpoint);
            Ok::<(), UpperLinkError>(())
        };

        match timeout(self.connect_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Connect to {} timed out after {}ms", endpoint, deadline_ms);
                Err(UpperLinkError::connection(format!(
                    "Failed to connect to {}: no answer within {}ms",
                    endpoint, deadline_ms
                )))
            }
        }
    }

    /// Close the connection. Safe on an already-closed transport.
    pub async fn disconnect(&self) -> UpperLinkResult<()> {
        let mut slot = self.stream.lock().await;
        if let Some(mut stream) = slot.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Shutdown of {} failed: {}", self.endpoint(), e);
            }
            info!("Disconnected from {}", self.endpoint());
        }
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    /// Send one command with an explicit deadline.
    ///
    /// The deadline covers waiting for the channel, writing and reading.
    /// After a timeout the connection is kept but its state is
    /// indeterminate; a late response may still arrive. Callers decide
    /// whether to reconnect.
    pub async fn send_command_with_timeout(
        &self,
        command: &str,
        deadline: Duration,
    ) -> UpperLinkResult<Option<String>> {
        match timeout(deadline, self.exchange(command)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                StatsCounters::add(&self.stats.errors, 1);
                Err(e)
            }
            Err(_) => {
                StatsCounters::add(&self.stats.timeouts, 1);
                StatsCounters::add(&self.stats.errors, 1);
                let deadline_ms = deadline.as_millis() as u64;
                warn!("Command '{}' timed out after {}ms", command, deadline_ms);
                Err(UpperLinkError::timeout(
                    format!("response to '{}'", command),
                    deadline_ms,
                ))
            }
        }
    }

    async fn exchange(&self, command: &str) -> UpperLinkResult<Option<String>> {
        let mut slot = self.stream.lock().await;
        let stream = slot.as_mut().ok_or_else(|| {
            UpperLinkError::connection(format!("Not connected to {}", self.endpoint()))
        })?;

        let packet_logging = self.packet_logging.load(Ordering::Relaxed);
        if packet_logging {
            log_line("send", command);
        }

        let sent = match write_command(stream, command).await {
            Ok(sent) => sent,
            Err(e) => {
                self.mark_broken(&mut slot);
                return Err(UpperLinkError::connection(format!(
                    "Failed to send command: {}",
                    e
                )));
            }
        };
        StatsCounters::add(&self.stats.requests_sent, 1);
        StatsCounters::add(&self.stats.bytes_sent, sent as u64);

        match read_response(stream).await {
            Ok(Some(line)) => {
                StatsCounters::add(&self.stats.responses_received, 1);
                StatsCounters::add(&self.stats.bytes_received, line.len() as u64 + 1);
                if packet_logging {
                    log_line("receive", &line);
                }
                Ok(Some(line))
            }
            Ok(None) => {
                warn!("{} closed the connection without responding", self.endpoint());
                self.mark_broken(&mut slot);
                Ok(None)
            }
            Err(e) => {
                if e.is_transport_error() {
                    self.mark_broken(&mut slot);
                }
                Err(e)
            }
        }
    }

    fn mark_broken(&self, slot: &mut Option<TcpStream>) {
        *slot = None;
        self.connected.store(false, Ordering::Release);
    }
}

impl UpperLinkTransport for TcpTransport {
    fn send_command(
        &self,
        command: &str,
    ) -> impl Future<Output = UpperLinkResult<Option<String>>> + Send {
        self.send_command_with_timeout(command, self.timeout)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn close(&self) -> impl Future<Output = UpperLinkResult<()>> + Send {
        self.disconnect()
    }

    fn get_stats(&self) -> TransportStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_write_command_appends_single_cr() {
        let mut mock = Builder::new().write(b"RD DM100\r").build();
        let sent = write_command(&mut mock, "RD DM100").await.unwrap();
        assert_eq!(sent, 9);
    }

    #[tokio::test]
    async fn test_read_response_cr_lf() {
        let mut mock = Builder::new().read(b"12 34\r\n").build();
        let line = read_response(&mut mock).await.unwrap();
        assert_eq!(line.as_deref(), Some("12 34"));
    }

    #[tokio::test]
    async fn test_read_response_lf_only() {
        let mut mock = Builder::new().read(b"OK\n").build();
        assert_eq!(read_response(&mut mock).await.unwrap().as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_read_response_across_reads() {
        let mut mock = Builder::new().read(b"12 ").read(b"34 5").read(b"6\r").build();
        let line = read_response(&mut mock).await.unwrap();
        assert_eq!(line.as_deref(), Some("12 34 56"));
    }

    #[tokio::test]
    async fn test_read_response_discards_after_delimiter() {
        let mut mock = Builder::new().read(b"1\r\n2\r\n").build();
        assert_eq!(read_response(&mut mock).await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_read_response_empty_line() {
        let mut mock = Builder::new().read(b"\r").build();
        assert_eq!(read_response(&mut mock).await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_read_response_clean_eof_is_none() {
        let mut mock = Builder::new().build();
        assert_eq!(read_response(&mut mock).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_response_eof_mid_line() {
        let mut mock = Builder::new().read(b"12 3").build();
        let err = read_response(&mut mock).await.unwrap_err();
        assert!(matches!(err, UpperLinkError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_read_response_io_error() {
        let mut mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let err = read_response(&mut mock).await.unwrap_err();
        assert!(err.is_transport_error());
    }

    #[tokio::test]
    async fn test_read_response_too_long() {
        let garbage = vec![b'1'; MAX_RESPONSE_LEN + 1];
        let mut mock = Builder::new().read(&garbage).build();
        let err = read_response(&mut mock).await.unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[tokio::test]
    async fn test_send_without_connection() {
        let transport = TcpTransport::new(&ClientConfig::new("127.0.0.1", 1));
        assert!(!transport.is_connected());
        let err = transport.send_command("RD DM0").await.unwrap_err();
        assert!(matches!(err, UpperLinkError::Connection { .. }));
        assert_eq!(transport.get_stats().errors, 1);
        assert_eq!(transport.get_stats().requests_sent, 0);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let transport = TcpTransport::new(&ClientConfig::default());
        transport.disconnect().await.unwrap();
        transport.close().await.unwrap();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_endpoint() {
        let transport = TcpTransport::new(&ClientConfig::new("plc", 9000));
        assert_eq!(transport.endpoint(), "plc:9000");
    }
}
