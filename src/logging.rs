//! # Callback Logging
//!
//! Structured diagnostics go through `tracing`. [`CallbackLogger`] is an
//! additional hook for applications that want every command/response pair
//! delivered to their own sink (a UI console, a file, a test probe).
//!
//! ```rust
//! use voltage_upperlink::{CallbackLogger, LogCallback, LogLevel};
//!
//! let callback: LogCallback = Box::new(|level, message| {
//!     println!("[{}] {}", level.as_str(), message);
//! });
//! let logger = CallbackLogger::new(Some(callback), LogLevel::Info);
//! logger.info("connected");
//! ```

use std::sync::Arc;

use crate::command::{is_error_response, Command};
use crate::constants::{CR, RESPONSE_OK};

/// Log levels for the callback logging system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Logging mode for command/response display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// Wire bytes as hex, terminator included
    Raw,
    /// Command text with a short description
    Interpreted,
    /// Interpreted at `Info`, raw at `Debug`
    Both,
}

/// Type alias for log callback functions
pub type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Logger that forwards to a user callback
#[derive(Clone)]
pub struct CallbackLogger {
    callback: Option<Arc<LogCallback>>,
    min_level: LogLevel,
    mode: LoggingMode,
}

impl CallbackLogger {
    pub fn new(callback: Option<LogCallback>, min_level: LogLevel) -> Self {
        Self {
            callback: callback.map(Arc::new),
            min_level,
            mode: LoggingMode::Interpreted,
        }
    }

    pub fn with_mode(callback: Option<LogCallback>, min_level: LogLevel, mode: LoggingMode) -> Self {
        Self {
            callback: callback.map(Arc::new),
            min_level,
            mode,
        }
    }

    /// Create a logger with timestamped console output
    pub fn console() -> Self {
        let callback: LogCallback = Box::new(|level, message| {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            match level {
                LogLevel::Error | LogLevel::Warn => {
                    eprintln!("[{}] {}: {}", timestamp, level.as_str(), message)
                }
                LogLevel::Info | LogLevel::Debug => {
                    println!("[{}] {}: {}", timestamp, level.as_str(), message)
                }
            }
        });
        Self::new(Some(callback), LogLevel::Info)
    }

    /// Create a logger that outputs nothing
    pub fn disabled() -> Self {
        Self::new(None, LogLevel::Error)
    }

    pub fn set_mode(&mut self, mode: LoggingMode) {
        self.mode = mode;
    }

    pub fn get_mode(&self) -> LoggingMode {
        self.mode
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if self.should_log(level) {
            if let Some(ref callback) = self.callback {
                callback(level, message);
            }
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn should_log(&self, level: LogLevel) -> bool {
        self.callback.is_some() && level <= self.min_level
    }

    /// Log an outgoing command.
    pub fn log_command(&self, command: &Command) {
        let text = command.to_wire();
        let raw = || {
            let mut bytes = text.clone().into_bytes();
            bytes.push(CR);
            format!("Command -> Raw: {}", hex_dump(&bytes))
        };
        let interpreted = || format!("Command -> {} ({})", text, describe(command));

        match self.mode {
            LoggingMode::Raw => self.info(&raw()),
            LoggingMode::Interpreted => self.info(&interpreted()),
            LoggingMode::Both => {
                self.info(&interpreted());
                self.debug(&raw());
            }
        }
    }

    /// Log the response line for `command`; `None` is a missing response.
    pub fn log_response(&self, command: &Command, response: Option<&str>) {
        let Some(text) = response else {
            self.warn(&format!("Response <- none for '{}'", command));
            return;
        };

        let rejected = if command.is_write() {
            text != RESPONSE_OK
        } else {
            is_error_response(text)
        };
        let level = if rejected { LogLevel::Warn } else { LogLevel::Info };

        let raw = || format!("Response <- Raw: {}", hex_dump(text.as_bytes()));
        let interpreted = || {
            if rejected {
                format!("Response <- '{}' rejected {}", text, command)
            } else {
                format!("Response <- '{}' for {}", text, command)
            }
        };

        match self.mode {
            LoggingMode::Raw => self.log(level, &raw()),
            LoggingMode::Interpreted => self.log(level, &interpreted()),
            LoggingMode::Both => {
                self.log(level, &interpreted());
                self.debug(&raw());
            }
        }
    }
}

impl Default for CallbackLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(command: &Command) -> String {
    match command {
        Command::Read { base } => format!("read 1 word at {}", base),
        Command::ReadMany { base, count } => format!("read {} words at {}", count, base),
        Command::Write { base, .. } => format!("write 1 word at {}", base),
        Command::WriteMany { base, values } => {
            format!("write {} words at {}", values.len(), base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use std::sync::Mutex;

    fn capture(level: LogLevel, mode: LoggingMode) -> (CallbackLogger, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let callback: LogCallback = Box::new(move |level, message| {
            sink.lock()
                .unwrap()
                .push(format!("{} {}", level.as_str(), message));
        });
        (CallbackLogger::with_mode(Some(callback), level, mode), lines)
    }

    fn read_command() -> Command {
        Command::read(&Address::parse("DM10").unwrap(), 2).unwrap()
    }

    #[test]
    fn test_level_filter() {
        let (logger, lines) = capture(LogLevel::Warn, LoggingMode::Interpreted);
        logger.debug("hidden");
        logger.info("hidden");
        logger.warn("shown");
        logger.error("shown too");
        assert_eq!(lines.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_interpreted_command() {
        let (logger, lines) = capture(LogLevel::Debug, LoggingMode::Interpreted);
        logger.log_command(&read_command());
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("RDS DM10 2"));
        assert!(lines[0].contains("read 2 words at DM10"));
    }

    #[test]
    fn test_raw_command_includes_terminator() {
        let (logger, lines) = capture(LogLevel::Debug, LoggingMode::Raw);
        logger.log_command(&Command::read(&Address::parse("R1").unwrap(), 1).unwrap());
        // "RD R1\r"
        assert!(lines.lock().unwrap()[0].ends_with("52 44 20 52 31 0D"));
    }

    #[test]
    fn test_both_mode_logs_twice() {
        let (logger, lines) = capture(LogLevel::Debug, LoggingMode::Both);
        logger.log_response(&read_command(), Some("1 2"));
        assert_eq!(lines.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_response_warns() {
        let (logger, lines) = capture(LogLevel::Info, LoggingMode::Interpreted);
        logger.log_response(&read_command(), None);
        assert!(lines.lock().unwrap()[0].starts_with("WARN"));
    }

    #[test]
    fn test_rejected_response_warns() {
        let (logger, lines) = capture(LogLevel::Info, LoggingMode::Interpreted);
        let write = Command::write(&Address::parse("DM10").unwrap(), &[1]).unwrap();

        logger.log_response(&write, Some("OK"));
        logger.log_response(&write, Some("E1"));
        logger.log_response(&read_command(), Some("E0"));
        logger.log_response(&read_command(), Some("12 34"));

        let lines = lines.lock().unwrap();
        assert!(lines[0].starts_with("INFO"));
        assert!(lines[1].starts_with("WARN") && lines[1].contains("rejected WR DM10 1"));
        assert!(lines[2].starts_with("WARN"));
        assert!(lines[3].starts_with("INFO"));
    }

    #[test]
    fn test_disabled_logger() {
        let logger = CallbackLogger::disabled();
        logger.error("nothing happens");
        assert_eq!(logger.get_mode(), LoggingMode::Interpreted);
    }
}
