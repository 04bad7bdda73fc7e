//! Upper Link protocol constants
//!
//! The protocol is line oriented ASCII: one command per line, one response
//! per line. Commands are terminated with a single CR; responses end with
//! CR and/or LF.

// ============================================================================
// Framing
// ============================================================================

/// Carriage return, appended to every command.
pub const CR: u8 = b'\r';

/// Line feed, accepted as a response delimiter.
pub const LF: u8 = b'\n';

/// Size of each socket read while scanning for a delimiter.
pub const READ_CHUNK_SIZE: usize = 256;

/// Upper bound on an undelimited response before the read is abandoned.
///
/// 1000 words rendered as 5 digits plus a separator fit comfortably.
pub const MAX_RESPONSE_LEN: usize = 8192;

// ============================================================================
// Command mnemonics
// ============================================================================

/// Read one word: `RD <addr>`
pub const CMD_READ: &str = "RD";

/// Read consecutive words: `RDS <addr> <n>`
pub const CMD_READ_MANY: &str = "RDS";

/// Write one word: `WR <addr> <value>`
pub const CMD_WRITE: &str = "WR";

/// Write consecutive words: `WRS <addr> <n> <v1> … <vn>`
pub const CMD_WRITE_MANY: &str = "WRS";

// ============================================================================
// Responses
// ============================================================================

/// Success token for writes; optional prefix on reads.
pub const RESPONSE_OK: &str = "OK";

/// First character of a device error response (`E0`, `E1`, …).
pub const ERROR_RESPONSE_PREFIX: char = 'E';

/// A response starting with [`ERROR_RESPONSE_PREFIX`] is treated as a device
/// error only when it is shorter than this. Tunable heuristic, not a
/// protocol guarantee.
pub const ERROR_RESPONSE_MAX_LEN: usize = 10;

// ============================================================================
// Limits
// ============================================================================

/// Maximum words per `RDS` command.
pub const MAX_READ_WORDS: usize = 1000;

/// Maximum words per `WRS` command.
pub const MAX_WRITE_WORDS: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiters() {
        assert_eq!(CR, 0x0D);
        assert_eq!(LF, 0x0A);
    }

    #[test]
    fn test_response_buffer_holds_max_read() {
        // "65535 " per word
        assert!(MAX_READ_WORDS * 6 <= MAX_RESPONSE_LEN);
    }
}
