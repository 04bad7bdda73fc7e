//! Upper Link command text and response interpretation
//!
//! | Command | Wire form | Success |
//! |---------|-----------|---------|
//! | read one | `RD DM100` | `<v>` |
//! | read many | `RDS DM100 3` | `<v1> <v2> <v3>` |
//! | write one | `WR DM100 7` | `OK` |
//! | write many | `WRS DM100 2 7 8` | `OK` |
//!
//! The CR terminator is added by the transport, not here.

use std::fmt;

use tracing::debug;

use crate::address::Address;
use crate::constants::{
    CMD_READ, CMD_READ_MANY, CMD_WRITE, CMD_WRITE_MANY, ERROR_RESPONSE_MAX_LEN,
    ERROR_RESPONSE_PREFIX, MAX_READ_WORDS, MAX_WRITE_WORDS, RESPONSE_OK,
};
use crate::error::{UpperLinkError, UpperLinkResult};

/// One request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `RD <base>`
    Read { base: String },
    /// `RDS <base> <count>`
    ReadMany { base: String, count: usize },
    /// `WR <base> <value>`
    Write { base: String, value: u16 },
    /// `WRS <base> <count> <v1> … <vn>`
    WriteMany { base: String, values: Vec<u16> },
}

impl Command {
    /// `RD` for a single word, `RDS` otherwise.
    ///
    /// # Errors
    ///
    /// `InvalidData` for a zero count or more than `MAX_READ_WORDS`.
    pub fn read(address: &Address, count: usize) -> UpperLinkResult<Self> {
        if count == 0 || count > MAX_READ_WORDS {
            return Err(UpperLinkError::invalid_data(format!(
                "read count {} out of range 1..={}",
                count, MAX_READ_WORDS
            )));
        }

        let base = address.base_address();
        Ok(if count == 1 {
            Self::Read { base }
        } else {
            Self::ReadMany { base, count }
        })
    }

    /// `WR` for a single word, `WRS` otherwise.
    ///
    /// # Errors
    ///
    /// `InvalidData` for no values or more than `MAX_WRITE_WORDS`.
    pub fn write(address: &Address, values: &[u16]) -> UpperLinkResult<Self> {
        if values.is_empty() || values.len() > MAX_WRITE_WORDS {
            return Err(UpperLinkError::invalid_data(format!(
                "write count {} out of range 1..={}",
                values.len(),
                MAX_WRITE_WORDS
            )));
        }

        let base = address.base_address();
        Ok(match values {
            [value] => Self::Write {
                base,
                value: *value,
            },
            _ => Self::WriteMany {
                base,
                values: values.to_vec(),
            },
        })
    }

    /// Command text without terminator.
    pub fn to_wire(&self) -> String {
        self.to_string()
    }

    /// Whether a successful response is `OK` rather than data.
    #[inline]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::WriteMany { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { base } => write!(f, "{} {}", CMD_READ, base),
            Self::ReadMany { base, count } => write!(f, "{} {} {}", CMD_READ_MANY, base, count),
            Self::Write { base, value } => write!(f, "{} {} {}", CMD_WRITE, base, value),
            Self::WriteMany { base, values } => {
                write!(f, "{} {} {}", CMD_WRITE_MANY, base, values.len())?;
                for value in values {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
        }
    }
}

/// Short responses starting with `E` are device errors.
///
/// The length bound keeps long data lines from being misread as errors.
#[inline]
pub fn is_error_response(text: &str) -> bool {
    text.starts_with(ERROR_RESPONSE_PREFIX) && text.len() < ERROR_RESPONSE_MAX_LEN
}

/// Interpret the response to a read.
///
/// - `None` or blank text: `Ok(None)`.
/// - short `E…` text: `Protocol` error with the raw text.
/// - otherwise whitespace-separated integers, an optional leading `OK`
///   stripped; unparsable tokens become `0`, values are truncated to 16 bits,
///   at most `count` are returned.
pub fn parse_read_response(
    response: Option<&str>,
    count: usize,
) -> UpperLinkResult<Option<Vec<u16>>> {
    let text = match response.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => {
            debug!("Read returned no response");
            return Ok(None);
        }
    };

    if is_error_response(text) {
        return Err(UpperLinkError::protocol("device reported an error", text));
    }

    let body = text.strip_prefix(RESPONSE_OK).unwrap_or(text);
    let words: Vec<u16> = body
        .split_whitespace()
        .take(count)
        .map(|token| token.parse::<i64>().map(|v| v as u16).unwrap_or(0))
        .collect();

    debug!("Read response parsed: {} of {} word(s)", words.len(), count);
    Ok(Some(words))
}

/// A write succeeds only when the trimmed response is exactly `OK`.
pub fn check_write_response(response: Option<&str>) -> UpperLinkResult<()> {
    match response.map(str::trim) {
        Some(RESPONSE_OK) => Ok(()),
        Some(other) => Err(UpperLinkError::protocol("write rejected", other)),
        None => Err(UpperLinkError::protocol("write got no response", "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(text: &str) -> Address {
        Address::parse(text).unwrap()
    }

    #[test]
    fn test_read_command_text() {
        assert_eq!(Command::read(&addr("dm100.H"), 1).unwrap().to_wire(), "RD DM100");
        assert_eq!(Command::read(&addr("DM100"), 3).unwrap().to_wire(), "RDS DM100 3");
    }

    #[test]
    fn test_write_command_text() {
        assert_eq!(
            Command::write(&addr("DM5"), &[42]).unwrap().to_wire(),
            "WR DM5 42"
        );
        assert_eq!(
            Command::write(&addr("DM5.D"), &[1, 65535]).unwrap().to_wire(),
            "WRS DM5 2 1 65535"
        );
    }

    #[test]
    fn test_command_count_bounds() {
        assert!(Command::read(&addr("DM0"), 0).is_err());
        assert!(Command::read(&addr("DM0"), MAX_READ_WORDS + 1).is_err());
        assert!(Command::write(&addr("DM0"), &[]).is_err());
        assert!(Command::write(&addr("DM0"), &vec![0; MAX_WRITE_WORDS + 1]).is_err());
    }

    #[test]
    fn test_is_write() {
        assert!(Command::write(&addr("DM0"), &[1]).unwrap().is_write());
        assert!(!Command::read(&addr("DM0"), 1).unwrap().is_write());
    }

    #[test]
    fn test_parse_read_truncates_to_count() {
        let words = parse_read_response(Some("12 34 56"), 2).unwrap();
        assert_eq!(words, Some(vec![12, 34]));
    }

    #[test]
    fn test_parse_read_short_response() {
        let words = parse_read_response(Some("12"), 3).unwrap();
        assert_eq!(words, Some(vec![12]));
    }

    #[test]
    fn test_parse_read_empty_is_none() {
        assert_eq!(parse_read_response(Some(""), 1).unwrap(), None);
        assert_eq!(parse_read_response(Some("   "), 1).unwrap(), None);
        assert_eq!(parse_read_response(None, 1).unwrap(), None);
    }

    #[test]
    fn test_parse_read_garbled_token_becomes_zero() {
        let words = parse_read_response(Some("7 x9 8"), 3).unwrap();
        assert_eq!(words, Some(vec![7, 0, 8]));
    }

    #[test]
    fn test_parse_read_truncates_to_16_bits() {
        let words = parse_read_response(Some("65536 -1 70000"), 3).unwrap();
        assert_eq!(words, Some(vec![0, 0xFFFF, 70000u32 as u16]));
    }

    #[test]
    fn test_parse_read_strips_ok_prefix() {
        assert_eq!(
            parse_read_response(Some("OK 1 2"), 2).unwrap(),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_parse_read_device_error() {
        let err = parse_read_response(Some("E0"), 1).unwrap_err();
        match err {
            UpperLinkError::Protocol { response, .. } => assert_eq!(response, "E0"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_heuristic_boundary() {
        assert!(is_error_response("E0"));
        assert!(is_error_response(&"E123456789"[..9]));
        // ten characters or more is data, not an error
        assert!(!is_error_response("E123456789"));
        assert!(!is_error_response("00012 00034"));
        assert!(!is_error_response(""));

        let words = parse_read_response(Some("E1 2 3 4 5 6"), 2).unwrap();
        assert_eq!(words, Some(vec![0, 2]));
    }

    #[test]
    fn test_check_write_response() {
        assert!(check_write_response(Some("OK")).is_ok());
        assert!(check_write_response(Some(" OK ")).is_ok());
        assert!(check_write_response(Some("E1")).unwrap_err().is_protocol_error());
        assert!(check_write_response(Some("OK1")).is_err());
        assert!(check_write_response(None).is_err());
    }
}
