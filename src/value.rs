//! # PLC Value Types
//!
//! Typed values produced by `read_any` and consumed by `write_any`.
//! `Display` follows the rendering rules of the protocol console: decimal for
//! integers, four upper-case hex digits for `Hex`.

use std::fmt;

use crate::address::DataSuffix;
use crate::codec::{format_hex16, format_i16, format_u16};

/// A typed value stored in one or more PLC words.
///
/// | Variant | Words | Rendering |
/// |---------|-------|-----------|
/// | `U16` | 1 | `65535` |
/// | `I16` | 1 | `-1` |
/// | `Hex` | 1 | `00FF` |
/// | `I32` | 2 | `-70000` |
/// | `F32` | 2 | `1.5` |
/// | `Str` | ⌈len/2⌉ | text |
///
/// # Example
///
/// ```rust
/// use voltage_upperlink::PlcValue;
///
/// assert_eq!(PlcValue::Hex(0xFF).to_string(), "00FF");
/// assert_eq!(PlcValue::I16(-1).word_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PlcValue {
    /// Unsigned 16-bit word
    U16(u16),
    /// Signed 16-bit word
    I16(i16),
    /// 16-bit word shown in hex
    Hex(u16),
    /// Signed 32-bit integer (2 words)
    I32(i32),
    /// 32-bit floating point (2 words)
    F32(f32),
    /// ASCII text, two characters per word
    Str(String),
}

impl PlcValue {
    /// Number of PLC words needed to store this value.
    #[inline]
    pub fn word_count(&self) -> usize {
        match self {
            PlcValue::U16(_) | PlcValue::I16(_) | PlcValue::Hex(_) => 1,
            PlcValue::I32(_) | PlcValue::F32(_) => 2,
            PlcValue::Str(s) => s.len().div_ceil(2).max(1),
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            PlcValue::U16(_) => "u16",
            PlcValue::I16(_) => "i16",
            PlcValue::Hex(_) => "hex16",
            PlcValue::I32(_) => "i32",
            PlcValue::F32(_) => "f32",
            PlcValue::Str(_) => "string",
        }
    }

    /// Whether this value can be written to an address with `suffix`.
    ///
    /// 16-bit values go to 16-bit suffixes, `I32` to `.D`/`.L`. Floats and
    /// strings have no suffix of their own and are written with the
    /// dedicated `write_f32`/`write_string` operations.
    pub fn fits_suffix(&self, suffix: DataSuffix) -> bool {
        match self {
            PlcValue::U16(_) | PlcValue::I16(_) | PlcValue::Hex(_) => !suffix.is_32bit(),
            PlcValue::I32(_) => suffix.is_32bit(),
            PlcValue::F32(_) | PlcValue::Str(_) => false,
        }
    }
}

impl fmt::Display for PlcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlcValue::U16(v) => f.write_str(&format_u16(*v)),
            PlcValue::I16(v) => f.write_str(&format_i16(*v as u16)),
            PlcValue::Hex(v) => f.write_str(&format_hex16(*v)),
            PlcValue::I32(v) => write!(f, "{}", v),
            PlcValue::F32(v) => write!(f, "{}", v),
            PlcValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<u16> for PlcValue {
    fn from(v: u16) -> Self {
        PlcValue::U16(v)
    }
}

impl From<i16> for PlcValue {
    fn from(v: i16) -> Self {
        PlcValue::I16(v)
    }
}

impl From<i32> for PlcValue {
    fn from(v: i32) -> Self {
        PlcValue::I32(v)
    }
}

impl From<f32> for PlcValue {
    fn from(v: f32) -> Self {
        PlcValue::F32(v)
    }
}

impl From<&str> for PlcValue {
    fn from(s: &str) -> Self {
        PlcValue::Str(s.to_string())
    }
}
