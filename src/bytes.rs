//! # Word Order Handling
//!
//! A 32-bit value occupies two consecutive PLC words. Which of the two holds
//! the low half is a property of the device, configured once per client.
//!
//! For `0x12345678` stored at `DM100`/`DM101`:
//! - `LowWordFirst`: `DM100 = 0x5678`, `DM101 = 0x1234`
//! - `HighWordFirst`: `DM100 = 0x1234`, `DM101 = 0x5678`
//!
//! Bytes inside a word are never reordered by this module.

use std::fmt;

/// Placement of the two halves of a 32-bit value across two words.
///
/// # Example
///
/// ```rust
/// use voltage_upperlink::WordOrder;
///
/// let order = WordOrder::from_str("high-word-first").unwrap();
/// assert_eq!(order, WordOrder::HighWordFirst);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordOrder {
    /// First word is the low half. Native layout of Upper Link devices.
    #[default]
    LowWordFirst,
    /// First word is the high half.
    HighWordFirst,
}

impl WordOrder {
    /// Convert from configuration strings.
    ///
    /// Accepts `LOW`, `LOW_WORD_FIRST`, `LE`, `HIGH`, `HIGH_WORD_FIRST`,
    /// `BE`; case-insensitive, hyphens and underscores ignored.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "LOW" | "LOWWORDFIRST" | "LE" | "LITTLEENDIAN" => Some(Self::LowWordFirst),
            "HIGH" | "HIGHWORDFIRST" | "BE" | "BIGENDIAN" => Some(Self::HighWordFirst),
            _ => None,
        }
    }

    /// Get descriptive name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowWordFirst => "low-word-first",
            Self::HighWordFirst => "high-word-first",
        }
    }

    /// Split `(first, second)` into `(low, high)`.
    #[inline]
    pub fn low_high(&self, first: u16, second: u16) -> (u16, u16) {
        match self {
            Self::LowWordFirst => (first, second),
            Self::HighWordFirst => (second, first),
        }
    }
}

impl fmt::Display for WordOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Word <-> 32-bit conversions
// ============================================================================

/// Combine two words into a raw 32-bit pattern.
///
/// ```rust
/// use voltage_upperlink::bytes::{words_to_u32, WordOrder};
///
/// assert_eq!(words_to_u32(&[0x5678, 0x1234], WordOrder::LowWordFirst), 0x12345678);
/// assert_eq!(words_to_u32(&[0x1234, 0x5678], WordOrder::HighWordFirst), 0x12345678);
/// ```
#[inline]
pub fn words_to_u32(words: &[u16; 2], order: WordOrder) -> u32 {
    let (low, high) = order.low_high(words[0], words[1]);
    (u32::from(high) << 16) | u32::from(low)
}

/// Split a raw 32-bit pattern into two words.
#[inline]
pub fn u32_to_words(value: u32, order: WordOrder) -> [u16; 2] {
    let low = (value & 0xFFFF) as u16;
    let high = (value >> 16) as u16;
    match order {
        WordOrder::LowWordFirst => [low, high],
        WordOrder::HighWordFirst => [high, low],
    }
}

/// Two words as a two's-complement `i32`.
#[inline]
pub fn words_to_i32(words: &[u16; 2], order: WordOrder) -> i32 {
    words_to_u32(words, order) as i32
}

#[inline]
pub fn i32_to_words(value: i32, order: WordOrder) -> [u16; 2] {
    u32_to_words(value as u32, order)
}

/// Two words reinterpreted bit-for-bit as IEEE-754 single precision.
#[inline]
pub fn words_to_f32(words: &[u16; 2], order: WordOrder) -> f32 {
    f32::from_bits(words_to_u32(words, order))
}

#[inline]
pub fn f32_to_words(value: f32, order: WordOrder) -> [u16; 2] {
    u32_to_words(value.to_bits(), order)
}
