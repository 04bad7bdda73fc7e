//! # Word Codec
//!
//! Pure conversions between raw 16-bit PLC words and higher-level values.
//! No I/O happens here.
//!
//! ## Numeric packing
//!
//! 32-bit integers and floats span two words; which word carries the low half
//! is decided by the [`WordOrder`] held in the codec.
//!
//! ## String packing
//!
//! Text is packed two characters per word, *high byte first*: `"HE"` is the
//! single word `0x4845`. This is independent of the numeric word order.
//!
//! | Operation | Words | Notes |
//! |-----------|-------|-------|
//! | `words_to_i32` / `i32_to_words` | 2 | two's complement, wraps |
//! | `words_to_f32` / `f32_to_words` | 2 | bit-for-bit IEEE-754 |
//! | `words_to_string` / `string_to_words` | ⌈len/2⌉ | NUL terminates, odd length zero-padded |

use crate::address::DataSuffix;
use crate::bytes::{self, WordOrder};
use crate::error::{UpperLinkError, UpperLinkResult};
use crate::value::PlcValue;

/// Order-aware codec for multi-word values.
///
/// Owned by the client; the word order is set once and consulted by every
/// 32-bit conversion.
///
/// # Example
///
/// ```rust
/// use voltage_upperlink::{WordCodec, WordOrder};
///
/// let codec = WordCodec::new(WordOrder::LowWordFirst);
/// let words = codec.i32_to_words(-2);
/// assert_eq!(words, [0xFFFE, 0xFFFF]);
/// assert_eq!(codec.words_to_i32(&words), -2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordCodec {
    order: WordOrder,
}

impl WordCodec {
    pub fn new(order: WordOrder) -> Self {
        Self { order }
    }

    #[inline]
    pub fn word_order(&self) -> WordOrder {
        self.order
    }

    #[inline]
    pub fn set_word_order(&mut self, order: WordOrder) {
        self.order = order;
    }

    #[inline]
    pub fn words_to_i32(&self, words: &[u16; 2]) -> i32 {
        bytes::words_to_i32(words, self.order)
    }

    #[inline]
    pub fn i32_to_words(&self, value: i32) -> [u16; 2] {
        bytes::i32_to_words(value, self.order)
    }

    #[inline]
    pub fn words_to_f32(&self, words: &[u16; 2]) -> f32 {
        bytes::words_to_f32(words, self.order)
    }

    #[inline]
    pub fn f32_to_words(&self, value: f32) -> [u16; 2] {
        bytes::f32_to_words(value, self.order)
    }

    /// Decode words read for `suffix` into a typed value.
    ///
    /// # Errors
    ///
    /// `Protocol` if fewer words than the suffix needs were supplied.
    pub fn decode(&self, words: &[u16], suffix: DataSuffix) -> UpperLinkResult<PlcValue> {
        let needed = suffix.word_count();
        if words.len() < needed {
            return Err(UpperLinkError::protocol(
                format!("insufficient data: expected {} word(s), got {}", needed, words.len()),
                join_words(words),
            ));
        }

        let value = match suffix {
            DataSuffix::None | DataSuffix::Unsigned16 => PlcValue::U16(words[0]),
            DataSuffix::Signed16 => PlcValue::I16(words[0] as i16),
            DataSuffix::Hex16 => PlcValue::Hex(words[0]),
            DataSuffix::Signed32D | DataSuffix::Signed32L => {
                PlcValue::I32(self.words_to_i32(&[words[0], words[1]]))
            }
        };
        Ok(value)
    }

    /// Encode a typed value for an address with `suffix`.
    ///
    /// # Errors
    ///
    /// `NotSupported` when the value has no encoding for that suffix.
    pub fn encode(&self, value: &PlcValue, suffix: DataSuffix) -> UpperLinkResult<Vec<u16>> {
        let words = match value {
            PlcValue::U16(v) | PlcValue::Hex(v) if value.fits_suffix(suffix) => vec![*v],
            PlcValue::I16(v) if value.fits_suffix(suffix) => vec![*v as u16],
            PlcValue::I32(v) if value.fits_suffix(suffix) => self.i32_to_words(*v).to_vec(),
            _ => {
                return Err(UpperLinkError::not_supported(format!(
                    "cannot write {} to an address with suffix {}",
                    value.type_name(),
                    suffix_label(suffix)
                )))
            }
        };
        Ok(words)
    }
}

fn suffix_label(suffix: DataSuffix) -> String {
    match suffix.letter() {
        Some(letter) => format!(".{}", letter),
        None => "(none)".to_string(),
    }
}

fn join_words(words: &[u16]) -> String {
    words
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// ASCII string packing
// ============================================================================

/// Decode packed ASCII, high byte first, stopping after `length` bytes or at
/// the first NUL.
///
/// ```rust
/// use voltage_upperlink::words_to_string;
///
/// assert_eq!(words_to_string(&[0x4845], 2), "HE");
/// assert_eq!(words_to_string(&[0x4849, 0x2100], 3), "HI!");
/// ```
pub fn words_to_string(words: &[u16], length: usize) -> String {
    words
        .iter()
        .flat_map(|w| w.to_be_bytes())
        .take(length)
        .take_while(|b| *b != 0)
        .map(char::from)
        .collect()
}

/// Pack text into words, high byte first.
///
/// An odd final byte is zero-padded. Empty text still yields one zero word.
/// Characters outside ASCII are encoded as `?`.
///
/// ```rust
/// use voltage_upperlink::string_to_words;
///
/// assert_eq!(string_to_words("HE"), vec![0x4845]);
/// assert_eq!(string_to_words(""), vec![0x0000]);
/// ```
pub fn string_to_words(text: &str) -> Vec<u16> {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect();

    if bytes.is_empty() {
        return vec![0];
    }

    bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect()
}

// ============================================================================
// 16-bit formatting
// ============================================================================

/// Raw word as unsigned decimal.
#[inline]
pub fn format_u16(word: u16) -> String {
    word.to_string()
}

/// Raw word reinterpreted as two's-complement `i16`.
#[inline]
pub fn format_i16(word: u16) -> String {
    (word as i16).to_string()
}

/// Raw word as 4 upper-case hex digits.
#[inline]
pub fn format_hex16(word: u16) -> String {
    format!("{:04X}", word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ORDERS: [WordOrder; 2] = [WordOrder::LowWordFirst, WordOrder::HighWordFirst];

    #[test]
    fn test_string_to_words_even() {
        assert_eq!(string_to_words("HE"), vec![0x4845]);
        assert_eq!(words_to_string(&[0x4845], 2), "HE");
    }

    #[test]
    fn test_string_odd_length_padding() {
        let words = string_to_words("HI!");
        assert_eq!(words, vec![0x4849, 0x2100]);
        assert_eq!(words[1] & 0x00FF, 0);
        assert_eq!(words_to_string(&words, 3), "HI!");
    }

    #[test]
    fn test_empty_string_is_one_word() {
        assert_eq!(string_to_words(""), vec![0]);
        assert_eq!(words_to_string(&[0], 2), "");
    }

    #[test]
    fn test_words_to_string_stops_at_nul() {
        // "AB" then NUL then "C"
        assert_eq!(words_to_string(&[0x4142, 0x0043], 4), "AB");
    }

    #[test]
    fn test_words_to_string_stops_at_length() {
        assert_eq!(words_to_string(&[0x4142, 0x4344], 3), "ABC");
        assert_eq!(words_to_string(&[0x4142], 10), "AB");
        assert_eq!(words_to_string(&[0x4142], 0), "");
    }

    #[test]
    fn test_non_ascii_replaced() {
        assert_eq!(string_to_words("é"), vec![0x3F00]);
    }

    #[test]
    fn test_format_16bit() {
        assert_eq!(format_u16(0xFFFF), "65535");
        assert_eq!(format_i16(0xFFFF), "-1");
        assert_eq!(format_i16(0x7FFF), "32767");
        assert_eq!(format_hex16(0x00AB), "00AB");
        assert_eq!(format_hex16(0), "0000");
    }

    #[test]
    fn test_codec_word_order_switch() {
        let mut codec = WordCodec::default();
        assert_eq!(codec.i32_to_words(0x12345678), [0x5678, 0x1234]);
        codec.set_word_order(WordOrder::HighWordFirst);
        assert_eq!(codec.word_order(), WordOrder::HighWordFirst);
        assert_eq!(codec.i32_to_words(0x12345678), [0x1234, 0x5678]);
    }

    #[test]
    fn test_decode_by_suffix() {
        let codec = WordCodec::new(WordOrder::LowWordFirst);
        assert_eq!(
            codec.decode(&[0xFFFF], DataSuffix::None).unwrap(),
            PlcValue::U16(65535)
        );
        assert_eq!(
            codec.decode(&[0xFFFF], DataSuffix::Signed16).unwrap(),
            PlcValue::I16(-1)
        );
        assert_eq!(
            codec.decode(&[0x00FF], DataSuffix::Hex16).unwrap().to_string(),
            "00FF"
        );
        assert_eq!(
            codec.decode(&[0xFFFE, 0xFFFF], DataSuffix::Signed32L).unwrap(),
            PlcValue::I32(-2)
        );
    }

    #[test]
    fn test_decode_insufficient_words() {
        let codec = WordCodec::default();
        let err = codec.decode(&[1], DataSuffix::Signed32D).unwrap_err();
        assert!(err.is_protocol_error());
        assert!(codec.decode(&[], DataSuffix::None).is_err());
    }

    #[test]
    fn test_encode_by_suffix() {
        let codec = WordCodec::new(WordOrder::HighWordFirst);
        assert_eq!(
            codec.encode(&PlcValue::I16(-1), DataSuffix::Signed16).unwrap(),
            vec![0xFFFF]
        );
        assert_eq!(
            codec.encode(&PlcValue::I32(0x10002), DataSuffix::Signed32D).unwrap(),
            vec![0x0001, 0x0002]
        );
    }

    #[test]
    fn test_encode_not_supported() {
        let codec = WordCodec::default();
        for (value, suffix) in [
            (PlcValue::F32(1.0), DataSuffix::Hex16),
            (PlcValue::Str("AB".into()), DataSuffix::Signed32D),
            (PlcValue::I32(5), DataSuffix::Unsigned16),
            (PlcValue::U16(5), DataSuffix::Signed32L),
        ] {
            let err = codec.encode(&value, suffix).unwrap_err();
            assert!(matches!(err, UpperLinkError::NotSupported { .. }), "{:?}", value);
        }
    }

    proptest! {
        #[test]
        fn prop_i32_round_trip(v in any::<i32>()) {
            for order in ORDERS {
                let codec = WordCodec::new(order);
                prop_assert_eq!(codec.words_to_i32(&codec.i32_to_words(v)), v);
            }
        }

        #[test]
        fn prop_f32_round_trip_bitwise(bits in any::<u32>()) {
            let f = f32::from_bits(bits);
            prop_assume!(f.is_finite());
            for order in ORDERS {
                let codec = WordCodec::new(order);
                prop_assert_eq!(codec.words_to_f32(&codec.f32_to_words(f)).to_bits(), bits);
            }
        }

        #[test]
        fn prop_ascii_round_trip(text in "[ -~]{0,40}") {
            let words = string_to_words(&text);
            prop_assert_eq!(words.len(), text.len().div_ceil(2).max(1));
            prop_assert_eq!(words_to_string(&words, text.len()), text);
        }
    }
}
