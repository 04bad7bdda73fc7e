//! # PLC Address Parsing
//!
//! Addresses are written as `<area><offset>[.<suffix>]`, case-insensitive,
//! with surrounding whitespace ignored:
//!
//! | Text | Area | Offset | Suffix | Sent on the wire |
//! |------|------|--------|--------|------------------|
//! | `DM100` | DM | 100 | none | `DM100` |
//! | `dm100.H` | DM | 100 | `.H` | `DM100` |
//! | ` mr5.s ` | MR | 5 | `.S` | `MR5` |
//! | `XY12` | unrecognized `XY` | 12 | none | `XY12` |
//!
//! Unknown area prefixes are not rejected; the device decides whether it
//! understands them.
//!
//! ```rust
//! use voltage_upperlink::{Address, DataSuffix, WordKind};
//!
//! let addr = Address::parse("dm100.H").unwrap();
//! assert_eq!(addr.word_kind(), &WordKind::DM);
//! assert_eq!(addr.offset(), 100);
//! assert_eq!(addr.suffix(), DataSuffix::Hex16);
//! assert_eq!(addr.base_address(), "DM100");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{UpperLinkError, UpperLinkResult};

/// Memory area of a PLC address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WordKind {
    /// Relay
    R,
    /// Link relay
    B,
    /// Internal auxiliary relay
    MR,
    /// Latch relay
    LR,
    /// Control relay
    CR,
    /// Control memory
    CM,
    /// Timer
    T,
    /// Counter
    C,
    /// Data memory
    DM,
    /// Data memory (short form)
    D,
    /// Extended data memory
    EM,
    /// File register
    FM,
    /// File register (serial)
    ZF,
    /// Link register
    W,
    /// Temporary data memory
    TM,
    /// Index register
    Z,
    /// Work memory
    VM,
    /// Holding area
    HR,
    /// Core I/O
    CIO,
    /// Prefix not in the known table, passed through verbatim.
    Unrecognized(String),
}

impl WordKind {
    /// Map a normalized (upper-case) prefix onto the area table.
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "R" => Self::R,
            "B" => Self::B,
            "MR" => Self::MR,
            "LR" => Self::LR,
            "CR" => Self::CR,
            "CM" => Self::CM,
            "T" => Self::T,
            "C" => Self::C,
            "DM" => Self::DM,
            "D" => Self::D,
            "EM" => Self::EM,
            "FM" => Self::FM,
            "ZF" => Self::ZF,
            "W" => Self::W,
            "TM" => Self::TM,
            "Z" => Self::Z,
            "VM" => Self::VM,
            "HR" => Self::HR,
            "CIO" => Self::CIO,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Area text as sent on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Self::R => "R",
            Self::B => "B",
            Self::MR => "MR",
            Self::LR => "LR",
            Self::CR => "CR",
            Self::CM => "CM",
            Self::T => "T",
            Self::C => "C",
            Self::DM => "DM",
            Self::D => "D",
            Self::EM => "EM",
            Self::FM => "FM",
            Self::ZF => "ZF",
            Self::W => "W",
            Self::TM => "TM",
            Self::Z => "Z",
            Self::VM => "VM",
            Self::HR => "HR",
            Self::CIO => "CIO",
            Self::Unrecognized(prefix) => prefix,
        }
    }

    #[inline]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the caller wants the word(s) at an address interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataSuffix {
    /// No suffix: unsigned 16-bit.
    #[default]
    None,
    /// `.U` unsigned 16-bit
    Unsigned16,
    /// `.S` signed 16-bit
    Signed16,
    /// `.H` 16-bit rendered as 4 hex digits
    Hex16,
    /// `.D` 32-bit
    Signed32D,
    /// `.L` 32-bit
    Signed32L,
}

impl DataSuffix {
    /// Match the text after the `.`; only single letters U, S, D, H, L.
    pub fn from_letter(text: &str) -> Option<Self> {
        match text {
            "U" => Some(Self::Unsigned16),
            "S" => Some(Self::Signed16),
            "H" => Some(Self::Hex16),
            "D" => Some(Self::Signed32D),
            "L" => Some(Self::Signed32L),
            _ => None,
        }
    }

    /// Suffix letter, `None` for an unsuffixed address.
    pub fn letter(&self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Unsigned16 => Some('U'),
            Self::Signed16 => Some('S'),
            Self::Hex16 => Some('H'),
            Self::Signed32D => Some('D'),
            Self::Signed32L => Some('L'),
        }
    }

    /// Number of 16-bit words read or written for this suffix.
    #[inline]
    pub fn word_count(&self) -> usize {
        match self {
            Self::Signed32D | Self::Signed32L => 2,
            _ => 1,
        }
    }

    #[inline]
    pub fn is_32bit(&self) -> bool {
        self.word_count() == 2
    }
}

/// A parsed PLC memory reference. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    word_kind: WordKind,
    offset: u32,
    suffix: DataSuffix,
    raw: String,
}

impl Address {
    /// Parse address text.
    ///
    /// # Errors
    ///
    /// [`UpperLinkError::Format`] when the text is empty, has no leading
    /// area letters, has nothing after the letters, or the remainder is not
    /// a base-10 integer.
    pub fn parse(text: &str) -> UpperLinkResult<Self> {
        let mut normalized = text.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(UpperLinkError::format(text, "address is empty"));
        }

        let mut suffix = DataSuffix::None;
        if let Some(dot) = normalized.rfind('.') {
            if dot > 0 && dot < normalized.len() - 1 {
                if let Some(found) = DataSuffix::from_letter(&normalized[dot + 1..]) {
                    suffix = found;
                    normalized.truncate(dot);
                }
            }
        }

        let prefix_len = normalized
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        if prefix_len == 0 {
            return Err(UpperLinkError::format(text, "missing area prefix"));
        }

        let (prefix, digits) = normalized.split_at(prefix_len);
        if digits.is_empty() {
            return Err(UpperLinkError::format(text, "missing offset"));
        }
        // u32::from_str accepts a leading '+'
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UpperLinkError::format(
                text,
                "offset is not a decimal integer",
            ));
        }
        let offset = digits
            .parse::<u32>()
            .map_err(|e| UpperLinkError::format(text, format!("invalid offset: {}", e)))?;

        Ok(Self {
            word_kind: WordKind::from_prefix(prefix),
            offset,
            suffix,
            raw: text.to_string(),
        })
    }

    /// Same area and suffix at another offset.
    pub fn with_offset(&self, offset: u32) -> Self {
        Self {
            word_kind: self.word_kind.clone(),
            offset,
            suffix: self.suffix,
            raw: self.raw.clone(),
        }
    }

    #[inline]
    pub fn word_kind(&self) -> &WordKind {
        &self.word_kind
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn suffix(&self) -> DataSuffix {
        self.suffix
    }

    /// The text as originally supplied by the caller.
    #[inline]
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// `<area><offset>` without suffix; this is what goes on the wire.
    pub fn base_address(&self) -> String {
        format!("{}{}", self.word_kind, self.offset)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.word_kind, self.offset)?;
        if let Some(letter) = self.suffix.letter() {
            write!(f, ".{}", letter)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = UpperLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_with_suffix() {
        let addr = Address::parse("dm100.H").unwrap();
        assert_eq!(addr.word_kind(), &WordKind::DM);
        assert_eq!(addr.offset(), 100);
        assert_eq!(addr.suffix(), DataSuffix::Hex16);
        assert_eq!(addr.base_address(), "DM100");
        assert_eq!(addr.raw_text(), "dm100.H");
    }

    #[test]
    fn test_parse_all_suffixes() {
        let cases = [
            ("DM0.U", DataSuffix::Unsigned16),
            ("DM0.S", DataSuffix::Signed16),
            ("DM0.H", DataSuffix::Hex16),
            ("DM0.D", DataSuffix::Signed32D),
            ("DM0.L", DataSuffix::Signed32L),
            ("DM0", DataSuffix::None),
        ];
        for (text, expected) in cases {
            assert_eq!(Address::parse(text).unwrap().suffix(), expected, "{}", text);
        }
    }

    #[test]
    fn test_parse_trims_and_folds_case() {
        let addr = Address::parse("  mr5.s \t").unwrap();
        assert_eq!(addr.word_kind(), &WordKind::MR);
        assert_eq!(addr.offset(), 5);
        assert_eq!(addr.suffix(), DataSuffix::Signed16);
        assert_eq!(addr.to_string(), "MR5.S");
    }

    #[test]
    fn test_parse_unrecognized_area() {
        let addr = Address::parse("xy12").unwrap();
        assert_eq!(addr.word_kind(), &WordKind::Unrecognized("XY".to_string()));
        assert!(!addr.word_kind().is_recognized());
        assert_eq!(addr.base_address(), "XY12");
    }

    #[test]
    fn test_parse_multi_letter_areas() {
        assert_eq!(Address::parse("CIO20").unwrap().word_kind(), &WordKind::CIO);
        assert_eq!(Address::parse("ZF7").unwrap().word_kind(), &WordKind::ZF);
        assert_eq!(Address::parse("D7").unwrap().word_kind(), &WordKind::D);
        assert_eq!(Address::parse("LR1").unwrap().word_kind(), &WordKind::LR);
    }

    #[test]
    fn test_parse_format_errors() {
        for text in ["", "   ", "100", "DM", "DM1X0", ".H", "DM-5", "DM+5"] {
            let err = Address::parse(text).unwrap_err();
            assert!(
                matches!(err, UpperLinkError::Format { .. }),
                "{:?} -> {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_unknown_suffix_left_in_place() {
        // ".X" is not a suffix, so it stays and spoils the offset
        assert!(Address::parse("DM100.X").is_err());
        // trailing dot is never a suffix separator
        assert!(Address::parse("DM100.").is_err());
        // multi-letter suffix is not recognized
        assert!(Address::parse("DM100.HH").is_err());
    }

    #[test]
    fn test_offset_overflow() {
        assert!(Address::parse("DM99999999999").is_err());
    }

    #[test]
    fn test_with_offset_keeps_kind_and_suffix() {
        let addr = Address::parse("EM10.D").unwrap().with_offset(12);
        assert_eq!(addr.base_address(), "EM12");
        assert_eq!(addr.suffix(), DataSuffix::Signed32D);
    }

    #[test]
    fn test_from_str() {
        let addr: Address = "TM3".parse().unwrap();
        assert_eq!(addr.word_kind(), &WordKind::TM);
    }

    #[test]
    fn test_suffix_word_count() {
        assert_eq!(DataSuffix::None.word_count(), 1);
        assert_eq!(DataSuffix::Hex16.word_count(), 1);
        assert_eq!(DataSuffix::Signed32D.word_count(), 2);
        assert!(DataSuffix::Signed32L.is_32bit());
    }

    proptest! {
        #[test]
        fn prop_base_address_round_trip(
            prefix in "[A-Za-z]{1,3}",
            offset in 0u32..1_000_000,
            suffix in proptest::option::of("[usdhlUSDHL]"),
        ) {
            let text = match &suffix {
                Some(s) => format!("{}{}.{}", prefix, offset, s),
                None => format!("{}{}", prefix, offset),
            };
            let addr = Address::parse(&text).unwrap();
            prop_assert_eq!(addr.offset(), offset);
            prop_assert_eq!(
                addr.base_address(),
                format!("{}{}", prefix.to_ascii_uppercase(), offset)
            );
            prop_assert_eq!(addr.suffix() != DataSuffix::None, suffix.is_some());
        }
    }
}
